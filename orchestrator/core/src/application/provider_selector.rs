// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

use crate::domain::provider::Provider;

/// Highest-priority active provider.
///
/// Inactive and deleted providers are skipped. Among equal priorities the one
/// that appears first in `providers` wins; callers pass store order, which is
/// insertion order.
pub fn find_highest_priority(providers: &[Provider]) -> Option<&Provider> {
    providers
        .iter()
        .filter(|p| p.is_active && !p.deleted)
        .fold(None, |best: Option<&Provider>, candidate| match best {
            Some(current) if current.priority >= candidate.priority => Some(current),
            _ => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(identifier: &str, priority: i64) -> Provider {
        Provider::new(identifier, identifier, "openai").with_priority(priority)
    }

    #[test]
    fn test_highest_priority_wins() {
        let providers = vec![provider("a", 10), provider("b", 100)];
        assert_eq!(find_highest_priority(&providers).unwrap().identifier, "b");
    }

    #[test]
    fn test_deactivated_provider_skipped() {
        let mut providers = vec![provider("a", 10), provider("b", 100)];
        providers[1].is_active = false;
        assert_eq!(find_highest_priority(&providers).unwrap().identifier, "a");
    }

    #[test]
    fn test_ties_go_to_earliest() {
        let providers = vec![provider("first", 5), provider("second", 5), provider("third", 5)];
        assert_eq!(find_highest_priority(&providers).unwrap().identifier, "first");
    }

    #[test]
    fn test_negative_priorities_and_empty() {
        let providers = vec![provider("low", -10), provider("lower", -20)];
        assert_eq!(find_highest_priority(&providers).unwrap().identifier, "low");
        assert!(find_highest_priority(&[]).is_none());

        let mut deleted = provider("gone", 1);
        deleted.deleted = true;
        assert!(find_highest_priority(&[deleted]).is_none());
    }
}
