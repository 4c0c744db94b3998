// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Consistent masking: remembers the replacement chosen for each
//! `(column position, original value)` pair so repeated values are faked the
//! same way throughout one file.

use crate::masking::strategy::MaskOutcome;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct AliasCache {
    enabled: bool,
    aliases: HashMap<(usize, String), String>,
}

impl AliasCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            aliases: HashMap::new(),
        }
    }

    /// Return the cached alias for this value, or run `mask` and remember
    /// the result. Pass-through outcomes are never cached.
    pub fn resolve<F>(&mut self, position: usize, original: &str, mask: F) -> MaskOutcome
    where
        F: FnOnce() -> MaskOutcome,
    {
        if !self.enabled {
            return mask();
        }

        let key = (position, original.to_string());
        if let Some(alias) = self.aliases.get(&key) {
            return MaskOutcome::Masked(alias.clone());
        }

        let outcome = mask();
        if outcome.is_masked() {
            self.aliases.insert(key, outcome.value().to_string());
        }
        outcome
    }

    pub fn count(&self) -> usize {
        self.aliases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_values_reuse_the_first_alias() {
        let mut cache = AliasCache::new(true);
        let mut counter = 0;
        let mut next = |cache: &mut AliasCache, pos: usize, value: &str| {
            cache.resolve(pos, value, || {
                counter += 1;
                MaskOutcome::Masked(format!("ALIAS{counter:04}"))
            })
        };

        let first = next(&mut cache, 0, "ABC");
        let second = next(&mut cache, 0, "DEF");
        let again = next(&mut cache, 0, "ABC");
        let other_column = next(&mut cache, 1, "ABC");
        assert_ne!(first, second);
        assert_eq!(first, again);
        assert_ne!(first, other_column);
        assert_eq!(cache.count(), 3);
    }

    #[test]
    fn disabled_cache_and_pass_through_are_not_remembered() {
        let mut off = AliasCache::new(false);
        off.resolve(0, "A", || MaskOutcome::Masked("1".to_string()));
        assert_eq!(off.count(), 0);

        let mut on = AliasCache::new(true);
        on.resolve(0, "A", || MaskOutcome::PassedThrough("A".to_string()));
        assert_eq!(on.count(), 0);
    }
}
