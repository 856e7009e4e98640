//! Credential pool and key selection
//!
//! Parses the configured API keys once and draws one key per attempt.
//! Selection is uniform-random with no stickiness: every call is independent,
//! so the primary and fallback attempts of one request may use different keys.

use crate::config::ProviderConfig;
use rand::Rng;

/// Environment variables holding a comma-separated key list, in priority order
pub const KEY_LIST_VARS: [&str; 2] = ["GOOGLE_GENERATIVE_AI_API_KEYS", "GOOGLE_API_KEYS"];

/// Number of leading key characters shown by [`CredentialPool::masked_keys`]
const MASK_PREFIX_LEN: usize = 5;

/// Immutable set of API keys available for selection
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPool {
    keys: Vec<String>,
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &self.masked_keys())
            .finish()
    }
}

/// Split a comma-separated key list, trimming whitespace and dropping empty entries
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

impl CredentialPool {
    /// Build a pool from the raw key list and the single-key fallback
    ///
    /// The list wins when it yields at least one key; otherwise the single key
    /// is used if it is non-empty after trimming.
    pub fn from_sources(key_list: Option<&str>, single_key: Option<&str>) -> Self {
        let keys = key_list.map(parse_key_list).unwrap_or_default();
        if !keys.is_empty() {
            return Self { keys };
        }

        let keys = single_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| vec![key.to_string()])
            .unwrap_or_default();
        Self { keys }
    }

    /// Build a pool from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::from_sources(config.api_keys.as_deref(), config.api_key.as_deref())
    }

    /// Draw one key uniformly at random, or `None` when no credential is available
    pub fn select_key<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.keys.len());
        self.keys.get(index).map(String::as_str)
    }

    /// Number of keys in the pool
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pool holds no key at all
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys with everything past a short prefix hidden, safe for logs
    pub fn masked_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|key| {
                let prefix: String = key.chars().take(MASK_PREFIX_LEN).collect();
                format!("{}...", prefix)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_parse_key_list_trims_and_drops_empty() {
        assert_eq!(parse_key_list("a, b ,"), vec!["a", "b"]);
        assert_eq!(parse_key_list(" , ,"), Vec::<String>::new());
        assert_eq!(parse_key_list(""), Vec::<String>::new());
    }

    #[test]
    fn test_select_key_returns_member_of_pool() {
        let pool = CredentialPool::from_sources(Some("k1,k2,k3"), None);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let key = pool.select_key(&mut rng).unwrap();
            assert!(["k1", "k2", "k3"].contains(&key));
        }
    }

    #[test]
    fn test_select_key_eventually_draws_every_key() {
        let pool = CredentialPool::from_sources(Some("k1,k2,k3"), None);
        let mut rng = StdRng::seed_from_u64(42);

        let drawn: HashSet<&str> = (0..200).filter_map(|_| pool.select_key(&mut rng)).collect();
        assert_eq!(drawn.len(), 3);
    }

    #[test]
    fn test_select_key_is_deterministic_for_a_seed() {
        let pool = CredentialPool::from_sources(Some("a,b,c,d"), None);
        let first: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..10).map(|_| pool.select_key(&mut rng).unwrap().to_string()).collect()
        };
        let second: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..10).map(|_| pool.select_key(&mut rng).unwrap().to_string()).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_key_fallback() {
        let pool = CredentialPool::from_sources(None, Some(" solo "));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.select_key(&mut StdRng::seed_from_u64(1)), Some("solo"));

        // An empty list also falls through to the single key
        let pool = CredentialPool::from_sources(Some(" , "), Some("solo"));
        assert_eq!(pool.select_key(&mut StdRng::seed_from_u64(1)), Some("solo"));
    }

    #[test]
    fn test_list_wins_over_single_key() {
        let pool = CredentialPool::from_sources(Some("a"), Some("solo"));
        assert_eq!(pool.select_key(&mut StdRng::seed_from_u64(3)), Some("a"));
    }

    #[test]
    fn test_no_credentials_signals_absence() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(CredentialPool::from_sources(None, None).select_key(&mut rng).is_none());
        assert!(CredentialPool::from_sources(Some(""), Some("  "))
            .select_key(&mut rng)
            .is_none());
    }

    #[test]
    fn test_masked_keys_hide_secrets() {
        let pool = CredentialPool::from_sources(Some("AIzaSyABCDEF,xy"), None);
        assert_eq!(pool.masked_keys(), vec!["AIzaS...", "xy..."]);
        assert!(!format!("{:?}", pool).contains("ABCDEF"));
    }
}
