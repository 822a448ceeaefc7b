//! Analytics configuration

use serde::Deserialize;

use crate::core::constants::{DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT};

/// Tunables for the stats service.
///
/// Deserializable so the embedding application can load it from its own
/// configuration file; every field has a sensible default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Ranking size used when the caller does not pass a limit
    pub default_top_limit: usize,
    /// Hard cap for caller-supplied ranking limits
    pub max_top_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_top_limit: DEFAULT_TOP_LIMIT,
            max_top_limit: MAX_TOP_LIMIT,
        }
    }
}

impl AnalyticsConfig {
    /// Apply the default and the configured cap to a caller-supplied limit
    pub fn ranking_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_top_limit)
            .clamp(1, self.max_top_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.ranking_limit(None), 100);
    }

    #[test]
    fn test_ranking_limit_clamped() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.ranking_limit(Some(0)), 1);
        assert_eq!(config.ranking_limit(Some(50)), 50);
        assert_eq!(config.ranking_limit(Some(1_000_000)), 1_000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AnalyticsConfig = serde_json::from_str(r#"{"max_top_limit": 10}"#).unwrap();
        assert_eq!(config.default_top_limit, 100);
        assert_eq!(config.max_top_limit, 10);
    }
}
