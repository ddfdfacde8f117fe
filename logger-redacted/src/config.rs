// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Level applied to the crates in `targets` when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
    /// Replace redacted values with a stable hash instead of a masked form
    pub hash_for_correlation: bool,
    pub targets: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            hash_for_correlation: true,
            targets: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Filter directives used when `RUST_LOG` is not set.
    pub fn default_directives(&self) -> String {
        let mut directives: Vec<String> = self
            .targets
            .iter()
            .map(|target| format!("{}={}", target.replace('-', "_"), self.log_level))
            .collect();
        directives.push("tower_http=info".to_string());
        directives.push("sqlx=warn".to_string());
        directives.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let config = LoggerConfig {
            log_level: "debug".to_string(),
            targets: vec!["account-server".to_string(), "account_identity".to_string()],
            ..LoggerConfig::default()
        };

        assert_eq!(
            config.default_directives(),
            "account_server=debug,account_identity=debug,tower_http=info,sqlx=warn"
        );
    }

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json);
        assert!(config.hash_for_correlation);
    }
}
