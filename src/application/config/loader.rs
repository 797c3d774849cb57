use crate::application::config::models::Config;
use crate::application::config::parser::{parse_config, parse_config_file};
use crate::application::config::validator::validate_config;
use crate::common::error::Result;
use std::path::Path;

/// Load and validate configuration
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    pub fn load(path: &Path) -> Result<Config> {
        let config = parse_config_file(path)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from string (useful for testing)
    pub fn load_from_str(content: &str) -> Result<Config> {
        let config = parse_config(content)?;
        validate_config(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_config() {
        let toml = r#"
            port = 8080
            max_connections = 16
        "#;

        let config = ConfigLoader::load_from_str(toml).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        // Parses fine, fails validation
        let result = ConfigLoader::load_from_str("tick_period_ms = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("tickcast_missing_config.toml");
        let _ = std::fs::remove_file(&path);
        assert!(ConfigLoader::load(&path).is_err());
    }
}
