use crate::application::config::models::Config;
use crate::common::error::{Result, ServerError};

/// Validate configuration for correctness and consistency
pub fn validate_config(config: &Config) -> Result<()> {
    if config.max_connections == 0 {
        return Err(ServerError::ConfigError(
            "max_connections must be greater than 0".to_string(),
        ));
    }

    if config.tick_period_ms == 0 {
        return Err(ServerError::ConfigError(
            "tick_period_ms must be greater than 0".to_string(),
        ));
    }

    if config.backlog == 0 {
        return Err(ServerError::ConfigError(
            "backlog must be greater than 0".to_string(),
        ));
    }

    if config.read_buffer_size == 0 {
        return Err(ServerError::ConfigError(
            "read_buffer_size must be greater than 0".to_string(),
        ));
    }

    if config.max_accepts_per_wake == Some(0) {
        return Err(ServerError::ConfigError(
            "max_accepts_per_wake must be greater than 0 when set".to_string(),
        ));
    }

    Ok(())
}
