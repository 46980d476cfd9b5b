//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventHubError, Result};
use super::Settings;

const MIN_SECRET_LENGTH: usize = 32;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_sweep_config(&settings.sweep)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref image_host) = settings.image_host {
        validate_image_host_config(image_host)?;
    } else if settings.features.avatar_upload {
        return Err(EventHubError::Config(
            "Avatar upload is enabled but no image host is configured".to_string()
        ));
    }

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventHubError::Config(
            "Server host is required".to_string()
        ));
    }

    if config.port == 0 {
        return Err(EventHubError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventHubError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(EventHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(EventHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate session token configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_SECRET_LENGTH {
        return Err(EventHubError::Config(
            format!("JWT secret must be at least {} characters", MIN_SECRET_LENGTH)
        ));
    }

    if config.token_ttl_hours <= 0 {
        return Err(EventHubError::Config(
            "Token TTL must be greater than 0".to_string()
        ));
    }

    if config.cookie_name.is_empty() {
        return Err(EventHubError::Config(
            "Cookie name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate image host configuration
fn validate_image_host_config(config: &super::ImageHostConfig) -> Result<()> {
    url::Url::parse(&config.api_url)
        .map_err(|e| EventHubError::Config(format!("Invalid image host URL: {}", e)))?;

    if config.api_key.is_empty() {
        return Err(EventHubError::Config(
            "Image host API key is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(EventHubError::Config(
            "Image host timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_sweep_config(config: &super::SweepConfig) -> Result<()> {
    if config.enabled && config.interval_seconds == 0 {
        return Err(EventHubError::Config(
            "Sweep interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.requests_per_minute == 0 {
        return Err(EventHubError::Config(
            "Rate limit must allow at least one request per minute".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventHubError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(EventHubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
