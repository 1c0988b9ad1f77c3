//! Centralized error types for Heatguard.
//!
//! This module provides a typed error hierarchy that:
//! - Lets each layer return precise failures instead of HTTP semantics
//! - Provides client-safe messages that never leak upstream detail
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Crate-specific errors are converted into this type at the HTTP boundary.
/// Use `user_message()` for the text sent back to clients.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input was malformed or incomplete. The message is client-safe.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A value that the surface should have rejected reached the core.
    #[error("Internal value error: {0}")]
    InternalValue(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a message suitable for an API client.
    ///
    /// Validation messages are passed through verbatim so the client can see
    /// which field was rejected. Everything else is generic.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Network(e) => e.user_message().to_string(),
            AppError::Config(e) => e.user_message().to_string(),
            AppError::InternalValue(_) => "Internal server error".to_string(),
            AppError::Other(_) => "An unexpected error occurred".to_string(),
        }
    }

    /// True when the failure came from an upstream service rather than from
    /// this process or its client.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

/// Network-related errors (outbound HTTP to weather providers).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection to {provider} failed: {message}")]
    ConnectionFailed { provider: String, message: String },

    #[error("Request to {provider} timed out")]
    Timeout { provider: String },

    #[error("{provider} returned {status}: {message}")]
    ServerError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        // Upstream detail stays in the logs.
        "Failed to fetch weather data"
    }

    pub fn provider(&self) -> &str {
        match self {
            NetworkError::ConnectionFailed { provider, .. }
            | NetworkError::Timeout { provider }
            | NetworkError::ServerError { provider, .. }
            | NetworkError::InvalidResponse { provider, .. } => provider,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Failed to read configuration file {path}: {message}")]
    Unreadable { path: String, message: String },
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Unreadable { .. } => "Configuration file could not be read.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self, provider: &str) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self, provider: &str) -> NetworkError {
        let provider = provider.to_string();
        if self.is_timeout() {
            NetworkError::Timeout { provider }
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                provider,
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse {
                provider,
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed {
                provider,
                message: self.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passes_through() {
        let err = AppError::Validation("Missing required field: humidity".into());
        assert_eq!(err.user_message(), "Missing required field: humidity");
    }

    #[test]
    fn test_network_error_does_not_leak_detail() {
        let err: AppError = NetworkError::ServerError {
            provider: "openweathermap".into(),
            status: 401,
            message: "Invalid API key. secret=abc".into(),
        }
        .into();
        assert!(err.is_upstream());
        assert_eq!(err.user_message(), "Failed to fetch weather data");
        assert!(!err.user_message().contains("secret"));
    }

    #[test]
    fn test_network_error_provider() {
        let err = NetworkError::Timeout {
            provider: "weatherapi".into(),
        };
        assert_eq!(err.provider(), "weatherapi");
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_internal_value_is_generic() {
        let err = AppError::InternalValue("City cannot be empty".into());
        assert!(!err.is_upstream());
        assert_eq!(err.user_message(), "Internal server error");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: AppError = ConfigError::Invalid("PORT must be a number".into()).into();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
        assert!(err.user_message().contains("configuration"));
    }
}
