//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod worker;
pub mod workflow;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::worker::WorkerConfig;
use self::workflow::WorkflowConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Persistence backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Bearer token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Task runtime settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Workflow compilation and output settings.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load `config/default.toml`, the `config/{env}.toml` overlay, then
    /// `CASEHUB__SECTION__KEY` environment variables, and validate the result.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CASEHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, on first use.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.workflow.template_placeholder.is_empty() {
            return Err(AppError::configuration(
                "workflow.template_placeholder must not be empty",
            ));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(AppError::configuration(format!(
                "Unknown logging.format '{}'. Expected one of: json, pretty",
                self.logging.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.provider, "postgres");
        assert_eq!(config.worker.default_queue, "default");
        assert_eq!(config.workflow.template_placeholder, "PLACEHOLDER");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"database": {"provider": "memory"}}"#).unwrap();
        assert_eq!(config.database.provider, "memory");
        assert_eq!(config.database.max_connections, 20);
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);

        config.logging.format = "pretty".to_string();
        config.auth.jwt_secret = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
