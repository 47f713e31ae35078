//! `ragchat-config`: ragchat session configuration.
//!
//! Provides:
//! - Typed config schema (models, session, device thresholds, logging)
//! - YAML loading from disk or from an embedded document
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{from_yaml_str, load_config};
pub use schema::{DeviceConfig, LoggingConfig, ModelsConfig, RagChatConfig, SessionConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults, and validate.
///
/// This is the main entry point for loading a config at startup.
pub async fn load_and_prepare(path: &Path) -> Result<RagChatConfig> {
    let raw_config = load_config(path).await?;
    prepare(raw_config)
}

/// Run env substitution, defaults and validation over an already parsed config.
pub fn prepare(raw_config: RagChatConfig) -> Result<RagChatConfig> {
    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: RagChatConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    Ok(config)
}
