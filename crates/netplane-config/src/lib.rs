// crates/netplane-config/src/lib.rs
// ============================================================================
// Module: Netplane Configuration
// Description: TOML configuration loading and fail-closed validation.
// Purpose: Resolve broker, credential, and cadence settings before startup.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file and validated before any
//! connection attempt: an empty broker host, a zero port, or an empty
//! username is rejected up front rather than surfacing later as a broker
//! error. Cadence settings default to the standard discovery timings and
//! only need to appear in the file when overridden.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bound on a broker request/reply call, in milliseconds.
const DEFAULT_CALL_TIMEOUT_MS: u64 = 10_000;

/// Default discovery tick period, in milliseconds.
const DEFAULT_TOPOLOGY_UPDATE_PERIOD_MS: u64 = 10_000;

/// Default staleness reset period, in seconds.
const DEFAULT_RESET_PERIOD_S: u64 = 60;

/// Default specification sampling period, in milliseconds.
const DEFAULT_SPEC_PERIOD_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config Errors
// ============================================================================

/// Errors surfaced while loading or validating configuration.
///
/// # Invariants
/// - Validation messages name the offending field.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("config file {path} could not be read: {detail}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error description.
        detail: String,
    },
    /// Config file is not valid TOML for the expected schema.
    #[error("config file failed to parse: {0}")]
    Parse(String),
    /// A required field is empty or out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Sections
// ============================================================================

/// Broker client credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Username presented during authentication.
    pub username: String,
    /// Password presented during authentication.
    pub password: String,
}

/// Broker endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AmqpConfig {
    /// Broker hostname.
    pub host: String,
    /// Broker port.
    pub port: u16,
}

/// Service cadence and timeout settings.
///
/// Every field has a default so the section may be omitted entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bound on a broker request/reply call, in milliseconds.
    pub call_timeout_ms: u64,
    /// Discovery tick period, in milliseconds.
    pub topology_update_period_ms: u64,
    /// Staleness reset period, in seconds.
    pub reset_period_s: u64,
    /// Specification sampling period, in milliseconds.
    pub spec_period_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            topology_update_period_ms: DEFAULT_TOPOLOGY_UPDATE_PERIOD_MS,
            reset_period_s: DEFAULT_RESET_PERIOD_S,
            spec_period_ms: DEFAULT_SPEC_PERIOD_MS,
        }
    }
}

impl ServiceConfig {
    /// Returns the call timeout as a duration.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Returns the discovery tick period as a duration.
    #[must_use]
    pub const fn topology_update_period(&self) -> Duration {
        Duration::from_millis(self.topology_update_period_ms)
    }

    /// Returns the staleness reset period as a duration.
    #[must_use]
    pub const fn reset_period(&self) -> Duration {
        Duration::from_secs(self.reset_period_s)
    }

    /// Returns the specification sampling period as a duration.
    #[must_use]
    pub const fn spec_period(&self) -> Duration {
        Duration::from_millis(self.spec_period_ms)
    }
}

// ============================================================================
// SECTION: Netplane Config
// ============================================================================

/// Complete Netplane configuration.
///
/// # Invariants
/// - `validate` passes before any connection attempt is made.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetplaneConfig {
    /// Broker client credentials.
    pub client: ClientConfig,
    /// Broker endpoint settings.
    pub amqp: AmqpConfig,
    /// Service cadence and timeout settings.
    #[serde(default)]
    pub service: ServiceConfig,
}

impl NetplaneConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parses and validates configuration content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot open a broker session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.amqp.host.is_empty() {
            return Err(ConfigError::Invalid("amqp.host must not be empty".to_string()));
        }
        if self.amqp.port == 0 {
            return Err(ConfigError::Invalid("amqp.port must not be zero".to_string()));
        }
        if self.client.username.is_empty() {
            return Err(ConfigError::Invalid("client.username must not be empty".to_string()));
        }
        if self.service.call_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "service.call_timeout_ms must not be zero".to_string(),
            ));
        }
        if self.service.topology_update_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "service.topology_update_period_ms must not be zero".to_string(),
            ));
        }
        if self.service.spec_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "service.spec_period_ms must not be zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::*;

    /// Minimal valid configuration content.
    const VALID: &str = r#"
        [client]
        username = "console"
        password = "secret"

        [amqp]
        host = "broker.local"
        port = 5672
    "#;

    #[test]
    fn defaults_fill_the_service_section() {
        let config = NetplaneConfig::parse(VALID).expect("config must parse");
        assert_eq!(config.service.call_timeout(), Duration::from_secs(10));
        assert_eq!(config.service.topology_update_period(), Duration::from_secs(10));
        assert_eq!(config.service.reset_period(), Duration::from_secs(60));
        assert_eq!(config.service.spec_period(), Duration::from_millis(5_000));
    }

    #[test]
    fn empty_host_is_rejected() {
        let content = VALID.replace("broker.local", "");
        let err = NetplaneConfig::parse(&content).expect_err("empty host must fail");
        assert!(err.to_string().contains("amqp.host"));
    }

    #[test]
    fn zero_port_is_rejected() {
        let content = VALID.replace("5672", "0");
        let err = NetplaneConfig::parse(&content).expect_err("zero port must fail");
        assert!(err.to_string().contains("amqp.port"));
    }

    #[test]
    fn empty_username_is_rejected() {
        let content = VALID.replace("console", "");
        let err = NetplaneConfig::parse(&content).expect_err("empty username must fail");
        assert!(err.to_string().contains("client.username"));
    }

    #[test]
    fn cadence_overrides_are_honored() {
        let content = format!(
            "{VALID}\n[service]\ncall_timeout_ms = 2500\nreset_period_s = 30\n"
        );
        let config = NetplaneConfig::parse(&content).expect("config must parse");
        assert_eq!(config.service.call_timeout(), Duration::from_millis(2_500));
        assert_eq!(config.service.reset_period(), Duration::from_secs(30));
        assert_eq!(config.service.spec_period_ms, 5_000);
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let content = format!("{VALID}\n[service]\nspec_period_ms = 0\n");
        let err = NetplaneConfig::parse(&content).expect_err("zero period must fail");
        assert!(err.to_string().contains("spec_period_ms"));
    }
}
