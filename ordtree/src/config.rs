//! Shell configuration module.
//!
//! This module provides configuration loading for the `ordtree` command
//! interpreter from environment variables.
//!
//! # Environment Variables
//!
//! - `ORDTREE_BTREE_MIN_DEGREE`: Minimum degree of B-trees created without an
//!   explicit degree (default: `1`, a 2-3 tree)
//! - `ORDTREE_ECHO`: Whether each command's banner line is printed before its
//!   output (default: `true`)
//!
//! # Invariants
//!
//! - `btree_min_degree` is always at least 1

use crate::btree::DEFAULT_MIN_DEGREE;

const MIN_DEGREE_VAR: &str = "ORDTREE_BTREE_MIN_DEGREE";
const ECHO_VAR: &str = "ORDTREE_ECHO";

/// Shell configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()`, `btree_min_degree >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Minimum degree used for the startup B-tree and for `BT NEW` without
    /// an argument.
    pub btree_min_degree: usize,
    /// Print the operation banner before each command's output.
    pub echo: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            btree_min_degree: DEFAULT_MIN_DEGREE,
            echo: true,
        }
    }
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ShellConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `ORDTREE_BTREE_MIN_DEGREE` is set but not a positive integer
    /// - `ORDTREE_ECHO` is set but not a boolean
    pub fn from_env() -> Result<Self, ConfigError> {
        let btree_min_degree = Self::load_min_degree(std::env::var(MIN_DEGREE_VAR).ok().as_deref())?;
        let echo = Self::load_echo(std::env::var(ECHO_VAR).ok().as_deref())?;

        Ok(Self {
            btree_min_degree,
            echo,
        })
    }

    /// Parse the B-tree minimum degree, defaulting when unset.
    fn load_min_degree(value: Option<&str>) -> Result<usize, ConfigError> {
        let Some(value) = value else {
            return Ok(DEFAULT_MIN_DEGREE);
        };
        match value.trim().parse::<usize>() {
            Ok(degree) if degree >= 1 => Ok(degree),
            _ => Err(ConfigError::InvalidValue {
                name: MIN_DEGREE_VAR.to_string(),
                message: format!("'{value}' is not a valid minimum degree (must be at least 1)"),
            }),
        }
    }

    /// Parse the echo flag, defaulting when unset.
    fn load_echo(value: Option<&str>) -> Result<bool, ConfigError> {
        let Some(value) = value else {
            return Ok(true);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: ECHO_VAR.to_string(),
                message: format!("'{value}' is not a boolean"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ShellConfig::default();
        assert_eq!(config.btree_min_degree, 1);
        assert!(config.echo);
    }

    #[test]
    fn test_min_degree_parsing() {
        assert_eq!(ShellConfig::load_min_degree(None), Ok(1));
        assert_eq!(ShellConfig::load_min_degree(Some("3")), Ok(3));
        assert_eq!(ShellConfig::load_min_degree(Some(" 2 ")), Ok(2));
        assert!(ShellConfig::load_min_degree(Some("0")).is_err());
        assert!(ShellConfig::load_min_degree(Some("two")).is_err());
    }

    #[test]
    fn test_echo_parsing() {
        assert_eq!(ShellConfig::load_echo(None), Ok(true));
        assert_eq!(ShellConfig::load_echo(Some("FALSE")), Ok(false));
        assert_eq!(ShellConfig::load_echo(Some("on")), Ok(true));
        assert!(ShellConfig::load_echo(Some("maybe")).is_err());
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }

    #[test]
    fn test_invalid_min_degree_message() {
        let error = ShellConfig::load_min_degree(Some("0")).err();
        assert_eq!(
            error.map(|e| e.to_string()),
            Some(
                "invalid value for ORDTREE_BTREE_MIN_DEGREE: '0' is not a valid minimum degree \
                 (must be at least 1)"
                    .to_string()
            )
        );
    }
}
