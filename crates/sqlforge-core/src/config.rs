//! Renderer configuration.

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, GenericDialect, PostgresDialect, SqliteDialect};

/// Errors raised while loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("invalid render configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The built-in dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// `?` placeholders, ANSI types.
    #[default]
    Generic,
    /// SQLite.
    Sqlite,
    /// PostgreSQL.
    Postgres,
}

impl DialectKind {
    /// Returns the dialect implementation.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Generic => &GenericDialect,
            Self::Sqlite => &SqliteDialect,
            Self::Postgres => &PostgresDialect,
        }
    }
}

/// Settings for a [`Renderer`](crate::render::Renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Target dialect.
    pub dialect: DialectKind,
}

impl RenderConfig {
    /// Creates a configuration for `dialect`.
    #[must_use]
    pub const fn new(dialect: DialectKind) -> Self {
        Self { dialect }
    }

    /// Parses a configuration from JSON. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = RenderConfig::from_json(r#"{"dialect": "postgres"}"#).unwrap();
        assert_eq!(config.dialect, DialectKind::Postgres);
        assert_eq!(config.dialect.dialect().name(), "postgresql");
    }

    #[test]
    fn test_defaults() {
        let config = RenderConfig::from_json("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.dialect.dialect().name(), "generic");
    }

    #[test]
    fn test_unknown_dialect_rejected() {
        assert!(matches!(
            RenderConfig::from_json(r#"{"dialect": "oracle"}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
