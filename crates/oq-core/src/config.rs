//! Configuration types and loading
//!
//! Configuration is read from the environment. `.env` loading is left to the
//! binary so libraries never touch the process environment implicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::QueryError;

pub const ENV_UNKNOWN_OPERATORS: &str = "OQ_UNKNOWN_OPERATORS";
pub const ENV_COLUMN_OVERRIDES: &str = "OQ_COLUMN_OVERRIDES";

/// Compiler configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompilerConfig {
    /// Column naming overrides
    #[serde(default)]
    pub naming: NamingConfig,

    /// What to do with unknown operator keys and malformed field values
    #[serde(default)]
    pub unknown_operators: OperatorPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Logical field name -> backend column
    #[serde(default)]
    pub column_overrides: HashMap<String, String>,
}

/// Handling of criteria input the compiler does not understand
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperatorPolicy {
    /// Fail with a validation error naming the field
    #[default]
    Reject,
    /// Drop the offending operator or field and log a warning
    Ignore,
}

impl OperatorPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reject" | "strict" => Some(Self::Reject),
            "ignore" | "lenient" => Some(Self::Ignore),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Ignore => "ignore",
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Reject)
    }
}

impl CompilerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, QueryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(policy) = lookup(ENV_UNKNOWN_OPERATORS) {
            config.unknown_operators = OperatorPolicy::from_str(&policy).ok_or_else(|| {
                QueryError::Config(format!(
                    "{} must be 'reject' or 'ignore', got '{}'",
                    ENV_UNKNOWN_OPERATORS, policy
                ))
            })?;
        }

        if let Some(overrides) = lookup(ENV_COLUMN_OVERRIDES) {
            config.naming.column_overrides = parse_overrides(&overrides)?;
        }

        Ok(config)
    }
}

/// Parse `field=COLUMN,field2=COLUMN2`
pub fn parse_overrides(raw: &str) -> Result<HashMap<String, String>, QueryError> {
    let mut overrides = HashMap::new();

    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (field, column) = parse_override(pair)?;
        overrides.insert(field, column);
    }

    Ok(overrides)
}

/// Parse a single `field=COLUMN` pair
pub fn parse_override(pair: &str) -> Result<(String, String), QueryError> {
    match pair.split_once('=') {
        Some((field, column)) if !field.trim().is_empty() && !column.trim().is_empty() => {
            Ok((field.trim().to_string(), column.trim().to_string()))
        }
        _ => Err(QueryError::Config(format!(
            "column override must look like field=COLUMN, got '{}'",
            pair
        ))),
    }
}
