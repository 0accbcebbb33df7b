//! Column naming
//!
//! Search criteria are written against logical camelCase field names while
//! the backend filters on upper/underscore column identifiers. The mapping is
//! injected into the compiler through `ColumnNaming` so the compiler itself
//! stays entity-agnostic.

use std::collections::HashMap;

use crate::config::NamingConfig;

/// Maps a logical field name to a backend column identifier
pub trait ColumnNaming: Send + Sync {
    fn column(&self, field: &str) -> String;
}

/// The default rule: `unitPrice` -> `UNIT_PRICE`
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperSnake;

impl UpperSnake {
    pub fn convert(field: &str) -> String {
        let mut out = String::with_capacity(field.len() + 4);
        let mut prev: Option<char> = None;

        for c in field.chars() {
            if c.is_uppercase() {
                if let Some(p) = prev {
                    if p.is_lowercase() || p.is_ascii_digit() {
                        out.push('_');
                    }
                }
            }
            out.extend(c.to_uppercase());
            prev = Some(c);
        }

        out
    }
}

impl ColumnNaming for UpperSnake {
    fn column(&self, field: &str) -> String {
        Self::convert(field)
    }
}

/// Per-entity overrides on top of `UpperSnake`
#[derive(Debug, Clone, Default)]
pub struct EntityColumns {
    overrides: HashMap<String, String>,
}

impl EntityColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self {
            overrides: config.column_overrides.clone(),
        }
    }

    /// Add an override (builder pattern)
    pub fn with_override(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.overrides.insert(field.into(), column.into());
        self
    }

    pub fn has_override(&self, field: &str) -> bool {
        self.overrides.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

impl ColumnNaming for EntityColumns {
    fn column(&self, field: &str) -> String {
        match self.overrides.get(field) {
            Some(column) => column.clone(),
            None => UpperSnake::convert(field),
        }
    }
}
