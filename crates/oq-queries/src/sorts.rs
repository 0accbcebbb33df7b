//! Sort Specifications
//!
//! A sort specification is one of four shapes: a single field, a single
//! field with a direction, a field list, or a field list with a direction.
//! Every field in a specification shares the one direction.

use oq_core::{QueryResult, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The four accepted sort shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSpec {
    /// `[field]`
    Field(String),
    /// `[field, direction]`
    FieldWithDirection(String, SortDirection),
    /// `[fieldList]`
    Fields(Vec<String>),
    /// `[fieldList, direction]`
    FieldsWithDirection(Vec<String>, SortDirection),
}

impl SortSpec {
    /// Ascending sort on one field
    pub fn asc(field: impl Into<String>) -> Self {
        Self::Field(field.into())
    }

    /// Descending sort on one field
    pub fn desc(field: impl Into<String>) -> Self {
        Self::FieldWithDirection(field.into(), SortDirection::Desc)
    }

    /// One field, explicit direction
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self::FieldWithDirection(field.into(), direction)
    }

    /// Several fields, all in `direction`
    pub fn fields<I, S>(fields: I, direction: SortDirection) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FieldsWithDirection(fields.into_iter().map(Into::into).collect(), direction)
    }

    /// Reduce any shape to a field list and a single direction
    pub fn normalize(&self) -> (Vec<&str>, SortDirection) {
        match self {
            Self::Field(field) => (vec![field.as_str()], SortDirection::Asc),
            Self::FieldWithDirection(field, direction) => (vec![field.as_str()], *direction),
            Self::Fields(fields) => (fields.iter().map(String::as_str).collect(), SortDirection::Asc),
            Self::FieldsWithDirection(fields, direction) => {
                (fields.iter().map(String::as_str).collect(), *direction)
            }
        }
    }

    /// Parse the JSON tuple form, e.g. `["CODE"]` or `[["CODE", "NAME"], "desc"]`
    pub fn from_json(value: &Value) -> QueryResult<Self> {
        let parts = value
            .as_array()
            .ok_or_else(|| ValidationError::malformed_sort("expected an array"))?;

        let direction = match parts.len() {
            1 => None,
            2 => Some(parse_direction(&parts[1])?),
            n => {
                return Err(ValidationError::malformed_sort(format!(
                    "expected 1 or 2 elements, got {}",
                    n
                ))
                .into())
            }
        };

        let spec = match (&parts[0], direction) {
            (Value::String(field), None) => Self::Field(field.clone()),
            (Value::String(field), Some(direction)) => Self::FieldWithDirection(field.clone(), direction),
            (Value::Array(items), direction) => {
                let fields = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| ValidationError::malformed_sort("field list must contain only strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                match direction {
                    None => Self::Fields(fields),
                    Some(direction) => Self::FieldsWithDirection(fields, direction),
                }
            }
            _ => {
                return Err(ValidationError::malformed_sort(
                    "first element must be a field or a field list",
                )
                .into())
            }
        };

        Ok(spec)
    }
}

fn parse_direction(value: &Value) -> Result<SortDirection, ValidationError> {
    value
        .as_str()
        .and_then(SortDirection::from_str)
        .ok_or_else(|| ValidationError::malformed_sort(format!("direction must be 'asc' or 'desc', got {}", value)))
}

/// Render a sort specification as `COLUMN dir,COLUMN dir`
pub fn compile_sort(spec: &SortSpec) -> QueryResult<String> {
    let (fields, direction) = spec.normalize();

    if fields.is_empty() {
        return Err(ValidationError::malformed_sort("field list must not be empty").into());
    }
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(ValidationError::malformed_sort("field names must not be blank").into());
    }

    Ok(fields
        .iter()
        .map(|field| format!("{} {}", field, direction.as_str()))
        .collect::<Vec<_>>()
        .join(","))
}
