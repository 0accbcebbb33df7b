//! Search Criteria
//!
//! A search criteria record maps logical field names to field values. The
//! `CriteriaCompiler` turns it into a single boolean filter expression for
//! the `q` parameter of a list/search endpoint.
//!
//! Field values come in three shapes:
//! - a scalar, meaning "field equals this value"
//! - a list of scalars, meaning "field equals any of these values"
//! - an operator set, whose operators are AND-combined
//!
//! ```
//! use oq_core::UpperSnake;
//! use oq_queries::criteria::{CriteriaCompiler, OperatorSet, SearchCriteria};
//!
//! let criteria = SearchCriteria::new()
//!     .with("code", "ABC")
//!     .with("unitPrice", OperatorSet::new().gte(100).lte(500));
//!
//! let q = CriteriaCompiler::new(&UpperSnake).compile(&criteria).unwrap();
//! assert_eq!(
//!     q.as_deref(),
//!     Some("CODE eq 'ABC' and UNIT_PRICE gte 100 and UNIT_PRICE lte 500")
//! );
//! ```

use oq_core::{ColumnNaming, OperatorPolicy, QueryResult, ValidationError};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::literal::{render_like, render_literal, Scalar};

/// Comparison operators, in the order they are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Like,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
}

impl Operator {
    /// Canonical emission order
    pub const ALL: [Operator; 9] = [
        Self::Eq,
        Self::Neq,
        Self::Like,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::NotIn,
    ];

    /// Parse from an operator object key
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "like" => Some(Self::Like),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            "notIn" => Some(Self::NotIn),
            _ => None,
        }
    }

    /// Operator object key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Like => "like",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "notIn",
        }
    }

    /// Whether the operator takes a list of comparands
    pub fn takes_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

/// Fixed-key operator record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperatorSet {
    pub eq: Option<Scalar>,
    pub neq: Option<Scalar>,
    pub like: Option<Scalar>,
    pub gt: Option<Scalar>,
    pub gte: Option<Scalar>,
    pub lt: Option<Scalar>,
    pub lte: Option<Scalar>,
    pub in_list: Option<Vec<Scalar>>,
    pub not_in: Option<Vec<Scalar>>,
}

impl OperatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, value: impl Into<Scalar>) -> Self {
        self.eq = Some(value.into());
        self
    }

    pub fn neq(mut self, value: impl Into<Scalar>) -> Self {
        self.neq = Some(value.into());
        self
    }

    pub fn like(mut self, value: impl Into<Scalar>) -> Self {
        self.like = Some(value.into());
        self
    }

    pub fn gt(mut self, value: impl Into<Scalar>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn gte(mut self, value: impl Into<Scalar>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<Scalar>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<Scalar>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn in_list<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.in_list = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn not_in<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.not_in = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Comparand of a single-valued operator
    pub fn scalar(&self, operator: Operator) -> Option<&Scalar> {
        match operator {
            Operator::Eq => self.eq.as_ref(),
            Operator::Neq => self.neq.as_ref(),
            Operator::Like => self.like.as_ref(),
            Operator::Gt => self.gt.as_ref(),
            Operator::Gte => self.gte.as_ref(),
            Operator::Lt => self.lt.as_ref(),
            Operator::Lte => self.lte.as_ref(),
            Operator::In | Operator::NotIn => None,
        }
    }

    /// Comparands of a list operator
    pub fn list(&self, operator: Operator) -> Option<&[Scalar]> {
        match operator {
            Operator::In => self.in_list.as_deref(),
            Operator::NotIn => self.not_in.as_deref(),
            _ => None,
        }
    }

    fn set_scalar(&mut self, operator: Operator, value: Scalar) {
        let slot = match operator {
            Operator::Eq => &mut self.eq,
            Operator::Neq => &mut self.neq,
            Operator::Like => &mut self.like,
            Operator::Gt => &mut self.gt,
            Operator::Gte => &mut self.gte,
            Operator::Lt => &mut self.lt,
            Operator::Lte => &mut self.lte,
            Operator::In | Operator::NotIn => return,
        };
        *slot = Some(value);
    }

    fn set_list(&mut self, operator: Operator, values: Vec<Scalar>) {
        match operator {
            Operator::In => self.in_list = Some(values),
            Operator::NotIn => self.not_in = Some(values),
            _ => {}
        }
    }

    /// Operators that are set, in canonical order
    pub fn operators(&self) -> Vec<Operator> {
        Operator::ALL
            .into_iter()
            .filter(|op| self.scalar(*op).is_some() || self.list(*op).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.operators().is_empty()
    }
}

/// The value attached to one field of a search criteria record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Field equals this value
    Scalar(Scalar),
    /// Field equals any of these values
    AnyOf(Vec<Scalar>),
    /// AND-combined comparisons
    Operators(OperatorSet),
}

impl FieldValue {
    pub fn any_of<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::AnyOf(values.into_iter().map(Into::into).collect())
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Vec<Scalar>> for FieldValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::AnyOf(values)
    }
}

impl From<OperatorSet> for FieldValue {
    fn from(set: OperatorSet) -> Self {
        Self::Operators(set)
    }
}

/// Insertion-ordered mapping from logical field name to field value.
///
/// A field mapped to `None` stays in the record but produces no clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    entries: Vec<(String, Option<FieldValue>)>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Set a field, replacing any earlier value in place
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        self.put(field.into(), Some(value.into()));
        self
    }

    /// Set a field (builder pattern)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Map a field to "no value"
    pub fn unset(&mut self, field: impl Into<String>) -> &mut Self {
        self.put(field.into(), None);
        self
    }

    fn put(&mut self, field: String, value: Option<FieldValue>) {
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// Value for a field, if one is set
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Fields with a value, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    /// Number of fields with a value
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True when no field has a value
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse the loosely typed JSON form.
    ///
    /// `null` maps to "no value". Unknown operators and malformed values are
    /// rejected or dropped according to `policy`.
    pub fn from_json(value: &Value, policy: OperatorPolicy) -> QueryResult<Self> {
        let object = value.as_object().ok_or_else(|| ValidationError::InvalidParam {
            param: "criteria".to_string(),
            message: "expected a JSON object".to_string(),
        })?;

        let mut criteria = Self::new();
        for (field, raw) in object {
            match parse_field_value(field, raw, policy) {
                Ok(value) => criteria.put(field.clone(), value),
                Err(err) if policy.is_strict() => return Err(err.into()),
                Err(err) => warn!(field = %field, error = %err, "dropping malformed criteria field"),
            }
        }

        Ok(criteria)
    }
}

fn parse_field_value(
    field: &str,
    raw: &Value,
    policy: OperatorPolicy,
) -> Result<Option<FieldValue>, ValidationError> {
    match raw {
        Value::Null => Ok(None),
        Value::Array(items) => parse_scalar_list(field, items).map(|list| Some(FieldValue::AnyOf(list))),
        Value::Object(object) => parse_operator_set(field, object, policy).map(|set| Some(FieldValue::Operators(set))),
        scalar => Scalar::from_json(scalar)
            .map(|s| Some(FieldValue::Scalar(s)))
            .ok_or_else(|| ValidationError::invalid_value(field, "unsupported value")),
    }
}

fn parse_scalar_list(field: &str, items: &[Value]) -> Result<Vec<Scalar>, ValidationError> {
    items
        .iter()
        .map(|item| {
            Scalar::from_json(item).ok_or_else(|| {
                ValidationError::invalid_value(field, "list elements must be strings, numbers or booleans")
            })
        })
        .collect()
}

fn parse_operator_set(
    field: &str,
    object: &Map<String, Value>,
    policy: OperatorPolicy,
) -> Result<OperatorSet, ValidationError> {
    let mut set = OperatorSet::new();

    for (key, raw) in object {
        let Some(operator) = Operator::from_str(key) else {
            if policy.is_strict() {
                return Err(ValidationError::UnknownOperator {
                    field: field.to_string(),
                    operator: key.clone(),
                });
            }
            warn!(field = %field, operator = %key, "ignoring unknown operator");
            continue;
        };

        if raw.is_null() {
            continue;
        }

        if operator.takes_list() {
            let items = raw.as_array().ok_or_else(|| {
                ValidationError::invalid_value(field, format!("'{}' expects a list", key))
            })?;
            set.set_list(operator, parse_scalar_list(field, items)?);
        } else {
            let scalar = Scalar::from_json(raw).ok_or_else(|| {
                ValidationError::invalid_value(field, format!("'{}' expects a single value", key))
            })?;
            set.set_scalar(operator, scalar);
        }
    }

    Ok(set)
}

/// Compiles search criteria into an OData filter expression
pub struct CriteriaCompiler<'a> {
    naming: &'a dyn ColumnNaming,
}

impl<'a> CriteriaCompiler<'a> {
    pub fn new(naming: &'a dyn ColumnNaming) -> Self {
        Self { naming }
    }

    /// Compile to a filter expression.
    ///
    /// Returns `Ok(None)` when no field produces a clause, so callers never
    /// send an empty `q=`.
    pub fn compile(&self, criteria: &SearchCriteria) -> QueryResult<Option<String>> {
        let mut clauses = Vec::new();

        for (field, value) in criteria.iter() {
            let column = self.naming.column(field);
            clauses.extend(field_clauses(field, &column, value)?);
        }

        if clauses.is_empty() {
            debug!("search criteria produced no clauses");
            return Ok(None);
        }

        let expression = clauses.join(" and ");
        debug!(clauses = clauses.len(), filter = %expression, "compiled search criteria");
        Ok(Some(expression))
    }
}

/// Compile with a one-off compiler
pub fn compile_criteria(
    criteria: &SearchCriteria,
    naming: &dyn ColumnNaming,
) -> QueryResult<Option<String>> {
    CriteriaCompiler::new(naming).compile(criteria)
}

fn field_clauses(
    field: &str,
    column: &str,
    value: &FieldValue,
) -> Result<Vec<String>, ValidationError> {
    match value {
        FieldValue::Scalar(scalar) => {
            check_finite(field, scalar)?;
            Ok(vec![comparison(column, Operator::Eq, scalar)])
        }
        FieldValue::AnyOf(values) => Ok(vec![group(field, column, Operator::In, values)?]),
        FieldValue::Operators(set) => {
            let mut clauses = Vec::new();
            for operator in set.operators() {
                if let Some(values) = set.list(operator) {
                    clauses.push(group(field, column, operator, values)?);
                } else if let Some(scalar) = set.scalar(operator) {
                    check_finite(field, scalar)?;
                    clauses.push(comparison(column, operator, scalar));
                }
            }
            Ok(clauses)
        }
    }
}

fn comparison(column: &str, operator: Operator, value: &Scalar) -> String {
    let literal = match operator {
        Operator::Like => render_like(value),
        _ => render_literal(value),
    };
    format!("{} {} {}", column, operator.as_str(), literal)
}

/// `in` becomes an OR of `eq`, `notIn` an AND of `neq`
fn group(
    field: &str,
    column: &str,
    operator: Operator,
    values: &[Scalar],
) -> Result<String, ValidationError> {
    if values.is_empty() {
        return Err(ValidationError::EmptyValueList {
            field: field.to_string(),
            operator: operator.as_str().to_string(),
        });
    }

    let (each, joiner) = match operator {
        Operator::NotIn => (Operator::Neq, " and "),
        _ => (Operator::Eq, " or "),
    };

    let parts = values
        .iter()
        .map(|value| {
            check_finite(field, value)?;
            Ok(comparison(column, each, value))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(format!("({})", parts.join(joiner)))
}

fn check_finite(field: &str, value: &Scalar) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteNumber {
            field: field.to_string(),
        })
    }
}
