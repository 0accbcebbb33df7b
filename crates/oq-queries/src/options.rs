//! Query Options
//!
//! Serializes field selection, sort, filter, pagination and passthrough
//! parameters into the query string of a list/search request.
//!
//! Parameters are always emitted in the same order: `fields`, `sort`, `q`,
//! `limit`, `offset`, `count`, then passthrough parameters in the order they
//! were added. The same options therefore always yield the same URL.

use std::collections::HashSet;

use oq_core::{ColumnNaming, QueryResult, ValidationError};
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::criteria::{CriteriaCompiler, SearchCriteria};
use crate::literal::Scalar;
use crate::sorts::{compile_sort, SortSpec};

/// Parameter names with a dedicated slot
pub const RESERVED_PARAMS: [&str; 6] = ["fields", "sort", "q", "limit", "offset", "count"];

/// Options for a list/search request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Columns to return
    pub fields: Option<Vec<String>>,
    /// Result ordering
    pub sort: Option<SortSpec>,
    /// Filter expression, raw or compiled from search criteria
    pub q: Option<String>,
    /// Page size
    pub limit: Option<i64>,
    /// Rows to skip
    pub offset: Option<i64>,
    /// Ask the backend for a total count
    pub count: bool,
    /// Additional parameters, in insertion order
    pub extra: Vec<(String, String)>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fluent builder
    pub fn builder() -> QueryOptionsBuilder {
        QueryOptionsBuilder::new()
    }

    /// Fill the filter slot from search criteria.
    ///
    /// Criteria that compile to nothing leave `q` untouched.
    pub fn with_criteria(
        mut self,
        criteria: &SearchCriteria,
        naming: &dyn ColumnNaming,
    ) -> QueryResult<Self> {
        if let Some(q) = CriteriaCompiler::new(naming).compile(criteria)? {
            self.q = Some(q);
        }
        Ok(self)
    }

    /// Serialize to a query string without a leading `?`
    pub fn to_query_string(&self) -> QueryResult<String> {
        build_query_string(self)
    }

    /// Parse the loosely typed JSON form.
    ///
    /// Known keys are typed; any other scalar-valued key becomes a
    /// passthrough parameter. `null` values are skipped.
    pub fn from_json(value: &Value) -> QueryResult<Self> {
        let object = value.as_object().ok_or_else(|| ValidationError::InvalidParam {
            param: "options".to_string(),
            message: "expected a JSON object".to_string(),
        })?;

        let mut options = Self::new();
        for (key, raw) in object {
            if raw.is_null() {
                continue;
            }

            match key.as_str() {
                "fields" => options.fields = Some(parse_fields(raw)?),
                "sort" => options.sort = Some(SortSpec::from_json(raw)?),
                "q" => {
                    let q = raw.as_str().ok_or_else(|| ValidationError::InvalidParam {
                        param: "q".to_string(),
                        message: "expected a string".to_string(),
                    })?;
                    options.q = Some(q.to_string());
                }
                "limit" => options.limit = Some(parse_non_negative("limit", raw)?),
                "offset" => options.offset = Some(parse_non_negative("offset", raw)?),
                "count" => {
                    options.count = raw.as_bool().ok_or_else(|| ValidationError::InvalidParam {
                        param: "count".to_string(),
                        message: "expected a boolean".to_string(),
                    })?;
                }
                other => {
                    let value = Scalar::from_json(raw).ok_or_else(|| ValidationError::InvalidParam {
                        param: other.to_string(),
                        message: "passthrough parameters must be scalars".to_string(),
                    })?;
                    options.extra.push((other.to_string(), value.text()));
                }
            }
        }

        Ok(options)
    }
}

fn parse_fields(raw: &Value) -> Result<Vec<String>, ValidationError> {
    let items = raw.as_array().ok_or_else(|| ValidationError::InvalidParam {
        param: "fields".to_string(),
        message: "expected a list of field names".to_string(),
    })?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::InvalidParam {
                    param: "fields".to_string(),
                    message: "field names must be strings".to_string(),
                })
        })
        .collect()
}

fn parse_non_negative(param: &'static str, raw: &Value) -> Result<i64, ValidationError> {
    let out_of_range = || ValidationError::OutOfRange {
        param,
        value: raw.to_string(),
    };

    if let Some(n) = raw.as_i64() {
        return if n >= 0 { Ok(n) } else { Err(out_of_range()) };
    }

    match raw.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(out_of_range()),
    }
}

/// Serialize options into a query string (no leading `?`).
///
/// Returns an empty string when nothing is set.
pub fn build_query_string(options: &QueryOptions) -> QueryResult<String> {
    let mut params: Vec<String> = Vec::new();

    if let Some(fields) = &options.fields {
        validate_fields(fields)?;
        params.push(format!("fields={}", encode_list(fields.iter().map(String::as_str))));
    }

    if let Some(sort) = &options.sort {
        let fragment = compile_sort(sort)?;
        params.push(format!("sort={}", encode_list(fragment.split(','))));
    }

    if let Some(q) = options.q.as_deref().filter(|q| !q.trim().is_empty()) {
        params.push(format!("q={}", encode(q)));
    }

    if let Some(limit) = options.limit {
        params.push(format!("limit={}", check_non_negative("limit", limit)?));
    }

    if let Some(offset) = options.offset {
        params.push(format!("offset={}", check_non_negative("offset", offset)?));
    }

    if options.count {
        params.push("count=true".to_string());
    }

    for (key, value) in &options.extra {
        if key.is_empty() || RESERVED_PARAMS.contains(&key.as_str()) {
            return Err(ValidationError::InvalidParam {
                param: key.clone(),
                message: "not usable as a passthrough parameter".to_string(),
            }
            .into());
        }
        params.push(format!("{}={}", encode(key), encode(value)));
    }

    let query = params.join("&");
    debug!(params = params.len(), query = %query, "built query string");
    Ok(query)
}

fn validate_fields(fields: &[String]) -> Result<(), ValidationError> {
    if fields.is_empty() {
        return Err(ValidationError::EmptyFieldSelection);
    }

    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(ValidationError::DuplicateField {
                field: field.clone(),
            });
        }
    }

    Ok(())
}

fn check_non_negative(param: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        Err(ValidationError::OutOfRange {
            param,
            value: value.to_string(),
        })
    } else {
        Ok(value)
    }
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Encode each item, keeping the separating commas literal
fn encode_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.map(encode).collect::<Vec<_>>().join(",")
}

/// Builder for constructing query options fluently
#[derive(Debug, Default)]
pub struct QueryOptionsBuilder {
    options: QueryOptions,
}

impl QueryOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select columns
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Select one more column
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.options
            .fields
            .get_or_insert_with(Vec::new)
            .push(field.into());
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.options.sort = Some(sort);
        self
    }

    /// Set a raw filter expression
    pub fn filter(mut self, q: impl Into<String>) -> Self {
        self.options.q = Some(q.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.options.offset = Some(offset);
        self
    }

    /// 1-indexed page of `per_page` rows.
    ///
    /// An offset that does not fit in `i64` is stored as `-1` so that
    /// building the query string fails with `OutOfRange`.
    pub fn page(self, page: i64, per_page: i64) -> Self {
        let offset = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(per_page))
            .unwrap_or(-1);
        self.limit(per_page).offset(offset)
    }

    pub fn count(mut self, count: bool) -> Self {
        self.options.count = count;
        self
    }

    /// Add a passthrough parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.options.extra.push((key.into(), value.into().text()));
        self
    }

    pub fn build(self) -> QueryOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::OperatorSet;
    use crate::sorts::SortDirection;
    use oq_core::{QueryError, UpperSnake};
    use serde_json::json;

    fn build(options: &QueryOptions) -> String {
        build_query_string(options).unwrap()
    }

    fn validation_error(options: &QueryOptions) -> ValidationError {
        match build_query_string(options) {
            Err(QueryError::Validation(err)) => err,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(build(&QueryOptions::new()), "");
    }

    #[test]
    fn test_parameter_order() {
        let options = QueryOptions {
            limit: Some(10),
            sort: Some(SortSpec::asc("A")),
            fields: Some(vec!["A".into(), "B".into()]),
            ..Default::default()
        };
        assert_eq!(build(&options), "fields=A,B&sort=A+asc&limit=10");

        let built = QueryOptions::builder()
            .limit(10)
            .sort(SortSpec::asc("A"))
            .fields(["A", "B"])
            .build();
        assert_eq!(build(&built), "fields=A,B&sort=A+asc&limit=10");
    }

    #[test]
    fn test_all_parameters() {
        let options = QueryOptions::builder()
            .param("lang", "en")
            .count(true)
            .offset(20)
            .limit(10)
            .filter("CODE eq 'A&B'")
            .sort(SortSpec::fields(["CODE", "NAME"], SortDirection::Desc))
            .fields(["CODE", "NAME"])
            .param("expand", "lines")
            .build();

        assert_eq!(
            build(&options),
            "fields=CODE,NAME&sort=CODE+desc,NAME+desc&q=CODE+eq+%27A%26B%27&limit=10&offset=20&count=true&lang=en&expand=lines"
        );
    }

    #[test]
    fn test_count_false_is_omitted() {
        let options = QueryOptions::builder().count(false).limit(5).build();
        assert_eq!(build(&options), "limit=5");
    }

    #[test]
    fn test_empty_filter_is_omitted() {
        let options = QueryOptions::builder().filter("  ").build();
        assert_eq!(build(&options), "");
    }

    #[test]
    fn test_passthrough_is_encoded() {
        let options = QueryOptions::builder()
            .param("search term", "a/b c")
            .param("active", true)
            .param("depth", 2)
            .build();
        assert_eq!(build(&options), "search+term=a%2Fb+c&active=true&depth=2");
    }

    #[test]
    fn test_reserved_passthrough_rejected() {
        let mut options = QueryOptions::new();
        options.extra.push(("limit".into(), "5".into()));
        assert!(matches!(
            validation_error(&options),
            ValidationError::InvalidParam { param, .. } if param == "limit"
        ));
    }

    #[test]
    fn test_negative_pagination_rejected() {
        let options = QueryOptions::builder().limit(-1).build();
        assert_eq!(
            validation_error(&options),
            ValidationError::OutOfRange {
                param: "limit",
                value: "-1".to_string()
            }
        );

        let options = QueryOptions::builder().page(0, 25).build();
        assert!(matches!(
            validation_error(&options),
            ValidationError::OutOfRange { param: "offset", .. }
        ));
    }

    #[test]
    fn test_page_overflow_rejected() {
        for options in [
            QueryOptions::builder().page(i64::MAX, 2).build(),
            QueryOptions::builder().page(i64::MIN, 1).build(),
        ] {
            assert!(matches!(
                validation_error(&options),
                ValidationError::OutOfRange { param: "offset", .. }
            ));
        }
    }

    #[test]
    fn test_page() {
        let options = QueryOptions::builder().page(3, 25).build();
        assert_eq!(build(&options), "limit=25&offset=50");
    }

    #[test]
    fn test_field_selection_invariants() {
        let options = QueryOptions {
            fields: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(validation_error(&options), ValidationError::EmptyFieldSelection);

        let options = QueryOptions::builder().field("A").field("B").field("A").build();
        assert_eq!(
            validation_error(&options),
            ValidationError::DuplicateField {
                field: "A".to_string()
            }
        );
    }

    #[test]
    fn test_with_criteria() {
        let criteria = SearchCriteria::new()
            .with("code", "ABC")
            .with("price", OperatorSet::new().gte(100));

        let options = QueryOptions::builder()
            .limit(10)
            .build()
            .with_criteria(&criteria, &UpperSnake)
            .unwrap();

        assert_eq!(
            options.q.as_deref(),
            Some("CODE eq 'ABC' and PRICE gte 100")
        );
        assert_eq!(
            build(&options),
            "q=CODE+eq+%27ABC%27+and+PRICE+gte+100&limit=10"
        );
    }

    #[test]
    fn test_with_empty_criteria_keeps_filter() {
        let options = QueryOptions::builder()
            .filter("ACTIVE eq true")
            .build()
            .with_criteria(&SearchCriteria::new(), &UpperSnake)
            .unwrap();
        assert_eq!(options.q.as_deref(), Some("ACTIVE eq true"));
    }

    #[test]
    fn test_from_json() {
        let raw = json!({
            "count": true,
            "limit": 10,
            "fields": ["CODE", "NAME"],
            "sort": [["CODE"], "desc"],
            "offset": 0,
            "q": "CODE eq 'A'",
            "lang": "de",
            "ignored": null
        });

        let options = QueryOptions::from_json(&raw).unwrap();
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.offset, Some(0));
        assert!(options.count);
        assert_eq!(options.extra, vec![("lang".to_string(), "de".to_string())]);
        assert_eq!(
            build(&options),
            "fields=CODE,NAME&sort=CODE+desc&q=CODE+eq+%27A%27&limit=10&offset=0&count=true&lang=de"
        );
    }

    #[test]
    fn test_from_json_pagination_validation() {
        for raw in [
            json!({"limit": -5}),
            json!({"limit": 2.5}),
            json!({"offset": "10"}),
        ] {
            let err = QueryOptions::from_json(&raw).unwrap_err();
            assert!(
                matches!(err, QueryError::Validation(ValidationError::OutOfRange { .. })),
                "expected range violation for {}",
                raw
            );
        }

        let err = QueryOptions::from_json(&json!({"offset": 9.223372036854776e18})).unwrap_err();
        assert!(matches!(
            err,
            QueryError::Validation(ValidationError::OutOfRange { param: "offset", .. })
        ));

        let options = QueryOptions::from_json(&json!({"limit": 20.0})).unwrap();
        assert_eq!(options.limit, Some(20));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(QueryOptions::from_json(&json!({"fields": "CODE"})).is_err());
        assert!(QueryOptions::from_json(&json!({"sort": ["CODE", "up"]})).is_err());
        assert!(QueryOptions::from_json(&json!({"count": "yes"})).is_err());
        assert!(QueryOptions::from_json(&json!({"extra": {"a": 1}})).is_err());
        assert!(QueryOptions::from_json(&json!([])).is_err());
    }
}
