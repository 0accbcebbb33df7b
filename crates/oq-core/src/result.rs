//! Result type alias

use crate::error::QueryError;

/// Standard Result type for query compilation and dispatch
pub type QueryResult<T> = Result<T, QueryError>;
