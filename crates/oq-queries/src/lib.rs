//! # oq-queries
//!
//! Query compilation for OData-flavored list/search endpoints.
//!
//! This crate turns structured search criteria and query options into the
//! URL query string (`fields=`, `sort=`, `q=`, `limit=`, `offset=`,
//! `count=`) a list/search endpoint expects. Everything here is a pure,
//! synchronous function of its inputs.
//!
//! ## Structure
//!
//! - `literal` - Rendering of scalar comparands as OData literals
//! - `criteria` - Search criteria and the filter expression compiler
//! - `sorts` - Sort specifications and the sort fragment compiler
//! - `options` - Query options and the query string builder
//!
//! ## Example
//!
//! ```
//! use oq_core::UpperSnake;
//! use oq_queries::{FieldValue, QueryOptions, SearchCriteria, SortSpec};
//!
//! let criteria = SearchCriteria::new()
//!     .with("status", FieldValue::any_of(["OPEN", "HELD"]));
//!
//! let options = QueryOptions::builder()
//!     .fields(["CODE", "NAME"])
//!     .sort(SortSpec::desc("CODE"))
//!     .limit(50)
//!     .build()
//!     .with_criteria(&criteria, &UpperSnake)
//!     .unwrap();
//!
//! assert_eq!(
//!     options.to_query_string().unwrap(),
//!     "fields=CODE,NAME&sort=CODE+desc&q=%28STATUS+eq+%27OPEN%27+or+STATUS+eq+%27HELD%27%29&limit=50"
//! );
//! ```

pub mod literal;
pub mod criteria;
pub mod sorts;
pub mod options;

// Re-exports for convenience
pub use literal::{render_like, render_literal, unescape_literal, Scalar};
pub use criteria::{compile_criteria, CriteriaCompiler, FieldValue, Operator, OperatorSet, SearchCriteria};
pub use sorts::{compile_sort, SortDirection, SortSpec};
pub use options::{build_query_string, QueryOptions, QueryOptionsBuilder};
