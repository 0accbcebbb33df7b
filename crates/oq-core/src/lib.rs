//! # oq-core
//!
//! Core types shared by every OData Query RS crate.
//!
//! This crate provides:
//! - Error types (`QueryError`, `ValidationError`)
//! - The `QueryResult` alias
//! - Compiler configuration (`CompilerConfig`, `OperatorPolicy`)
//! - Column naming (`ColumnNaming`, `UpperSnake`, `EntityColumns`)

pub mod config;
pub mod error;
pub mod naming;
pub mod result;

pub use config::{CompilerConfig, NamingConfig, OperatorPolicy};
pub use error::*;
pub use naming::{ColumnNaming, EntityColumns, UpperSnake};
pub use result::*;
