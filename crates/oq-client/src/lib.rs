//! # oq-client
//!
//! Glue between compiled queries and the HTTP transport.
//!
//! The transport itself (auth headers, timeouts, retries) lives outside this
//! workspace; callers plug it in through the `Transport` trait. `Resource`
//! compiles criteria and options into `path?query` and issues the call.

pub mod resource;
pub mod transport;

pub use resource::Resource;
pub use transport::{append_query, Method, Transport};
