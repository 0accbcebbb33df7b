//! Transport seam

use async_trait::async_trait;
use oq_core::QueryResult;
use serde_json::Value;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Issues requests against the REST backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> QueryResult<Value>;
}

/// Append a query string to a path; an empty query leaves the path alone
pub fn append_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_query() {
        assert_eq!(append_query("/products", ""), "/products");
        assert_eq!(append_query("/products", "limit=5"), "/products?limit=5");
        assert_eq!(
            append_query("/products?lang=en", "limit=5"),
            "/products?lang=en&limit=5"
        );
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
