//! Resource helpers
//!
//! A `Resource` is one list/search endpoint of the backend. It compiles the
//! caller's criteria and options and hands `GET path?query` to the transport.
//! Invalid input fails here, before the transport is ever called.

use std::fmt::Display;

use oq_core::{ColumnNaming, QueryResult, UpperSnake};
use oq_queries::{QueryOptions, SearchCriteria};
use serde_json::Value;
use tracing::debug;

use crate::transport::{append_query, Method, Transport};

/// One REST collection endpoint
#[derive(Debug, Clone)]
pub struct Resource<N = UpperSnake> {
    path: String,
    naming: N,
}

impl Resource<UpperSnake> {
    /// Endpoint using the default column naming rule
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_naming(path, UpperSnake)
    }
}

impl<N: ColumnNaming> Resource<N> {
    /// Endpoint with entity-specific column naming
    pub fn with_naming(path: impl Into<String>, naming: N) -> Self {
        Self {
            path: path.into().trim_end_matches('/').to_string(),
            naming,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn naming(&self) -> &N {
        &self.naming
    }

    /// `path?query` for a list call
    pub fn list_path(&self, options: &QueryOptions) -> QueryResult<String> {
        Ok(append_query(&self.path, &options.to_query_string()?))
    }

    /// `path?query` for a search call; the criteria fill the `q` slot
    pub fn search_path(&self, criteria: &SearchCriteria, options: QueryOptions) -> QueryResult<String> {
        let options = options.with_criteria(criteria, &self.naming)?;
        self.list_path(&options)
    }

    /// `path/id` for a single record
    pub fn item_path(&self, id: impl Display) -> String {
        format!("{}/{}", self.path, id)
    }

    pub async fn list<T>(&self, transport: &T, options: &QueryOptions) -> QueryResult<Value>
    where
        T: Transport + ?Sized,
    {
        let path = self.list_path(options)?;
        debug!(method = Method::Get.as_str(), path = %path, "listing resource");
        transport.request(Method::Get, &path, None).await
    }

    pub async fn search<T>(
        &self,
        transport: &T,
        criteria: &SearchCriteria,
        options: QueryOptions,
    ) -> QueryResult<Value>
    where
        T: Transport + ?Sized,
    {
        let path = self.search_path(criteria, options)?;
        debug!(method = Method::Get.as_str(), path = %path, "searching resource");
        transport.request(Method::Get, &path, None).await
    }

    pub async fn get<T>(&self, transport: &T, id: impl Display) -> QueryResult<Value>
    where
        T: Transport + ?Sized,
    {
        let path = self.item_path(id);
        transport.request(Method::Get, &path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use oq_core::{EntityColumns, QueryError};
    use oq_queries::{OperatorSet, SortSpec};
    use serde_json::json;

    #[test]
    fn test_list_path() {
        let products = Resource::new("/products/");
        assert_eq!(products.path(), "/products");

        let options = QueryOptions::builder().limit(5).count(true).build();
        assert_eq!(
            products.list_path(&options).unwrap(),
            "/products?limit=5&count=true"
        );
        assert_eq!(products.list_path(&QueryOptions::new()).unwrap(), "/products");
    }

    #[test]
    fn test_search_path_with_overrides() {
        let naming = EntityColumns::new().with_override("price", "NET_PRICE");
        let products = Resource::with_naming("/products", naming);
        let criteria = SearchCriteria::new().with("price", OperatorSet::new().lt(10));

        let path = products
            .search_path(&criteria, QueryOptions::builder().sort(SortSpec::asc("CODE")).build())
            .unwrap();
        assert_eq!(path, "/products?sort=CODE+asc&q=NET_PRICE+lt+10");
    }

    #[test]
    fn test_item_path() {
        assert_eq!(Resource::new("/orders").item_path(42), "/orders/42");
    }

    #[tokio::test]
    async fn test_search_dispatches_get() {
        let mut transport = MockTransport::new();
        transport
            .expect_request()
            .withf(|method, path, body| {
                *method == Method::Get
                    && path == "/products?q=CODE+eq+%27ABC%27&limit=1"
                    && body.is_none()
            })
            .times(1)
            .returning(|_, _, _| Ok(json!({"items": [{"CODE": "ABC"}]})));

        let criteria = SearchCriteria::new().with("code", "ABC");
        let response = Resource::new("/products")
            .search(&transport, &criteria, QueryOptions::builder().limit(1).build())
            .await
            .unwrap();

        assert_eq!(response["items"][0]["CODE"], "ABC");
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_transport() {
        let mut transport = MockTransport::new();
        transport.expect_request().times(0);

        let options = QueryOptions::builder().offset(-1).build();
        let err = Resource::new("/products")
            .list(&transport, &options)
            .await
            .unwrap_err();

        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let mut transport = MockTransport::new();
        transport.expect_request().returning(|_, _, _| {
            Err(QueryError::Transport {
                status: Some(503),
                message: "unavailable".to_string(),
            })
        });

        let err = Resource::new("/products")
            .get(&transport, "A-1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "transport_error");
    }
}
