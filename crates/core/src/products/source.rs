//! Upstream product retrieval interface.

use async_trait::async_trait;

use crate::catalog::ProductDescriptor;
use crate::errors::Result;

/// Everything an adapter needs to order one product instance upstream.
#[derive(Debug, Clone, Copy)]
pub struct ProductFetch<'a> {
    /// Canonical business key.
    pub key: &'a str,
    /// The product being ordered.
    pub descriptor: &'static ProductDescriptor,
    /// Resolved version identifier.
    pub version_id: &'a str,
    /// Rendered `Authorization` header value; `None` for APIs that embed
    /// credentials in the request body.
    pub authorization: Option<&'a str>,
}

/// Interface to the upstream product endpoints.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Performs the upstream call and returns the raw payload, with any
    /// transport envelope already stripped.
    async fn fetch_product(&self, fetch: ProductFetch<'_>) -> Result<String>;
}
