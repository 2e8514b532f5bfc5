//! Upstream token acquisition interface.

use async_trait::async_trait;

use crate::catalog::ApiId;
use crate::errors::Result;

/// A freshly acquired token as delivered by an upstream token endpoint.
///
/// Token payload shapes differ per API; the adapter owning the endpoint is
/// responsible for mapping its specific shape into this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedToken {
    /// Opaque bearer value.
    pub secret: String,
    /// Validity window in seconds.
    pub ttl_seconds: i64,
}

/// Interface to the upstream token endpoints.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Acquires a fresh token for an API.
    ///
    /// Fails for APIs without a token endpoint.
    async fn fetch_token(&self, api: ApiId) -> Result<FetchedToken>;
}
