//! Token persistence interface.

use async_trait::async_trait;

use crate::catalog::ApiId;
use crate::errors::Result;

use super::model::AccessToken;

/// Storage interface for access tokens.
///
/// Tokens are append-only: [`append`](Self::append) always creates a new
/// row and [`latest`](Self::latest) reads the most recent row per API.
/// History accumulates; nothing is ever deleted.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// The most recently persisted token for an API, if any.
    async fn latest(&self, api: ApiId) -> Result<Option<AccessToken>>;

    /// Persists a token as a new row and returns its sequence id.
    async fn append(&self, token: &AccessToken) -> Result<i64>;
}
