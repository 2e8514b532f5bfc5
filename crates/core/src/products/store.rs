//! Product cache persistence interface.

use async_trait::async_trait;

use crate::catalog::ProductDescriptor;
use crate::errors::Result;

use super::model::CachedProduct;

/// Storage interface for cached product payloads.
///
/// Implementations key rows by the canonical business key with one
/// value/timestamp column pair per product; the upsert overwrites any prior
/// payload for the same (key, product) pair.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// The cached payload for a (key, product) pair, if any.
    ///
    /// A storage failure is an error, distinct from a genuine miss.
    async fn lookup(
        &self,
        key: &str,
        descriptor: &'static ProductDescriptor,
    ) -> Result<Option<CachedProduct>>;

    /// Inserts or overwrites the payload for a (key, product) pair.
    async fn upsert(
        &self,
        key: &str,
        descriptor: &'static ProductDescriptor,
        raw_payload: &str,
        obtained_at: i64,
    ) -> Result<()>;
}
