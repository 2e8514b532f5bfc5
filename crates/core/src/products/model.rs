//! Value objects of the product gateway.

use serde::Serialize;

use crate::catalog::ResponseFormat;

/// A persisted product payload for one (key, product) pair.
///
/// At most one current payload exists per pair; a successful upstream fetch
/// overwrites any prior value. Unlike tokens, no history is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedProduct {
    /// Canonical business key.
    pub key: String,
    /// Product identifier.
    pub product_id: String,
    /// Provider's native serialization, JSON or XML text.
    pub raw_payload: String,
    /// Epoch milliseconds at which the payload was obtained upstream.
    pub obtained_at: i64,
}

/// A caller's request for one product instance.
#[derive(Debug, Clone, Default)]
pub struct ProductRequest {
    /// Raw business key as supplied by the caller.
    pub key: String,
    /// Product identifier; `None` selects the catalog default.
    pub product_id: Option<String>,
    /// Bypass the cache and fetch upstream regardless of cached state.
    pub force_new: bool,
    /// Product version; `None` selects the most recent supported version.
    pub version_id: Option<String>,
}

/// The outcome of one retrieval, owned by the requesting caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    /// Canonical business key.
    pub key: String,
    /// Resolved product identifier.
    pub product_id: String,
    /// Resolved version identifier.
    pub version_id: String,
    /// Whether the caller forced a refresh.
    pub forced_refresh: bool,
    /// Whether the payload came from the cache rather than upstream.
    pub served_from_cache: bool,
    /// Epoch milliseconds at which the payload was (originally) obtained.
    pub obtained_at: i64,
    /// Provider's native serialization of the product.
    pub raw_payload: String,
    /// Structure of the payload.
    pub format: ResponseFormat,
}
