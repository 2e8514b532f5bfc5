//! Orchestrates cache lookup, upstream retrieval and persistence for one
//! requested product instance.

use std::sync::Arc;

use log::{debug, info};

use crate::catalog::Catalog;
use crate::errors::Result;
use crate::keys;
use crate::tokens::{now_epoch_ms, TokenManagerSet};

use super::model::{ProductRequest, RetrievalResult};
use super::source::{ProductFetch, ProductSource};
use super::store::ProductStore;

/// Cache-first gateway to the upstream product APIs.
///
/// Per request: resolve the descriptor and version, normalize the key
/// (both fail synchronously, before any I/O), consult the cache unless a
/// refresh is forced, and on a miss fetch upstream with the API's current
/// credential and persist the result.
///
/// Two concurrent requests for the same uncached pair both miss and both
/// fetch; there is deliberately no request coalescing.
pub struct ProductGateway {
    catalog: Catalog,
    store: Arc<dyn ProductStore>,
    source: Arc<dyn ProductSource>,
    tokens: Arc<TokenManagerSet>,
}

impl ProductGateway {
    pub fn new(
        catalog: Catalog,
        store: Arc<dyn ProductStore>,
        source: Arc<dyn ProductSource>,
        tokens: Arc<TokenManagerSet>,
    ) -> Self {
        Self {
            catalog,
            store,
            source,
            tokens,
        }
    }

    /// Retrieves one product instance, preferring the cache.
    pub async fn retrieve(&self, request: &ProductRequest) -> Result<RetrievalResult> {
        let descriptor = self.catalog.resolve_product(request.product_id.as_deref())?;
        let version_id = descriptor.resolve_version(request.version_id.as_deref())?;
        let key = keys::normalize(&request.key, descriptor.key_type)?;

        if !request.force_new {
            if let Some(cached) = self.store.lookup(&key, descriptor).await? {
                debug!(
                    "product {} for key {key} served from the datastore",
                    descriptor.id
                );
                return Ok(RetrievalResult {
                    key,
                    product_id: descriptor.id.to_string(),
                    version_id: version_id.to_string(),
                    forced_refresh: false,
                    served_from_cache: true,
                    obtained_at: cached.obtained_at,
                    raw_payload: cached.raw_payload,
                    format: descriptor.response_format(),
                });
            }
        }

        let authorization = if descriptor.api.requires_token() {
            Some(self.tokens.authorization_for(descriptor.api)?)
        } else {
            None
        };

        let raw_payload = self
            .source
            .fetch_product(ProductFetch {
                key: &key,
                descriptor,
                version_id,
                authorization: authorization.as_deref(),
            })
            .await?;

        let obtained_at = now_epoch_ms();
        self.store
            .upsert(&key, descriptor, &raw_payload, obtained_at)
            .await?;

        info!(
            "product {} for key {key} obtained online and persisted",
            descriptor.id
        );

        Ok(RetrievalResult {
            key,
            product_id: descriptor.id.to_string(),
            version_id: version_id.to_string(),
            forced_refresh: request.force_new,
            served_from_cache: false,
            obtained_at,
            raw_payload,
            format: descriptor.response_format(),
        })
    }
}
