//! Product retrieval routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderName, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use datagate_core::products::{ProductRequest, RetrievalResult};

use crate::error::ApiError;
use crate::state::AppState;

/// Response header flagging whether the payload came from the cache.
const FROM_CACHE_HEADER: HeaderName = HeaderName::from_static("x-hub-from-cache");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Only the literal string "true" forces a refresh.
    force_new: Option<String>,
    version_id: Option<String>,
}

/// Service information document served at the root resource.
pub async fn hub_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let products: Vec<&'static str> = state.catalog.products().iter().map(|p| p.id).collect();
    Json(serde_json::json!({
        "name": "datagate",
        "message": "gateway for requesting, persisting and passing on licensed business-data products",
        "products": products,
    }))
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Returns a data product for a particular business key.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path((product, key)): Path<(String, String)>,
    Query(query): Query<ProductQuery>,
    uri: Uri,
) -> Response {
    let request = ProductRequest {
        key,
        product_id: Some(product),
        force_new: matches!(query.force_new.as_deref(), Some("true")),
        version_id: query.version_id,
    };

    match state.gateway.retrieve(&request).await {
        Ok(result) => product_response(&result),
        Err(error) => ApiError::new(error, uri.path()).into_response(),
    }
}

fn product_response(result: &RetrievalResult) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                result.format.content_type().to_string(),
            ),
            (FROM_CACHE_HEADER, result.served_from_cache.to_string()),
        ],
        result.raw_payload.clone(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::app_router;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use datagate_core::catalog::{ApiId, Catalog, ProductDescriptor, ResponseFormat};
    use datagate_core::errors::Result;
    use datagate_core::products::{
        CachedProduct, ProductFetch, ProductGateway, ProductSource, ProductStore,
    };
    use datagate_core::tokens::{
        now_epoch_ms, AccessToken, AccessTokenManager, FetchedToken, TokenManagerOptions,
        TokenManagerSet, TokenSource, TokenStore,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct FakeStore {
        rows: Mutex<HashMap<(String, String), CachedProduct>>,
    }

    #[async_trait]
    impl ProductStore for FakeStore {
        async fn lookup(
            &self,
            key: &str,
            descriptor: &'static ProductDescriptor,
        ) -> Result<Option<CachedProduct>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&(key.to_string(), descriptor.id.to_string()))
                .cloned())
        }

        async fn upsert(
            &self,
            key: &str,
            descriptor: &'static ProductDescriptor,
            raw_payload: &str,
            obtained_at: i64,
        ) -> Result<()> {
            self.rows.lock().unwrap().insert(
                (key.to_string(), descriptor.id.to_string()),
                CachedProduct {
                    key: key.to_string(),
                    product_id: descriptor.id.to_string(),
                    raw_payload: raw_payload.to_string(),
                    obtained_at,
                },
            );
            Ok(())
        }
    }

    struct FakeSource;

    #[async_trait]
    impl ProductSource for FakeSource {
        async fn fetch_product(&self, fetch: ProductFetch<'_>) -> Result<String> {
            Ok(match fetch.descriptor.response_format() {
                ResponseFormat::Json => {
                    format!("{{\"product\":\"{}\"}}", fetch.descriptor.id)
                }
                ResponseFormat::Xml => format!("<DGX><PRODUCT>{}</PRODUCT></DGX>", fetch.descriptor.id),
            })
        }
    }

    struct StaticTokenStore;

    #[async_trait]
    impl TokenStore for StaticTokenStore {
        async fn latest(&self, api: ApiId) -> Result<Option<AccessToken>> {
            Ok(Some(AccessToken {
                api,
                sequence_id: Some(1),
                secret: "test-secret".to_string(),
                ttl_seconds: 86_400,
                obtained_at: now_epoch_ms(),
            }))
        }

        async fn append(&self, _token: &AccessToken) -> Result<i64> {
            Ok(1)
        }
    }

    struct NoTokenSource;

    #[async_trait]
    impl TokenSource for NoTokenSource {
        async fn fetch_token(&self, api: ApiId) -> Result<FetchedToken> {
            Err(datagate_core::errors::HubError::TokenAcquisition {
                api,
                detail: "unexpected token fetch".to_string(),
            })
        }
    }

    async fn test_router(store: Arc<FakeStore>) -> axum::Router {
        let mut tokens = TokenManagerSet::new();
        for api in [ApiId::DirectPlus, ApiId::Onboard] {
            let manager = AccessTokenManager::initialize(
                api,
                Arc::new(StaticTokenStore),
                Arc::new(NoTokenSource),
                TokenManagerOptions::default(),
            )
            .await
            .unwrap();
            tokens.insert(manager);
        }

        let gateway = Arc::new(ProductGateway::new(
            Catalog::new(),
            store,
            Arc::new(FakeSource),
            Arc::new(tokens),
        ));

        app_router(Arc::new(AppState {
            catalog: Catalog::new(),
            gateway,
        }))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_product_yields_a_structured_400() {
        let router = test_router(Arc::new(FakeStore::default())).await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/hub/bogus/000123456")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 1);
        assert_eq!(body["error"]["path"], "/hub/bogus/000123456");
    }

    #[tokio::test]
    async fn unmapped_paths_fall_back_to_a_structured_404() {
        let router = test_router(Arc::new(FakeStore::default())).await;

        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 3);
    }

    #[tokio::test]
    async fn soap_products_are_served_with_their_native_content_type() {
        let router = test_router(Arc::new(FakeStore::default())).await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/hub/gdp_em/123456789")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/xml"
        );
        assert_eq!(response.headers().get("x-hub-from-cache").unwrap(), "false");
    }

    #[tokio::test]
    async fn cached_products_flag_their_origin_and_force_new_bypasses() {
        let store = Arc::new(FakeStore::default());
        store.rows.lock().unwrap().insert(
            ("000123456".to_string(), "cmpelk".to_string()),
            CachedProduct {
                key: "000123456".to_string(),
                product_id: "cmpelk".to_string(),
                raw_payload: "{\"cached\":true}".to_string(),
                obtained_at: 42,
            },
        );
        let router = test_router(store).await;

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/hub/cmpelk/12-3456")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-hub-from-cache").unwrap(), "true");

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/hub/cmpelk/12-3456?forceNew=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-hub-from-cache").unwrap(), "false");
    }

    #[tokio::test]
    async fn invalid_keys_are_rejected_before_any_io() {
        let router = test_router(Arc::new(FakeStore::default())).await;

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/hub/cmpelk/not-a-number")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], 1);
    }
}
