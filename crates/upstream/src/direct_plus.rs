//! Client for the Direct+ API: JSON REST, bearer-authorized GETs.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;

use datagate_core::catalog::PRODUCT_TRADE_CREDIT;
use datagate_core::credentials::Credentials;
use datagate_core::errors::{HubError, Result};
use datagate_core::products::ProductFetch;
use datagate_core::tokens::FetchedToken;

use crate::http::{successful_body, transport_error};

const BASE_URL: &str = "https://plus.dnb.com";

/// Origin header the API expects on every call.
const ORIGIN: &str = "www.dnb.com";

/// Fixed order-reason code injected for the trade-credit product.
const ORDER_REASON: &str = "6332";

pub struct DirectPlusClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(rename = "expiresIn")]
    expires_in: i64,
}

impl DirectPlusClient {
    pub fn new(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Points the client at a different host; used by tests and staging.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn token_request(&self) -> Result<reqwest::Request> {
        self.client
            .post(format!("{}/v2/token", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .header("Origin", ORIGIN)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&serde_json::json!({ "grant_type": "client_credentials" }))
            .build()
            .map_err(transport_error)
    }

    /// Acquires a bearer token via the Basic-authenticated token endpoint.
    pub async fn request_token(&self) -> Result<FetchedToken> {
        let request = self.token_request()?;
        let response = self.client.execute(request).await.map_err(transport_error)?;
        let body = successful_body(response).await?;

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            HubError::Generic(format!("failed to parse Direct+ token payload: {e}"))
        })?;

        Ok(FetchedToken {
            secret: token.access_token,
            ttl_seconds: token.expires_in,
        })
    }

    fn product_request(&self, fetch: &ProductFetch<'_>) -> Result<reqwest::Request> {
        let mut url =
            reqwest::Url::parse(&format!("{}/v1/data/duns/{}", self.base_url, fetch.key))
                .map_err(|e| HubError::Generic(format!("failed to build Direct+ URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("productId", fetch.descriptor.id)
            .append_pair("versionId", fetch.version_id);

        if fetch.descriptor.id == PRODUCT_TRADE_CREDIT {
            url.query_pairs_mut().append_pair("orderReason", ORDER_REASON);
        }

        let mut builder = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header("Origin", ORIGIN);

        if let Some(authorization) = fetch.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        builder.build().map_err(transport_error)
    }

    /// Orders one product instance; the payload is the raw response body.
    pub async fn fetch_product(&self, fetch: ProductFetch<'_>) -> Result<String> {
        log::debug!(
            "ordering product {} ({}) for key {} from Direct+",
            fetch.descriptor.id,
            fetch.version_id,
            fetch.key
        );
        let request = self.product_request(&fetch)?;
        let response = self.client.execute(request).await.map_err(transport_error)?;
        successful_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagate_core::catalog::{Catalog, PRODUCT_COMPANY_PROFILE};

    fn client() -> DirectPlusClient {
        DirectPlusClient::new(Client::new(), Credentials::new("svc-user", "svc-pwd"))
    }

    #[test]
    fn token_request_uses_basic_auth_against_the_token_endpoint() {
        let request = client().token_request().unwrap();

        assert_eq!(request.method(), "POST");
        assert_eq!(request.url().path(), "/v2/token");
        assert_eq!(request.headers().get("Origin").unwrap(), "www.dnb.com");
        let authorization = request.headers().get(AUTHORIZATION).unwrap();
        assert!(authorization.to_str().unwrap().starts_with("Basic "));
    }

    #[test]
    fn product_request_carries_product_and_version_parameters() {
        let catalog = Catalog::new();
        let descriptor = catalog.resolve_product(Some(PRODUCT_COMPANY_PROFILE)).unwrap();

        let request = client()
            .product_request(&ProductFetch {
                key: "000123456",
                descriptor,
                version_id: "v2",
                authorization: Some("Bearer token-value"),
            })
            .unwrap();

        assert_eq!(request.url().path(), "/v1/data/duns/000123456");
        let query = request.url().query().unwrap();
        assert!(query.contains("productId=cmpelk"));
        assert!(query.contains("versionId=v2"));
        assert!(!query.contains("orderReason"));
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer token-value"
        );
    }

    #[test]
    fn trade_credit_orders_inject_the_fixed_order_reason() {
        let catalog = Catalog::new();
        let descriptor = catalog.resolve_product(Some(PRODUCT_TRADE_CREDIT)).unwrap();

        let request = client()
            .product_request(&ProductFetch {
                key: "000123456",
                descriptor,
                version_id: "v1",
                authorization: Some("Bearer token-value"),
            })
            .unwrap();

        assert!(request.url().query().unwrap().contains("orderReason=6332"));
    }
}
