//! Client for the Onboard API: JSON REST with a POSTed token handshake.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;

use datagate_core::catalog::PRODUCT_BENEFICIAL_OWNERS;
use datagate_core::credentials::Credentials;
use datagate_core::errors::{HubError, Result};
use datagate_core::products::ProductFetch;
use datagate_core::tokens::FetchedToken;

use crate::http::{successful_body, transport_error};

const BASE_URL: &str = "https://direct.dnb.com";

/// Token validity per the API documentation; the response does not carry a
/// usable ttl, so this fixed 24-hour window applies regardless of what the
/// response claims.
const TOKEN_TTL_SECONDS: i64 = 86_400;

/// Order-reason code sent with every product order on this API.
const ORDER_REASON_CODE: &str = "6332";

/// Ownership-percentage threshold injected for the beneficial-owners product.
const OWNERSHIP_PERCENTAGE: &str = "25";

pub struct OnboardClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "AuthenticationDetail")]
    authentication_detail: AuthenticationDetail,
}

#[derive(Debug, Deserialize)]
struct AuthenticationDetail {
    #[serde(rename = "Token")]
    token: String,
}

impl OnboardClient {
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
        let service_transaction_id = rand::thread_rng().gen_range(1..=10_000).to_string();
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        self.client
            .post(format!("{}/Authentication/V2.0/", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .header("x-dnb-user", &self.credentials.username)
            .header("x-dnb-pwd", &self.credentials.password)
            .json(&serde_json::json!({
                "TransactionDetail": {
                    "ApplicationTransactionID": "datagate",
                    "ServiceTransactionID": service_transaction_id,
                    "TransactionTimestamp": timestamp,
                }
            }))
            .build()
            .map_err(transport_error)
    }

    /// Acquires a token via the authentication endpoint. The token is sent
    /// back verbatim on product requests, without a `Bearer` prefix.
    pub async fn request_token(&self) -> Result<FetchedToken> {
        let request = self.token_request()?;
        let response = self.client.execute(request).await.map_err(transport_error)?;
        let body = successful_body(response).await?;

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            HubError::Generic(format!("failed to parse Onboard token payload: {e}"))
        })?;

        Ok(FetchedToken {
            secret: token.authentication_detail.token,
            ttl_seconds: TOKEN_TTL_SECONDS,
        })
    }

    fn product_request(&self, fetch: &ProductFetch<'_>) -> Result<reqwest::Request> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/{}/organizations/{}/products/{}",
            self.base_url, fetch.version_id, fetch.key, fetch.descriptor.id
        ))
        .map_err(|e| HubError::Generic(format!("failed to build Onboard URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("OrderReasonCode", ORDER_REASON_CODE);

        if fetch.descriptor.id == PRODUCT_BENEFICIAL_OWNERS {
            url.query_pairs_mut()
                .append_pair("OwnershipPercentage", OWNERSHIP_PERCENTAGE);
        }

        let mut builder = self.client.get(url).header(CONTENT_TYPE, "application/json");

        if let Some(authorization) = fetch.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        builder.build().map_err(transport_error)
    }

    /// Orders one product instance; the payload is the raw response body.
    pub async fn fetch_product(&self, fetch: ProductFetch<'_>) -> Result<String> {
        log::debug!(
            "ordering product {} ({}) for key {} from Onboard",
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
    use datagate_core::catalog::{Catalog, PRODUCT_VERIFICATION};

    fn client() -> OnboardClient {
        OnboardClient::new(Client::new(), Credentials::new("svc-user", "svc-pwd"))
    }

    #[test]
    fn token_request_authenticates_with_dedicated_headers() {
        let request = client().token_request().unwrap();

        assert_eq!(request.method(), "POST");
        assert_eq!(request.url().path(), "/Authentication/V2.0/");
        assert_eq!(request.headers().get("x-dnb-user").unwrap(), "svc-user");
        assert_eq!(request.headers().get("x-dnb-pwd").unwrap(), "svc-pwd");

        let body = request.body().unwrap().as_bytes().unwrap();
        let body: serde_json::Value = serde_json::from_slice(body).unwrap();
        let detail = &body["TransactionDetail"];
        assert!(detail["ServiceTransactionID"].is_string());
        assert!(detail["TransactionTimestamp"]
            .as_str()
            .unwrap()
            .ends_with('Z'));
    }

    #[test]
    fn product_request_addresses_the_versioned_organization_path() {
        let catalog = Catalog::new();
        let descriptor = catalog.resolve_product(Some(PRODUCT_VERIFICATION)).unwrap();

        let request = client()
            .product_request(&ProductFetch {
                key: "000123456",
                descriptor,
                version_id: "V6.0",
                authorization: Some("raw-token"),
            })
            .unwrap();

        assert_eq!(
            request.url().path(),
            "/V6.0/organizations/000123456/products/CMP_VRF_ID"
        );
        let query = request.url().query().unwrap();
        assert!(query.contains("OrderReasonCode=6332"));
        assert!(!query.contains("OwnershipPercentage"));
        // Token goes out verbatim, no Bearer prefix.
        assert_eq!(request.headers().get(AUTHORIZATION).unwrap(), "raw-token");
    }

    #[test]
    fn beneficial_owner_orders_inject_the_ownership_percentage() {
        let catalog = Catalog::new();
        let descriptor = catalog
            .resolve_product(Some(PRODUCT_BENEFICIAL_OWNERS))
            .unwrap();

        let request = client()
            .product_request(&ProductFetch {
                key: "000123456",
                descriptor,
                version_id: "V6.0",
                authorization: Some("raw-token"),
            })
            .unwrap();

        assert!(request
            .url()
            .query()
            .unwrap()
            .contains("OwnershipPercentage=25"));
    }
}
