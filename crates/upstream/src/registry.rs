//! Bundles the concrete API clients behind the core source traits.

use async_trait::async_trait;
use reqwest::Client;

use datagate_core::catalog::ApiId;
use datagate_core::credentials::Credentials;
use datagate_core::errors::{HubError, Result};
use datagate_core::products::{ProductFetch, ProductSource};
use datagate_core::tokens::{FetchedToken, TokenSource};

use crate::direct_plus::DirectPlusClient;
use crate::onboard::OnboardClient;
use crate::toolkit::ToolkitClient;

/// One concrete client per upstream API, selected by an exhaustive match on
/// [`ApiId`]: adding an API without wiring its client is a compile error.
pub struct UpstreamRegistry {
    direct_plus: DirectPlusClient,
    onboard: OnboardClient,
    toolkit: ToolkitClient,
}

impl UpstreamRegistry {
    pub fn new(
        direct_plus: DirectPlusClient,
        onboard: OnboardClient,
        toolkit: ToolkitClient,
    ) -> Self {
        Self {
            direct_plus,
            onboard,
            toolkit,
        }
    }

    /// Builds all three clients against their production hosts, sharing one
    /// HTTP client.
    pub fn from_credentials(
        client: Client,
        direct_plus: Credentials,
        onboard: Credentials,
        toolkit: Credentials,
    ) -> Self {
        Self::new(
            DirectPlusClient::new(client.clone(), direct_plus),
            OnboardClient::new(client.clone(), onboard),
            ToolkitClient::new(client, toolkit),
        )
    }
}

#[async_trait]
impl TokenSource for UpstreamRegistry {
    async fn fetch_token(&self, api: ApiId) -> Result<FetchedToken> {
        match api {
            ApiId::DirectPlus => self.direct_plus.request_token().await,
            ApiId::Onboard => self.onboard.request_token().await,
            ApiId::Toolkit => Err(HubError::TokenAcquisition {
                api,
                detail: "this api has no token endpoint".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ProductSource for UpstreamRegistry {
    async fn fetch_product(&self, fetch: ProductFetch<'_>) -> Result<String> {
        match fetch.descriptor.api {
            ApiId::DirectPlus => self.direct_plus.fetch_product(fetch).await,
            ApiId::Onboard => self.onboard.fetch_product(fetch).await,
            ApiId::Toolkit => self.toolkit.fetch_product(fetch).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn the_soap_api_has_no_token_endpoint() {
        let registry = UpstreamRegistry::from_credentials(
            Client::new(),
            Credentials::new("a", "b"),
            Credentials::new("c", "d"),
            Credentials::new("e", "f"),
        );

        let error = registry.fetch_token(ApiId::Toolkit).await.unwrap_err();
        assert!(matches!(
            error,
            HubError::TokenAcquisition {
                api: ApiId::Toolkit,
                ..
            }
        ));
    }
}
