//! Client for the Toolkit API: XML/SOAP orders with embedded credentials.

use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use datagate_core::credentials::Credentials;
use datagate_core::errors::{HubError, Result};
use datagate_core::products::ProductFetch;

use crate::http::{successful_body, transport_error};
use crate::soap;

const BASE_URL: &str = "https://toolkit-wsdl.dnb.com";

const ENDPOINT_PATH: &str =
    "/ws/DNB_WebServices.Providers.OrderAndInvestigations.GDP_V4:wsp_GDP_V4";

const SOAP_ACTION: &str =
    "DNB_WebServices_Providers_OrderAndInvestigations_GDP_V4_wsp_GDP_V4_Binder_ws_OtherGDPProducts";

/// This API has no token endpoint; every order embeds the credentials and a
/// fresh transaction id in the envelope.
pub struct ToolkitClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl ToolkitClient {
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

    fn product_request(&self, fetch: &ProductFetch<'_>) -> Result<reqwest::Request> {
        let product_name = fetch.descriptor.display_name.ok_or_else(|| {
            HubError::Instantiation(format!(
                "product {} has no display name and cannot be ordered over SOAP",
                fetch.descriptor.id
            ))
        })?;

        let envelope = soap::order_envelope(
            &self.credentials,
            fetch.key,
            product_name,
            &transaction_id(),
        );

        self.client
            .post(format!("{}{}", self.base_url, ENDPOINT_PATH))
            .header(CONTENT_TYPE, "text/xml;charset=UTF-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(envelope)
            .build()
            .map_err(transport_error)
    }

    /// Orders one product instance. The response body is parsed, the
    /// embedded status codes are verified, and only the envelope-stripped
    /// payload fragment is returned.
    pub async fn fetch_product(&self, fetch: ProductFetch<'_>) -> Result<String> {
        log::debug!(
            "ordering product {} for key {} from the Toolkit",
            fetch.descriptor.id,
            fetch.key
        );
        let request = self.product_request(&fetch)?;
        let response = self.client.execute(request).await.map_err(transport_error)?;
        let body = successful_body(response).await?;
        soap::extract_payload(&body)
    }
}

/// Random 12-digit uppercase hex transaction id.
fn transaction_id() -> String {
    let mut rng = rand::thread_rng();
    (0..12)
        .map(|_| format!("{:X}", rng.gen_range(0..16)))
        .collect()
}
