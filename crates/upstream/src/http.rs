//! Shared HTTP plumbing for the upstream clients.

use datagate_core::errors::{HubError, Result};

/// Maps a transport-level failure (DNS, TLS, timeout) into the taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> HubError {
    HubError::Generic(format!("upstream request failed: {e}"))
}

/// Reads the response body, failing with the upstream status and body when
/// the status falls outside the 2xx range.
pub(crate) async fn successful_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(HubError::UpstreamHttp {
            status: status.as_u16(),
            body: Some(body),
        });
    }

    Ok(body)
}
