//! Maps the core error taxonomy onto wire responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use datagate_core::errors::HubError;

/// A gateway failure retagged with the requested path, ready to serialize.
pub struct ApiError {
    error: HubError,
    path: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Short description of the error kind.
    message: String,
    /// Machine-readable error number.
    code: u16,
    /// Specific information about this failure.
    detail: String,
    /// The inbound path that produced the failure.
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream: Option<UpstreamDetail>,
}

#[derive(Serialize)]
struct UpstreamDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(error: HubError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let upstream = match (self.error.upstream_status(), self.error.upstream_body()) {
            (None, None) => None,
            (http_status, body) => Some(UpstreamDetail {
                http_status,
                // Upstream JSON bodies are embedded as JSON; anything else
                // (XML fragments, plain text) is carried as a string.
                body: body.map(|raw| {
                    serde_json::from_str(raw)
                        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
                }),
            }),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                message: self.error.kind().short_description().to_string(),
                code: self.error.kind().error_number(),
                detail: self.error.to_string(),
                path: self.path,
                upstream,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: HubError, path: &str) -> StatusCode {
        ApiError::new(error, path).into_response().status()
    }

    #[test]
    fn upstream_status_drives_the_response_status() {
        let status = status_of(
            HubError::UpstreamHttp {
                status: 503,
                body: None,
            },
            "/hub/cmpelk/123",
        );
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn instantiation_errors_are_bad_requests() {
        let status = status_of(
            HubError::Instantiation("bogus".to_string()),
            "/hub/bogus/123",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status_of(HubError::NotFound("/nope".to_string()), "/nope"),
            StatusCode::NOT_FOUND
        );
    }
}
