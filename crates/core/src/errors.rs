//! Error taxonomy for the gateway.
//!
//! Every failure, whether raised synchronously during request validation or
//! captured from an asynchronous upstream/datastore stage, is expressed as a
//! [`HubError`]. Each variant maps onto a closed set of externally visible
//! kinds ([`ErrorKind`]) with a stable error number and a default HTTP
//! status; an upstream HTTP status carried by the error takes precedence
//! over the kind default.

use thiserror::Error;

use crate::catalog::ApiId;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HubError>;

/// Hard fallback when neither an upstream status nor a kind default applies.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Errors produced by the gateway core and its collaborators.
#[derive(Error, Debug)]
pub enum HubError {
    /// Unclassified internal failure.
    #[error("{0}")]
    Generic(String),

    /// The caller supplied an unusable product, version, key or API id.
    /// Raised before any I/O takes place.
    #[error("{0}")]
    Instantiation(String),

    /// An upstream call returned an HTTP status outside the 2xx range.
    #[error("upstream API returned an HTTP status code outside the 2XX range (code: {status})")]
    UpstreamHttp {
        /// The transport status reported by the upstream API.
        status: u16,
        /// Raw response body, when one was readable.
        body: Option<String>,
    },

    /// An upstream call succeeded at the transport level but reported a
    /// failure inside the response body (SOAP status codes). Carries no
    /// HTTP status, so status resolution falls through to the kind default.
    #[error("{detail}")]
    UpstreamBody {
        /// Description of the embedded failure.
        detail: String,
        /// The payload fragment that carried the failure.
        body: Option<String>,
    },

    /// A token could not be obtained or refreshed for an API.
    #[error("failed to acquire an access token for api {api}: {detail}")]
    TokenAcquisition {
        /// The API the token was requested for.
        api: ApiId,
        /// Underlying failure description.
        detail: String,
    },

    /// A datastore read or write failed. Cache-lookup failures surface
    /// through this variant rather than degrading into a silent miss.
    #[error("datastore operation failed: {0}")]
    Datastore(String),

    /// No resource is mapped to the requested path.
    #[error("the requested resource ({0}) can not be located")]
    NotFound(String),
}

/// Externally visible error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unspecified gateway failure.
    Generic,
    /// Request could not be instantiated from the supplied identifiers.
    Instantiation,
    /// An upstream API reported a failure.
    Upstream,
    /// Unmapped inbound path.
    NotFound,
}

impl ErrorKind {
    /// Stable machine-readable error number.
    pub fn error_number(&self) -> u16 {
        match self {
            ErrorKind::Generic => 0,
            ErrorKind::Instantiation => 1,
            ErrorKind::Upstream => 2,
            ErrorKind::NotFound => 3,
        }
    }

    /// Default externally visible HTTP status for this kind.
    pub fn default_status(&self) -> u16 {
        match self {
            ErrorKind::Generic => 500,
            ErrorKind::Instantiation => 400,
            ErrorKind::Upstream => 500,
            ErrorKind::NotFound => 404,
        }
    }

    /// Short human-readable description of the kind.
    pub fn short_description(&self) -> &'static str {
        match self {
            ErrorKind::Generic => "Error occurred in the gateway",
            ErrorKind::Instantiation => "Error instantiating the product request",
            ErrorKind::Upstream => "Upstream API returned an invalid status",
            ErrorKind::NotFound => "Unable to locate the requested resource",
        }
    }
}

impl HubError {
    /// The externally visible kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HubError::Generic(_) | HubError::TokenAcquisition { .. } | HubError::Datastore(_) => {
                ErrorKind::Generic
            }
            HubError::Instantiation(_) => ErrorKind::Instantiation,
            HubError::UpstreamHttp { .. } | HubError::UpstreamBody { .. } => ErrorKind::Upstream,
            HubError::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// The HTTP status carried over from an upstream response, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            HubError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The raw upstream body carried by the error, if any.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            HubError::UpstreamHttp { body, .. } | HubError::UpstreamBody { body, .. } => {
                body.as_deref()
            }
            _ => None,
        }
    }

    /// Resolves the externally visible HTTP status for this error:
    /// upstream status first, then the kind default, then 500.
    pub fn http_status(&self) -> u16 {
        self.upstream_status()
            .unwrap_or_else(|| self.kind().default_status())
    }
}
