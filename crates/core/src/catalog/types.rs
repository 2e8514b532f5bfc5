//! Strong types for the catalog.
//!
//! Upstream APIs, providers and key schemes are closed sets, so they are
//! enums rather than strings: dispatch on them is checked for
//! exhaustiveness at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{HubError, Result};

/// Identifies one of the supported upstream APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiId {
    /// JSON REST API: GET with a `Bearer` token, Basic-auth token endpoint.
    DirectPlus,
    /// JSON REST API: POSTed token acquisition, token sent verbatim.
    Onboard,
    /// XML/SOAP API: credentials embedded per request, no token endpoint.
    Toolkit,
}

impl ApiId {
    /// Wire identifier used in storage and configuration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ApiId::DirectPlus => "dpl",
            ApiId::Onboard => "d2o",
            ApiId::Toolkit => "dit",
        }
    }

    /// Parses a wire identifier; `None` when unknown.
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "dpl" => Some(ApiId::DirectPlus),
            "d2o" => Some(ApiId::Onboard),
            "dit" => Some(ApiId::Toolkit),
            _ => None,
        }
    }

    /// Structure of the payloads this API delivers.
    pub const fn response_format(&self) -> ResponseFormat {
        match self {
            ApiId::DirectPlus | ApiId::Onboard => ResponseFormat::Json,
            ApiId::Toolkit => ResponseFormat::Xml,
        }
    }

    /// Whether product requests need a separately acquired token.
    /// The SOAP API embeds credentials in each request body instead.
    pub const fn requires_token(&self) -> bool {
        !matches!(self, ApiId::Toolkit)
    }

    /// Renders a token secret as the `Authorization` header value this API
    /// expects.
    pub fn authorization_value(&self, secret: &str) -> String {
        match self {
            ApiId::DirectPlus => format!("Bearer {secret}"),
            ApiId::Onboard | ApiId::Toolkit => secret.to_string(),
        }
    }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The external organization hosting one or more APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    /// Business-registry data provider.
    Dnb,
}

impl ProviderId {
    /// Wire identifier, also the suffix of the provider's product table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Dnb => "dnb",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identifier scheme a product is addressed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Nine-digit numeric business-registry number.
    Duns,
}

impl KeyType {
    /// Wire identifier, also the key column of the provider's product table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            KeyType::Duns => "duns",
        }
    }
}

/// Serialization structure of a delivered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    /// HTTP content type for payloads of this structure.
    pub const fn content_type(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Xml => "application/xml",
        }
    }
}

/// Immutable description of one orderable data product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductDescriptor {
    /// Product identifier as used on the wire and as the value column name
    /// in the provider's product table.
    pub id: &'static str,
    /// Display name, set only for products ordered by name over SOAP.
    pub display_name: Option<&'static str>,
    /// API serving this product.
    pub api: ApiId,
    /// Provider hosting the API.
    pub provider: ProviderId,
    /// Key scheme the product is addressed by.
    pub key_type: KeyType,
    /// Supported versions, oldest first; the last entry is the default.
    pub versions: &'static [&'static str],
}

impl ProductDescriptor {
    /// The most recent supported version.
    pub fn default_version(&self) -> &'static str {
        self.versions.last().copied().unwrap_or("")
    }

    /// Validates a requested version against the supported list, falling
    /// back to the most recent version when none is requested.
    pub fn resolve_version(&self, requested: Option<&str>) -> Result<&'static str> {
        match requested {
            None | Some("") => Ok(self.default_version()),
            Some(version) => self
                .versions
                .iter()
                .find(|supported| **supported == version)
                .copied()
                .ok_or_else(|| {
                    HubError::Instantiation(format!(
                        "version identifier specified ({version}) is not supported"
                    ))
                }),
        }
    }

    /// Structure of this product's payload.
    pub fn response_format(&self) -> ResponseFormat {
        self.api.response_format()
    }
}
