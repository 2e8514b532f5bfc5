use crate::errors::{HubError, Result};

use super::types::{ApiId, KeyType, ProductDescriptor, ProviderId};

/// Company profile with linkage and executives; the catalog default.
pub const PRODUCT_COMPANY_PROFILE: &str = "cmpelk";
/// Trade credit scores; ordered with a fixed order-reason parameter.
pub const PRODUCT_TRADE_CREDIT: &str = "cmptcs";
/// Company verification report.
pub const PRODUCT_VERIFICATION: &str = "CMP_VRF_ID";
/// Beneficial ownership structure; ordered with a fixed ownership-percentage
/// parameter.
pub const PRODUCT_BENEFICIAL_OWNERS: &str = "CMP_BOS";
/// Enterprise management report, ordered by display name over SOAP.
pub const PRODUCT_ENTERPRISE_MGMT: &str = "gdp_em";

static PRODUCTS: &[ProductDescriptor] = &[
    ProductDescriptor {
        id: PRODUCT_COMPANY_PROFILE,
        display_name: None,
        api: ApiId::DirectPlus,
        provider: ProviderId::Dnb,
        key_type: KeyType::Duns,
        versions: &["v1", "v2"],
    },
    ProductDescriptor {
        id: PRODUCT_TRADE_CREDIT,
        display_name: None,
        api: ApiId::DirectPlus,
        provider: ProviderId::Dnb,
        key_type: KeyType::Duns,
        versions: &["v1"],
    },
    ProductDescriptor {
        id: PRODUCT_VERIFICATION,
        display_name: None,
        api: ApiId::Onboard,
        provider: ProviderId::Dnb,
        key_type: KeyType::Duns,
        versions: &["V6.0"],
    },
    ProductDescriptor {
        id: PRODUCT_BENEFICIAL_OWNERS,
        display_name: None,
        api: ApiId::Onboard,
        provider: ProviderId::Dnb,
        key_type: KeyType::Duns,
        versions: &["V6.0"],
    },
    ProductDescriptor {
        id: PRODUCT_ENTERPRISE_MGMT,
        display_name: Some("Enterprise Management"),
        api: ApiId::Toolkit,
        provider: ProviderId::Dnb,
        key_type: KeyType::Duns,
        versions: &["V4"],
    },
];

/// Registry of the supported products and APIs.
///
/// Pure and side-effect free: resolution never performs I/O. An empty or
/// absent identifier resolves to the designated default
/// ([`PRODUCT_COMPANY_PROFILE`], [`ApiId::DirectPlus`]).
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    products: &'static [ProductDescriptor],
}

impl Catalog {
    pub fn new() -> Self {
        Self { products: PRODUCTS }
    }

    /// Resolves a product identifier into its descriptor.
    pub fn resolve_product(&self, id: Option<&str>) -> Result<&'static ProductDescriptor> {
        let id = match id {
            None | Some("") => PRODUCT_COMPANY_PROFILE,
            Some(id) => id,
        };

        self.products
            .iter()
            .find(|product| product.id == id)
            .ok_or_else(|| {
                HubError::Instantiation(format!(
                    "product identifier specified ({id}) is not supported"
                ))
            })
    }

    /// Resolves an API identifier.
    pub fn resolve_api(&self, id: Option<&str>) -> Result<ApiId> {
        match id {
            None | Some("") => Ok(ApiId::DirectPlus),
            Some(id) => ApiId::parse(id).ok_or_else(|| {
                HubError::Instantiation(format!("API specified ({id}) is not supported"))
            }),
        }
    }

    /// All registered products.
    pub fn products(&self) -> &'static [ProductDescriptor] {
        self.products
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResponseFormat;

    #[test]
    fn missing_product_id_resolves_to_the_default_product() {
        let catalog = Catalog::new();
        let product = catalog.resolve_product(None).unwrap();
        assert_eq!(product.id, PRODUCT_COMPANY_PROFILE);

        let product = catalog.resolve_product(Some("")).unwrap();
        assert_eq!(product.id, PRODUCT_COMPANY_PROFILE);
    }

    #[test]
    fn unknown_product_id_fails_resolution() {
        let catalog = Catalog::new();
        let error = catalog.resolve_product(Some("bogus")).unwrap_err();
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn missing_api_id_resolves_to_the_default_api() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve_api(None).unwrap(), ApiId::DirectPlus);
        assert!(catalog.resolve_api(Some("nope")).is_err());
    }

    #[test]
    fn version_resolution_defaults_to_the_most_recent_entry() {
        let catalog = Catalog::new();
        let product = catalog.resolve_product(Some(PRODUCT_COMPANY_PROFILE)).unwrap();
        assert_eq!(product.resolve_version(None).unwrap(), "v2");
        assert_eq!(product.resolve_version(Some("v1")).unwrap(), "v1");
        assert!(product.resolve_version(Some("v9")).is_err());
    }

    #[test]
    fn response_format_follows_the_api() {
        let catalog = Catalog::new();
        let soap = catalog.resolve_product(Some(PRODUCT_ENTERPRISE_MGMT)).unwrap();
        assert_eq!(soap.response_format(), ResponseFormat::Xml);
        assert!(!soap.api.requires_token());

        let json = catalog.resolve_product(Some(PRODUCT_TRADE_CREDIT)).unwrap();
        assert_eq!(json.response_format(), ResponseFormat::Json);
        assert!(json.api.requires_token());
    }

    #[test]
    fn authorization_value_is_api_specific() {
        assert_eq!(
            ApiId::DirectPlus.authorization_value("abc"),
            "Bearer abc".to_string()
        );
        assert_eq!(ApiId::Onboard.authorization_value("abc"), "abc".to_string());
    }
}
