//! Upstream API clients for datagate.
//!
//! One client per upstream API, each translating the shared retrieval
//! vocabulary (`ProductFetch`, `FetchedToken`) into that API's wire
//! protocol:
//! - [`direct_plus`] — JSON REST, GET with a `Bearer` token,
//!   Basic-authenticated token endpoint.
//! - [`onboard`] — JSON REST, POSTed token acquisition, token sent verbatim.
//! - [`toolkit`] — XML/SOAP, credentials embedded per request, in-body
//!   status codes instead of HTTP error statuses.
//!
//! [`UpstreamRegistry`] bundles the three clients behind the core
//! `TokenSource`/`ProductSource` traits, dispatching on `ApiId` with an
//! exhaustive match.

pub mod direct_plus;
mod http;
pub mod onboard;
pub mod registry;
pub mod soap;
pub mod toolkit;

pub use registry::UpstreamRegistry;
