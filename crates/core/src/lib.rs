//! Core domain logic for datagate.
//!
//! This crate contains everything that is independent of a concrete
//! transport or storage engine:
//! - the product/API catalog and key normalization rules,
//! - the access-token model and lifecycle manager,
//! - the cache-first product gateway,
//! - the error taxonomy shared by every layer.
//!
//! Upstream protocol clients live in `datagate-upstream` and plug in through
//! the [`tokens::TokenSource`] and [`products::ProductSource`] traits;
//! persistence lives in `datagate-storage-sqlite` behind
//! [`tokens::TokenStore`] and [`products::ProductStore`].

pub mod catalog;
pub mod credentials;
pub mod errors;
pub mod keys;
pub mod products;
pub mod tokens;

pub use errors::{ErrorKind, HubError, Result};
