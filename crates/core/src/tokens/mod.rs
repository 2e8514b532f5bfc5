//! Access-token model and lifecycle management.

mod manager;
mod model;
mod source;
mod store;

pub use manager::{AccessTokenManager, TokenManagerOptions, TokenManagerSet};
pub use model::{now_epoch_ms, AccessToken, DEFAULT_RENEWAL_THRESHOLD_MINUTES};
pub use source::{FetchedToken, TokenSource};
pub use store::TokenStore;
