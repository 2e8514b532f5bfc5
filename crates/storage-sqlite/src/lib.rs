//! SQLite storage implementation for datagate.
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. It owns the connection pool, the embedded migrations and the
//! repository implementations of the storage traits defined in
//! `datagate-core`:
//! - [`TokenRepository`] — append-only `auth_tokens` table, latest row wins.
//! - [`ProductRepository`] — one provider table keyed by the business key,
//!   one value/timestamp column pair per product, upsert semantics.

pub mod db;
pub mod errors;
pub mod products;
pub mod schema;
pub mod tokens;

pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};
pub use errors::StorageError;
pub use products::ProductRepository;
pub use tokens::TokenRepository;
