//! Repository for cached product payloads.
//!
//! Provider tables carry one value/timestamp column pair per product, so the
//! column set is not known to the static Diesel DSL. Statements are built
//! with `sql_query`: identifiers are interpolated only from the static
//! catalog (never from caller input), every value is a bound parameter.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};

use datagate_core::catalog::ProductDescriptor;
use datagate_core::errors::{HubError, Result};
use datagate_core::products::{CachedProduct, ProductStore};

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;

pub struct ProductRepository {
    pool: Arc<DbPool>,
}

#[derive(Debug, QueryableByName)]
struct ProductRow {
    #[diesel(sql_type = Text)]
    key: String,
    #[diesel(sql_type = Nullable<Text>)]
    payload: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    obtained_at: Option<i64>,
}

impl ProductRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn table_name(descriptor: &ProductDescriptor) -> String {
        format!("products_{}", descriptor.provider)
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn lookup(
        &self,
        key: &str,
        descriptor: &'static ProductDescriptor,
    ) -> Result<Option<CachedProduct>> {
        let mut conn = get_connection(&self.pool).map_err(HubError::from)?;

        let table = Self::table_name(descriptor);
        let key_column = descriptor.key_type.as_str();
        let product_column = descriptor.id;

        let row = diesel::sql_query(format!(
            "SELECT {key_column} AS key, \
                    {product_column} AS payload, \
                    {product_column}_obtained_at AS obtained_at \
             FROM {table} WHERE {key_column} = ?"
        ))
        .bind::<Text, _>(key)
        .get_result::<ProductRow>(&mut conn)
        .optional()
        .map_err(|e| HubError::from(StorageError::QueryFailed(e)))?;

        // A row can exist with this product's columns still empty when only
        // other products were cached for the key; that is a miss.
        Ok(row.and_then(|row| match (row.payload, row.obtained_at) {
            (Some(raw_payload), Some(obtained_at)) => Some(CachedProduct {
                key: row.key,
                product_id: descriptor.id.to_string(),
                raw_payload,
                obtained_at,
            }),
            _ => None,
        }))
    }

    async fn upsert(
        &self,
        key: &str,
        descriptor: &'static ProductDescriptor,
        raw_payload: &str,
        obtained_at: i64,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool).map_err(HubError::from)?;

        let table = Self::table_name(descriptor);
        let key_column = descriptor.key_type.as_str();
        let product_column = descriptor.id;

        diesel::sql_query(format!(
            "INSERT INTO {table} ({key_column}, {product_column}, {product_column}_obtained_at) \
             VALUES (?, ?, ?) \
             ON CONFLICT({key_column}) DO UPDATE SET \
                 {product_column} = excluded.{product_column}, \
                 {product_column}_obtained_at = excluded.{product_column}_obtained_at"
        ))
        .bind::<Text, _>(key)
        .bind::<Text, _>(raw_payload)
        .bind::<BigInt, _>(obtained_at)
        .execute(&mut conn)
        .map_err(|e| HubError::from(StorageError::QueryFailed(e)))?;

        Ok(())
    }
}
