//! Append-only repository for access tokens.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use datagate_core::catalog::ApiId;
use datagate_core::errors::{HubError, Result};
use datagate_core::tokens::{AccessToken, TokenStore};

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::auth_tokens::dsl as auth_tokens_dsl;

pub struct TokenRepository {
    pool: Arc<DbPool>,
}

#[derive(Debug, Queryable)]
struct AuthTokenRow {
    id: i32,
    api: String,
    token: String,
    expires_in: i64,
    obtained_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::auth_tokens)]
struct NewAuthTokenRow<'a> {
    api: &'a str,
    token: &'a str,
    expires_in: i64,
    obtained_at: i64,
}

impl TokenRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl AuthTokenRow {
    fn into_token(self) -> Result<AccessToken> {
        let api = ApiId::parse(&self.api).ok_or_else(|| {
            HubError::Datastore(format!("persisted token references unknown api {}", self.api))
        })?;

        Ok(AccessToken {
            api,
            sequence_id: Some(i64::from(self.id)),
            secret: self.token,
            ttl_seconds: self.expires_in,
            obtained_at: self.obtained_at,
        })
    }
}

#[async_trait]
impl TokenStore for TokenRepository {
    async fn latest(&self, api: ApiId) -> Result<Option<AccessToken>> {
        let mut conn = get_connection(&self.pool).map_err(HubError::from)?;

        let row = auth_tokens_dsl::auth_tokens
            .filter(auth_tokens_dsl::api.eq(api.as_str()))
            .order(auth_tokens_dsl::id.desc())
            .first::<AuthTokenRow>(&mut conn)
            .optional()
            .map_err(|e| HubError::from(StorageError::QueryFailed(e)))?;

        row.map(AuthTokenRow::into_token).transpose()
    }

    async fn append(&self, token: &AccessToken) -> Result<i64> {
        let mut conn = get_connection(&self.pool).map_err(HubError::from)?;

        let row = NewAuthTokenRow {
            api: token.api.as_str(),
            token: &token.secret,
            expires_in: token.ttl_seconds,
            obtained_at: token.obtained_at,
        };

        let id = diesel::insert_into(auth_tokens_dsl::auth_tokens)
            .values(&row)
            .returning(auth_tokens_dsl::id)
            .get_result::<i32>(&mut conn)
            .map_err(|e| HubError::from(StorageError::QueryFailed(e)))?;

        Ok(i64::from(id))
    }
}
