//! Access-token lifecycle manager.
//!
//! One manager exists per token-bearing API. Construction is an explicit
//! async factory: the most recent persisted token is loaded and, when absent
//! or close to expiry, refreshed before the factory returns, so startup
//! failures surface at the call site. A background task re-checks validity
//! on a fixed interval for the lifetime of the process.
//!
//! Reads never block on a refresh: a caller arriving while a refresh is in
//! flight observes the pre-refresh token (stale-while-revalidate). The
//! renewal threshold is chosen to exceed any plausible in-flight request
//! duration, so a stale read is still a valid credential.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, error, info};

use crate::catalog::ApiId;
use crate::errors::{HubError, Result};

use super::model::{now_epoch_ms, AccessToken, DEFAULT_RENEWAL_THRESHOLD_MINUTES};
use super::source::TokenSource;
use super::store::TokenStore;

/// Interval between periodic validity checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Tunables for the token lifecycle.
#[derive(Debug, Clone, Copy)]
pub struct TokenManagerOptions {
    /// Renew once fewer than this many minutes of validity remain.
    pub renewal_threshold_minutes: i64,
    /// Interval between periodic validity checks.
    pub check_interval: Duration,
}

impl Default for TokenManagerOptions {
    fn default() -> Self {
        Self {
            renewal_threshold_minutes: DEFAULT_RENEWAL_THRESHOLD_MINUTES,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<AccessToken>,
    failed: bool,
}

/// Supplies an always-valid bearer credential for one API.
pub struct AccessTokenManager {
    api: ApiId,
    store: Arc<dyn TokenStore>,
    source: Arc<dyn TokenSource>,
    options: TokenManagerOptions,
    state: RwLock<TokenState>,
    refreshing: AtomicBool,
}

impl AccessTokenManager {
    /// Creates a manager, loading the persisted token and refreshing it when
    /// absent or close to expiry. Fails when the initial refresh fails.
    pub async fn initialize(
        api: ApiId,
        store: Arc<dyn TokenStore>,
        source: Arc<dyn TokenSource>,
        options: TokenManagerOptions,
    ) -> Result<Arc<Self>> {
        let manager = Arc::new(Self {
            api,
            store,
            source,
            options,
            state: RwLock::new(TokenState::default()),
            refreshing: AtomicBool::new(false),
        });

        let now = now_epoch_ms();
        match manager.store.latest(api).await? {
            Some(token)
                if !token.secret.is_empty()
                    && !token.needs_renewal(options.renewal_threshold_minutes, now) =>
            {
                info!(
                    "token ({api}) loaded from datastore, {} minutes remaining = {}",
                    token.remaining_minutes(now),
                    token.masked_secret()
                );
                manager.state.write().unwrap().token = Some(token);
            }
            Some(_) => {
                info!("token ({api}) from datastore invalid or nearly expired, refreshing");
                manager.refresh().await?;
            }
            None => {
                info!("no persisted token for api {api}, acquiring one");
                manager.refresh().await?;
            }
        }

        Ok(manager)
    }

    /// The API this manager serves.
    pub fn api(&self) -> ApiId {
        self.api
    }

    /// Starts the periodic validity check, running until the process exits.
    pub fn spawn_renewal_task(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(manager.options.check_interval);
            // The first tick of a tokio interval fires immediately;
            // initialization already validated the token, so skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                manager.periodic_check().await;
            }
        });
    }

    /// The current `Authorization` header value, rendered per the API's
    /// convention. Never blocks on a refresh: a token due for renewal is
    /// refreshed in the background while the stale value is returned.
    pub fn current_authorization(self: &Arc<Self>) -> Result<String> {
        let (secret, due, failed) = {
            let state = self.state.read().unwrap();
            match &state.token {
                Some(token) => (
                    Some(token.secret.clone()),
                    token.needs_renewal(self.options.renewal_threshold_minutes, now_epoch_ms()),
                    state.failed,
                ),
                None => (None, false, state.failed),
            }
        };

        if due && !self.refreshing.swap(true, Ordering::SeqCst) {
            let manager = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(e) = manager.refresh().await {
                    error!("on-demand token refresh for api {} failed: {e}", manager.api);
                }
                manager.refreshing.store(false, Ordering::SeqCst);
            });
        }

        match secret {
            Some(secret) if !secret.is_empty() => Ok(self.api.authorization_value(&secret)),
            _ => Err(HubError::TokenAcquisition {
                api: self.api,
                detail: if failed {
                    "last token refresh failed".to_string()
                } else {
                    "no valid token available".to_string()
                },
            }),
        }
    }

    /// Fetches a fresh token, persists it as a new row and swaps it into
    /// place. On failure the manager is marked failed but keeps serving the
    /// previous token, if one exists, until the next check succeeds.
    pub async fn refresh(&self) -> Result<()> {
        let fetched = match self.source.fetch_token(self.api).await {
            Ok(fetched) => fetched,
            Err(e) => {
                self.state.write().unwrap().failed = true;
                return Err(HubError::TokenAcquisition {
                    api: self.api,
                    detail: e.to_string(),
                });
            }
        };

        let mut token = AccessToken {
            api: self.api,
            sequence_id: None,
            secret: fetched.secret,
            ttl_seconds: fetched.ttl_seconds,
            obtained_at: now_epoch_ms(),
        };

        match self.store.append(&token).await {
            Ok(sequence_id) => {
                token.sequence_id = Some(sequence_id);
                info!(
                    "persisted token for api {} with id {sequence_id} = {}",
                    self.api,
                    token.masked_secret()
                );
            }
            Err(e) => {
                self.state.write().unwrap().failed = true;
                return Err(e);
            }
        }

        let mut state = self.state.write().unwrap();
        state.token = Some(token);
        state.failed = false;
        Ok(())
    }

    async fn periodic_check(&self) {
        let now = now_epoch_ms();
        let (due, remaining) = {
            let state = self.state.read().unwrap();
            match &state.token {
                Some(token) => (
                    token.needs_renewal(self.options.renewal_threshold_minutes, now),
                    token.remaining_minutes(now),
                ),
                None => (true, 0),
            }
        };

        if due {
            info!("token for api {} about to expire or expired, going online", self.api);
            if let Err(e) = self.refresh().await {
                error!("periodic token renewal for api {} failed: {e}", self.api);
            }
        } else {
            debug!(
                "token for api {} verifies okay, {remaining} minutes remaining",
                self.api
            );
        }
    }
}

/// Explicitly constructed collection of token managers, keyed by API.
///
/// Built during startup, after the datastore and the upstream clients and
/// before the first request is accepted.
#[derive(Default)]
pub struct TokenManagerSet {
    managers: HashMap<ApiId, Arc<AccessTokenManager>>,
}

impl TokenManagerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a manager under its API id.
    pub fn insert(&mut self, manager: Arc<AccessTokenManager>) {
        self.managers.insert(manager.api(), manager);
    }

    /// The manager for an API, if one was registered.
    pub fn get(&self, api: ApiId) -> Option<&Arc<AccessTokenManager>> {
        self.managers.get(&api)
    }

    /// The current `Authorization` header value for an API.
    pub fn authorization_for(&self, api: ApiId) -> Result<String> {
        let manager = self.managers.get(&api).ok_or_else(|| HubError::TokenAcquisition {
            api,
            detail: "no token manager configured for this api".to_string(),
        })?;
        manager.current_authorization()
    }
}
