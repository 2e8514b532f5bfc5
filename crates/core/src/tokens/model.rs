//! The access-token value object.

use chrono::Utc;

use crate::catalog::ApiId;

/// Renew once fewer than this many minutes of validity remain.
///
/// Empirically chosen to comfortably exceed any plausible in-flight request
/// duration; kept configurable through
/// [`TokenManagerOptions`](super::TokenManagerOptions).
pub const DEFAULT_RENEWAL_THRESHOLD_MINUTES: i64 = 76;

/// Current time as epoch milliseconds, the unit tokens and cached products
/// are stamped with.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A provider-issued bearer credential for one API.
///
/// Tokens are append-only in storage: every successful refresh persists a
/// new row, and only the most recent row per API is ever read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// API this token authorizes.
    pub api: ApiId,
    /// Datastore primary key; `None` until persisted.
    pub sequence_id: Option<i64>,
    /// Opaque bearer value.
    pub secret: String,
    /// Validity window in seconds, counted from `obtained_at`.
    pub ttl_seconds: i64,
    /// Epoch milliseconds at which the token was obtained.
    pub obtained_at: i64,
}

impl AccessToken {
    /// Whole minutes of validity remaining at `now_ms`; zero for tokens
    /// without a ttl.
    pub fn remaining_minutes(&self, now_ms: i64) -> i64 {
        if self.ttl_seconds == 0 {
            return 0;
        }

        let expires_at = self.obtained_at + self.ttl_seconds * 1000;
        (expires_at - now_ms).div_euclid(60_000)
    }

    /// Whether the token should be renewed: fewer than `threshold_minutes`
    /// of validity remain.
    pub fn needs_renewal(&self, threshold_minutes: i64, now_ms: i64) -> bool {
        self.remaining_minutes(now_ms) < threshold_minutes
    }

    /// Abbreviated secret, safe for logs.
    pub fn masked_secret(&self) -> String {
        if self.secret.len() < 6 {
            return "***".to_string();
        }
        format!(
            "{} ... {}",
            &self.secret[..3],
            &self.secret[self.secret.len() - 2..]
        )
    }
}
