//! Provider-issued credential pairs.
//!
//! How credentials are supplied (files, environment, secret stores) is a
//! concern of the embedding application; the core and the upstream clients
//! only need the resolved pair.

use std::fmt;

/// A username/password pair issued by the provider for one API.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Manual impl so the password never lands in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_password() {
        let credentials = Credentials::new("svc-user", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("svc-user"));
        assert!(!rendered.contains("hunter2"));
    }
}
