//! Admin login.
//!
//! There is no real access control yet: [`StaticCredentials`] compares a
//! configured username/password pair and must be replaced by a server-side
//! check before the admin surface is exposed beyond a trusted device.

use crate::config::AdminCredentials;

pub trait AdminAuthenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Placeholder authenticator backed by a single configured pair.
/// With no pair configured every login fails.
pub struct StaticCredentials {
    credentials: Option<AdminCredentials>,
}

impl StaticCredentials {
    pub fn new(credentials: Option<AdminCredentials>) -> Self {
        if credentials.is_some() {
            tracing::warn!("admin login uses placeholder static credentials");
        }
        Self { credentials }
    }
}

impl AdminAuthenticator for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(|c| c.username == username && c.password == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credentials_denies_everyone() {
        let auth = StaticCredentials::new(None);
        assert!(!auth.verify("", ""));
        assert!(!auth.verify("admin", "admin"));
    }

    #[test]
    fn matches_configured_pair_only() {
        let auth = StaticCredentials::new(Some(AdminCredentials {
            username: "ops".into(),
            password: "pw".into(),
        }));
        assert!(auth.verify("ops", "pw"));
        assert!(!auth.verify("ops", "PW"));
        assert!(!auth.verify("OPS", "pw"));
    }
}
