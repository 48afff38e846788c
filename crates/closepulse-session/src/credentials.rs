//! Credential verification
//!
//! The session store never compares passwords itself. It asks a
//! [`CredentialVerifier`], so a real identity provider can replace the
//! single demo account without touching the session state machine.

use closepulse_core::{Session, config::AuthConfig};

/// Pluggable credential check
pub trait CredentialVerifier: Send + Sync {
    /// Whether the pair is accepted
    fn verify(&self, email: &str, password: &str) -> bool;

    /// Identity for an email that passed [`CredentialVerifier::verify`]
    fn session_for(&self, email: &str) -> Session;
}

/// Accepts exactly one email/password pair
#[derive(Clone)]
pub struct StaticCredentials {
    email: String,
    password: String,
    user_id: String,
    user_name: String,
}

impl StaticCredentials {
    /// Create a verifier for one account
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    /// Verifier for the configured demo account
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.email,
            &config.password,
            &config.user_id,
            &config.user_name,
        )
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, email: &str, password: &str) -> bool {
        email == self.email && password == self.password
    }

    fn session_for(&self, email: &str) -> Session {
        Session {
            id: self.user_id.clone(),
            email: email.to_string(),
            name: self.user_name.clone(),
        }
    }
}
