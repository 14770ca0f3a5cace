//! Credential Boundary
//!
//! The realtime layer appends a bearer token to the connection URI but
//! never refreshes or validates it; that is the credential store's job.
//! Callers hand the manager something implementing [`TokenProvider`].

use super::error::{RealtimeError, RealtimeResult};

/// Supplies the current bearer token for each connect attempt.
pub trait TokenProvider: Send {
    /// Returns the token to embed in the connection URI.
    ///
    /// Called once per connect (including automatic reconnects), so an
    /// implementation backed by a credential store always contributes the
    /// freshest token it holds.
    fn bearer_token(&self) -> RealtimeResult<String>;
}

/// Fixed-token provider for tests and short-lived sessions.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> RealtimeResult<String> {
        if self.token.is_empty() {
            return Err(RealtimeError::AuthenticationFailed("empty token".into()));
        }
        Ok(self.token.clone())
    }
}
