//! Session token resolution
//!
//! Precedence: a token embedded in the initial navigation path wins over any
//! previously persisted token and is written back to durable storage. Path
//! remainders of 10 characters or fewer are not tokens (ordinary routes like
//! `/home`). Resolution never fails hard; an unreadable store just yields an
//! unauthenticated session.

use tracing::{debug, warn};

use super::store::TokenStore;
use super::SessionToken;

/// Minimum path-remainder length to be treated as a freshly issued token
const MIN_TOKEN_LEN: usize = 11;

/// Explicit per-session context handed to the gateway at construction.
///
/// Built once per session; all token transport derives from this object
/// rather than ad-hoc writes scattered across the flow.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<SessionToken>,
}

impl SessionContext {
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Empty token means "not authenticated yet": dependent fetches suspend
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Resolve the session token from the initial location path and the durable
/// store, persisting a freshly issued token for later visits.
pub fn resolve_session(initial_path: &str, store: &mut dyn TokenStore) -> SessionContext {
    let candidate = initial_path.trim_start_matches('/');

    if candidate.len() >= MIN_TOKEN_LEN {
        debug!("session token taken from navigation path");
        if let Err(e) = store.persist(candidate) {
            // Persistence is best-effort; the in-memory session still works
            warn!("failed to persist session token: {}", e);
        }
        return SessionContext::with_token(SessionToken::new(candidate));
    }

    match store.load() {
        Ok(Some(saved)) => {
            debug!("session token restored from durable storage");
            SessionContext::with_token(SessionToken::new(saved))
        }
        Ok(None) => SessionContext::unauthenticated(),
        Err(e) => {
            warn!("token store unreadable, starting unauthenticated: {}", e);
            SessionContext::unauthenticated()
        }
    }
}
