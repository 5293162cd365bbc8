//! Session token resolution and storage
//!
//! A withdrawal session is keyed by an opaque bearer token. The token arrives
//! either embedded in the initial navigation path (freshly issued by the host
//! application) or from the durable store left behind by a previous visit.
//! Resolution is synchronous and runs once per session, before any network
//! fetch is issued.

mod resolver;
mod store;

pub use resolver::{resolve_session, SessionContext};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Opaque bearer credential identifying the authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    // Mask the credential in logs, keep enough to correlate sessions.
    // Tokens come off an arbitrary URL path, so slice by chars, not bytes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "{}***", prefix)
    }
}
