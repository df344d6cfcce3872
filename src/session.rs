//! Single-user session kept under the session key.
//!
//! Login is a local convenience, not authentication: any non-empty username
//! and password pair is accepted and only the username is stored.

use serde::{Deserialize, Serialize};

use crate::codec::DocumentCodec;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    codec: DocumentCodec,
    key: String,
}

impl SessionStore {
    pub fn new(codec: DocumentCodec, key: impl Into<String>) -> Self {
        Self {
            codec,
            key: key.into(),
        }
    }

    /// Store `username` as the current user. Returns `false`, writing
    /// nothing, when either credential is empty.
    pub fn login(&self, username: &str, password: &str) -> Result<bool> {
        if username.trim().is_empty() || password.is_empty() {
            tracing::debug!("login rejected: empty credentials");
            return Ok(false);
        }

        let session = Session {
            username: username.to_string(),
        };
        self.codec.encode(&self.key, &session)?;
        tracing::info!(%username, "logged in");
        Ok(true)
    }

    pub fn logout(&self) -> Result<()> {
        self.codec.clear(&self.key)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Stored username; a record with a blank username counts as logged out.
    pub fn current_user(&self) -> Result<Option<String>> {
        let session: Option<Session> = self.codec.decode(&self.key)?;
        Ok(session
            .map(|session| session.username)
            .filter(|username| !username.trim().is_empty()))
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_user()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::{MemorySubstrate, Substrate};
    use std::sync::Arc;

    fn store() -> (Arc<MemorySubstrate>, SessionStore) {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = SessionStore::new(DocumentCodec::new(substrate.clone()), "tm_user");
        (substrate, store)
    }

    #[test]
    fn test_login_logout_cycle() {
        let (substrate, store) = store();
        assert!(!store.is_authenticated().unwrap());

        assert!(store.login("ada", "secret").unwrap());
        assert_eq!(store.current_user().unwrap().as_deref(), Some("ada"));
        assert!(substrate.get("tm_user").unwrap().unwrap().contains("\"username\""));

        store.logout().unwrap();
        assert_eq!(store.current_user().unwrap(), None);
        assert_eq!(substrate.get("tm_user").unwrap(), None);
    }

    #[test]
    fn test_login_requires_both_credentials() {
        let (substrate, store) = store();
        assert!(!store.login("", "secret").unwrap());
        assert!(!store.login("ada", "").unwrap());
        assert!(!store.login("   ", "secret").unwrap());
        assert_eq!(substrate.get("tm_user").unwrap(), None);
    }

    #[test]
    fn test_blank_stored_username_is_logged_out() {
        let (substrate, store) = store();
        for stored in [r#"{"username":""}"#, r#"{"username":"  "}"#, "null"] {
            substrate.set("tm_user", stored).unwrap();
            assert_eq!(store.current_user().unwrap(), None, "stored {stored}");
            assert!(!store.is_authenticated().unwrap());
        }
    }

    #[test]
    fn test_corrupt_session_is_decode_error() {
        let (substrate, store) = store();
        substrate.set("tm_user", "not json").unwrap();
        assert!(matches!(store.current_user(), Err(Error::Decode { .. })));
    }
}
