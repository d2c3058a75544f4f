use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::ClientResult;

use super::claims::{decode_claims, Claims, Role};
use super::storage::CredentialStorage;

#[derive(Debug, Clone)]
struct ActiveSession {
    credential: String,
    claims: Claims,
}

/// Single source of truth for "is there a logged-in user, and what can they
/// do". Claims are decoded once per credential change and cached; the
/// persistent slot is touched only from here.
pub struct SessionStore {
    storage: Box<dyn CredentialStorage>,
    active: RwLock<Option<ActiveSession>>,
}

impl SessionStore {
    /// Build the store and restore any previously persisted credential.
    /// A credential that no longer decodes is treated as logged out, and the
    /// stale slot is cleared.
    pub fn new(storage: Box<dyn CredentialStorage>) -> Self {
        let active = match storage.load() {
            Ok(Some(credential)) => match decode_claims(&credential) {
                Ok(claims) => {
                    info!(target: "taskdash::session", "restored session for '{}' ({})", claims.username, claims.role);
                    Some(ActiveSession { credential, claims })
                }
                Err(e) => {
                    warn!(target: "taskdash::session", "stored credential no longer decodes, discarding: {}", e);
                    if let Err(e) = storage.clear() {
                        warn!(target: "taskdash::session", "failed to clear stale credential slot: {}", e);
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(target: "taskdash::session", "credential slot unreadable, starting logged out: {}", e);
                None
            }
        };
        Self { storage, active: RwLock::new(active) }
    }

    /// Accept a freshly issued credential. Fails with `MalformedCredential`
    /// when the claims do not decode, leaving any prior session untouched.
    pub fn login(&self, credential: &str) -> ClientResult<Claims> {
        let claims = decode_claims(credential)?;
        self.storage.save(credential)?;
        *self.active.write() = Some(ActiveSession {
            credential: credential.to_string(),
            claims: claims.clone(),
        });
        info!(target: "taskdash::session", "logged in as '{}' ({})", claims.username, claims.role);
        Ok(claims)
    }

    /// Drop the session unconditionally. Safe to call when already logged out.
    pub fn logout(&self) {
        let had_session = self.active.write().take().is_some();
        if let Err(e) = self.storage.clear() {
            warn!(target: "taskdash::session", "failed to clear credential slot on logout: {}", e);
        }
        if had_session {
            info!(target: "taskdash::session", "logged out");
        }
    }

    pub fn current_claims(&self) -> Option<Claims> {
        self.active.read().as_ref().map(|s| s.claims.clone())
    }

    pub fn credential(&self) -> Option<String> {
        self.active.read().as_ref().map(|s| s.credential.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.active.read().is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.active.read().as_ref().map(|s| s.claims.role == role).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryCredentialStorage;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn forge(username: &str, role: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = serde_json::json!({
            "sub": "42", "username": username, "role": role,
            "is_active": true, "exp": 4102444800i64
        });
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        format!("{header}.{body}.sig")
    }

    fn store() -> SessionStore {
        SessionStore::new(Box::new(MemoryCredentialStorage::new()))
    }

    #[test]
    fn login_caches_claims() {
        let store = store();
        assert!(!store.is_authenticated());
        let claims = store.login(&forge("ada", "moderator")).unwrap();
        assert_eq!(claims.role, Role::Moderator);
        assert_eq!(store.current_claims().unwrap().username, "ada");
        assert!(store.is_authenticated());
        assert!(store.has_role(Role::Moderator));
        assert!(!store.has_role(Role::Admin));
    }

    #[test]
    fn malformed_login_keeps_prior_session() {
        let store = store();
        store.login(&forge("ada", "viewer")).unwrap();
        let err = store.login("garbage-token").unwrap_err();
        assert!(err.ends_session());
        // prior session still intact
        assert_eq!(store.current_claims().unwrap().username, "ada");
        assert!(store.is_authenticated());
    }

    #[test]
    fn logout_is_idempotent() {
        let store = store();
        store.logout();
        assert!(!store.is_authenticated());
        store.login(&forge("ada", "viewer")).unwrap();
        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
        assert_eq!(store.current_claims(), None);
        assert_eq!(store.credential(), None);
    }
}
