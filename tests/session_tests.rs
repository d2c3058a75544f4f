//! Session store integration tests: credential persistence across store
//! instances and restore behavior for stale slots.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use taskdash::session::{FileCredentialStorage, Role, SessionStore};

fn forge_token(username: &str, role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = serde_json::json!({
        "sub": "9", "username": username, "role": role,
        "is_active": true, "exp": 4102444800i64
    });
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
    format!("{header}.{body}.sig")
}

#[test]
fn session_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let slot = dir.path().join("credential");

    let store = SessionStore::new(Box::new(FileCredentialStorage::new(&slot)));
    let token = forge_token("ada", "admin");
    store.login(&token).unwrap();
    assert_eq!(std::fs::read_to_string(&slot).unwrap(), token);
    drop(store);

    // a fresh store over the same slot restores the session
    let store = SessionStore::new(Box::new(FileCredentialStorage::new(&slot)));
    assert!(store.is_authenticated());
    let claims = store.current_claims().unwrap();
    assert_eq!(claims.username, "ada");
    assert_eq!(claims.role, Role::Admin);
    assert!(store.has_role(Role::Admin));
}

#[test]
fn corrupt_slot_restores_logged_out_and_is_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let slot = dir.path().join("credential");
    std::fs::write(&slot, "not-a-token").unwrap();

    let store = SessionStore::new(Box::new(FileCredentialStorage::new(&slot)));
    assert!(!store.is_authenticated());
    assert_eq!(store.current_claims(), None);
    // the stale slot is gone, so the next start does not re-decode it
    assert!(!slot.exists());
}

#[test]
fn logout_clears_the_slot() {
    let dir = tempfile::tempdir().unwrap();
    let slot = dir.path().join("credential");

    let store = SessionStore::new(Box::new(FileCredentialStorage::new(&slot)));
    store.login(&forge_token("ada", "viewer")).unwrap();
    assert!(slot.exists());
    store.logout();
    assert!(!slot.exists());
    assert!(!store.is_authenticated());

    // and the next store starts logged out
    let store = SessionStore::new(Box::new(FileCredentialStorage::new(&slot)));
    assert!(!store.is_authenticated());
}

#[test]
fn malformed_login_does_not_disturb_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let slot = dir.path().join("credential");

    let store = SessionStore::new(Box::new(FileCredentialStorage::new(&slot)));
    let token = forge_token("ada", "moderator");
    store.login(&token).unwrap();
    assert!(store.login("three.bogus.segments").is_err());
    assert_eq!(store.current_claims().unwrap().username, "ada");
    assert_eq!(std::fs::read_to_string(&slot).unwrap(), token);
}
