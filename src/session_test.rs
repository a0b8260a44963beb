use std::sync::Arc;

use super::*;
use crate::storage::{MemoryStore, TOKEN_KEY};

/// Store whose writes always fail, for exercising the storage-error path.
struct FailingStore {
    seeded: Option<String>,
}

impl TokenStore for FailingStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.seeded.clone())
    }

    fn save(&self, _token: &str) -> Result<(), StorageError> {
        Err(io_failure())
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(io_failure())
    }
}

/// Store whose reads fail.
struct UnreadableStore;

impl TokenStore for UnreadableStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Err(io_failure())
    }

    fn save(&self, _token: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

fn io_failure() -> StorageError {
    StorageError::Io {
        path: "storage.json".into(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
    }
}

// =============================================================================
// open
// =============================================================================

#[test]
fn open_empty_store_is_logged_out() {
    let session = Session::open(MemoryStore::new());
    assert_eq!(session.token(), None);
    assert!(!session.is_authenticated());
}

#[test]
fn open_restores_persisted_token() {
    let session = Session::open(MemoryStore::with_token("restored"));
    assert_eq!(session.token().as_deref(), Some("restored"));
    assert!(session.is_authenticated());
}

#[test]
fn open_ignores_empty_persisted_token() {
    let session = Session::open(MemoryStore::with_token(""));
    assert_eq!(session.token(), None);
}

#[test]
fn open_unreadable_store_starts_logged_out() {
    let session = Session::open(UnreadableStore);
    assert_eq!(session.token(), None);
}

// =============================================================================
// login / logout
// =============================================================================

#[test]
fn login_sets_memory_and_storage() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::open(Arc::clone(&store));

    session.login("abc").unwrap();

    assert_eq!(session.token().as_deref(), Some("abc"));
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("abc"));
}

#[test]
fn login_replaces_previous_token() {
    let store = Arc::new(MemoryStore::with_token("old"));
    let session = Session::open(Arc::clone(&store));

    session.login("new").unwrap();

    assert_eq!(session.token().as_deref(), Some("new"));
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("new"));
}

#[test]
fn login_accepts_any_non_empty_string() {
    let session = Session::open(MemoryStore::new());
    session.login("not.a.jwt at all").unwrap();
    assert_eq!(session.token().as_deref(), Some("not.a.jwt at all"));
}

#[test]
fn login_rejects_empty_token() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::open(Arc::clone(&store));

    let err = session.login("").unwrap_err();

    assert!(matches!(err, SessionError::EmptyToken));
    assert_eq!(session.token(), None);
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[test]
fn logout_clears_memory_and_storage() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::open(Arc::clone(&store));
    session.login("abc").unwrap();

    session.logout().unwrap();

    assert_eq!(session.token(), None);
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[test]
fn logout_is_idempotent() {
    let session = Session::open(MemoryStore::new());
    session.logout().unwrap();
    session.logout().unwrap();
    assert_eq!(session.token(), None);
}

#[test]
fn failed_login_leaves_memory_unchanged() {
    let session = Session::open(FailingStore { seeded: None });

    let err = session.login("abc").unwrap_err();

    assert!(matches!(err, SessionError::Storage(_)));
    assert_eq!(session.token(), None);
}

#[test]
fn failed_logout_keeps_token() {
    let session = Session::open(FailingStore { seeded: Some("kept".into()) });

    assert!(session.logout().is_err());
    assert_eq!(session.token().as_deref(), Some("kept"));
}

#[test]
fn debug_does_not_print_token() {
    let session = Session::open(MemoryStore::with_token("secret-token"));
    let rendered = format!("{session:?}");
    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("authenticated: true"));
}

#[test]
fn concurrent_logins_keep_memory_and_storage_equal() {
    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(Session::open(Arc::clone(&store)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.login(&format!("tok{i}")).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(session.token(), store.get(TOKEN_KEY));
}
