//! End-to-end session lifecycle across simulated restarts

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use closepulse_core::{ActionOutcome, SessionSnapshot, SessionState};
use closepulse_session::{
    ErrorKind, FileStore, LOGIN_SUCCESS_MESSAGE, MemoryStore, PASSWORD_RESET_MESSAGE,
    SessionError,
};
use common::{DEMO_EMAIL, DEMO_PASSWORD, STORAGE_KEY, immediate_store, restarted};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use tokio_test::assert_ok;

#[tokio::test]
async fn remembered_login_survives_restart() {
    let storage = MemoryStore::new();

    let first = restarted(&storage);
    first.restore().await;
    let session = assert_ok!(first.try_login(DEMO_EMAIL, DEMO_PASSWORD, true).await);
    drop(first);

    let second = restarted(&storage);
    let snapshot = second.restore().await;

    assert_eq!(snapshot, SessionSnapshot::authenticated(session));
}

#[tokio::test]
async fn unremembered_login_does_not_survive_restart() {
    let storage = MemoryStore::new();

    let first = restarted(&storage);
    first.restore().await;
    assert_ok!(first.try_login(DEMO_EMAIL, DEMO_PASSWORD, false).await);
    assert!(first.is_authenticated());

    let second = restarted(&storage);
    assert_eq!(second.restore().await, SessionSnapshot::anonymous());
}

#[tokio::test]
async fn logout_clears_slot_for_next_process() {
    let storage = MemoryStore::new();

    let first = restarted(&storage);
    assert_ok!(first.try_login(DEMO_EMAIL, DEMO_PASSWORD, true).await);
    first.logout().await;
    first.logout().await;
    assert_eq!(first.snapshot(), SessionSnapshot::anonymous());

    let second = restarted(&storage);
    assert_eq!(second.restore().await.state, SessionState::Anonymous);
    assert!(storage.raw(STORAGE_KEY).is_none());
}

#[rstest]
#[case::garbage("not json at all")]
#[case::wrong_shape(r#"["user-1"]"#)]
#[case::missing_field(r#"{"id":"user-1","name":"Demo User"}"#)]
#[case::empty_email(r#"{"id":"user-1","email":"","name":"Demo User"}"#)]
#[tokio::test]
async fn corrupt_slot_heals_to_anonymous(#[case] stored: &str) {
    let storage = MemoryStore::new();
    storage.insert_raw(STORAGE_KEY, stored);

    let store = restarted(&storage);
    let snapshot = store.restore().await;

    assert_eq!(snapshot, SessionSnapshot::anonymous());
    assert!(storage.raw(STORAGE_KEY).is_none());

    // Healed store still accepts a login
    assert_eq!(
        store.login(DEMO_EMAIL, DEMO_PASSWORD, false).await,
        ActionOutcome::succeeded(LOGIN_SUCCESS_MESSAGE)
    );
}

#[rstest]
#[case("", "x", ErrorKind::Validation)]
#[case("x", "", ErrorKind::Validation)]
#[case(DEMO_EMAIL, "wrongpass", ErrorKind::Authentication)]
#[case("someone@else.com", DEMO_PASSWORD, ErrorKind::Authentication)]
#[tokio::test]
async fn failed_login_leaves_session_unchanged(
    #[case] email: &str,
    #[case] password: &str,
    #[case] kind: ErrorKind,
) {
    let storage = MemoryStore::new();
    let store = restarted(&storage);
    store.restore().await;

    let err = store.try_login(email, password, true).await.unwrap_err();

    assert_eq!(err.kind(), kind);
    assert_eq!(store.snapshot(), SessionSnapshot::anonymous());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn forgot_password_never_reveals_accounts() {
    let store = restarted(&MemoryStore::new());

    assert!(matches!(
        store.try_forgot_password("").await,
        Err(SessionError::MissingEmail)
    ));
    for email in [DEMO_EMAIL, "anything@x.com", "not-even-an-address"] {
        assert_eq!(
            assert_ok!(store.try_forgot_password(email).await),
            PASSWORD_RESET_MESSAGE
        );
    }
}

#[tokio::test]
async fn file_store_persists_between_processes() {
    let dir = tempfile::tempdir().unwrap();

    let first = immediate_store(Arc::new(FileStore::new(dir.path())));
    first.restore().await;
    let session = assert_ok!(first.try_login(DEMO_EMAIL, DEMO_PASSWORD, true).await);
    assert!(dir.path().join(format!("{STORAGE_KEY}.json")).exists());

    let second = immediate_store(Arc::new(FileStore::new(dir.path())));
    assert_eq!(second.restore().await.session, Some(session));

    second.logout().await;
    assert!(!dir.path().join(format!("{STORAGE_KEY}.json")).exists());
}

#[tokio::test]
async fn file_store_corrupt_file_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{STORAGE_KEY}.json"));
    std::fs::write(&path, "{").unwrap();

    let store = immediate_store(Arc::new(FileStore::new(dir.path())));

    assert_eq!(store.restore().await.state, SessionState::Anonymous);
    assert!(!path.exists());
}
