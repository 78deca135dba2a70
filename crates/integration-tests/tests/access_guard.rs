//! Integration tests for the login marker and access guard over the file
//! store.

#![allow(clippy::unwrap_used)]

use eleegon_core::{Email, UserId};
use eleegon_integration_tests::{state_in, temp_state};
use eleegon_storefront::session::{GuardRejection, GuardState, SessionMarker};
use eleegon_storefront::store::{FileStore, KeyValueStore, keys, save_json};

fn marker() -> SessionMarker {
    SessionMarker {
        id: UserId::new(1),
        email: Email::parse("john@gmail.com").unwrap(),
    }
}

#[tokio::test]
async fn test_no_marker_redirects_to_login() {
    let (_dir, state) = temp_state();
    let mut guard = state.guard();
    assert_eq!(guard.state(), &GuardState::Checking);
    assert!(matches!(
        guard.require().await,
        Err(GuardRejection::RedirectToLogin)
    ));
    assert_eq!(guard.state(), &GuardState::Unauthenticated);
}

#[tokio::test]
async fn test_marker_on_disk_authenticates() {
    let dir = tempfile::tempdir().unwrap();
    save_json(&FileStore::new(dir.path()), keys::SESSION, &marker())
        .await
        .unwrap();

    let state = state_in(&dir);
    let mut guard = state.guard();
    assert_eq!(guard.require().await.unwrap(), marker());
    assert_eq!(guard.state(), &GuardState::Authenticated(marker()));
}

#[tokio::test]
async fn test_logout_removes_marker_file() {
    let dir = tempfile::tempdir().unwrap();
    let raw = FileStore::new(dir.path());
    save_json(&raw, keys::SESSION, &marker()).await.unwrap();

    let state = state_in(&dir);
    state.session().logout().await.unwrap();
    assert!(raw.get(keys::SESSION).await.unwrap().is_none());

    let relaunched = state_in(&dir);
    assert!(relaunched.guard().require().await.is_err());
}

#[tokio::test]
async fn test_corrupt_marker_is_unauthenticated() {
    let dir = tempfile::tempdir().unwrap();
    FileStore::new(dir.path())
        .set(keys::SESSION, "{not json".to_string())
        .await
        .unwrap();

    let state = state_in(&dir);
    let mut guard = state.guard();
    assert_eq!(guard.evaluate().await, &GuardState::Unauthenticated);
}

#[tokio::test]
async fn test_login_short_circuits_with_existing_marker() {
    let dir = tempfile::tempdir().unwrap();
    save_json(&FileStore::new(dir.path()), keys::SESSION, &marker())
        .await
        .unwrap();

    // No request is made when a marker exists, so the default URLs are never hit
    let state = state_in(&dir);
    let outcome = state
        .session()
        .login(state.catalog(), "someone@else.io", &"whatever".to_string().into())
        .await
        .unwrap();
    assert_eq!(outcome.marker(), &marker());
}
