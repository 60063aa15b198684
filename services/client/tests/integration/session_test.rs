use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::watch;

use beanshub_client::domain::record::{Record, encode};
use beanshub_client::domain::repository::IdentityPort;
use beanshub_client::session::SessionBootstrap;
use beanshub_client::store::{AppAction, AppState, Store};
use beanshub_client::usecase::auth::{SignUpInput, SignUpUseCase};
use beanshub_domain::bean::GreenBean;
use beanshub_domain::id::UserId;
use beanshub_domain::notification::{Notification, NotificationKind};
use beanshub_domain::sale::Sale;
use beanshub_domain::stored::Stored;

use crate::helpers::{
    MockDocumentStore, MockIdentity, TEST_UID, store_with_profile, test_auth_user, test_user,
};

fn bean(name: &str) -> GreenBean {
    GreenBean {
        name: name.into(),
        origin: "Colombia".into(),
        variety: None,
        process: Some("Washed".into()),
        supplier: None,
        quantity: 30.0,
        cost_per_kg: 8.0,
        moisture_content: None,
        notes: None,
        entry_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
    }
}

fn notification(user: &str, title: &str) -> Notification {
    Notification {
        user_id: UserId::from(user),
        title: title.into(),
        message: String::new(),
        kind: NotificationKind::Success,
        read: false,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap(),
    }
}

fn seeded_store() -> MockDocumentStore {
    let store = store_with_profile();
    store.insert(GreenBean::COLLECTION, "b1", encode(&bean("Huila")).unwrap());
    store.insert(GreenBean::COLLECTION, "b2", encode(&bean("Nariño")).unwrap());
    store.insert(
        Notification::COLLECTION,
        "n1",
        encode(&notification(TEST_UID, "mine")).unwrap(),
    );
    store.insert(
        Notification::COLLECTION,
        "n2",
        encode(&notification("uid-ben", "not mine")).unwrap(),
    );
    store
}

async fn wait_for(
    states: &mut watch::Receiver<Arc<AppState>>,
    pred: impl Fn(&AppState) -> bool,
) {
    loop {
        if pred(&states.borrow_and_update()) {
            return;
        }
        states.changed().await.unwrap();
    }
}

fn bootstrap(
    identity: MockIdentity,
    documents: MockDocumentStore,
) -> SessionBootstrap<MockIdentity, MockDocumentStore> {
    SessionBootstrap {
        identity,
        documents,
        store: Store::new(),
    }
}

#[tokio::test]
async fn should_load_profile_and_collections_on_sign_in() {
    let session = bootstrap(MockIdentity::new(), seeded_store());

    session.handle_transition(Some(test_auth_user())).await;

    let state = session.store.snapshot();
    assert_eq!(state.user, Some(test_user()));
    assert_eq!(state.green_beans.len(), 2);
    assert!(state.roasting_profiles.is_empty());
    assert_eq!(state.notifications.len(), 1);
    assert_eq!(state.notifications[0].record.title, "mine");
    assert!(!state.loading);
    assert!(state.initialized);
}

#[tokio::test]
async fn should_treat_identity_without_profile_as_signed_out() {
    let documents = MockDocumentStore::new();
    let session = bootstrap(MockIdentity::new(), documents.clone());

    session.handle_transition(Some(test_auth_user())).await;

    let state = session.store.snapshot();
    assert_eq!(state.user, None);
    assert!(state.green_beans.is_empty());
    assert!(state.initialized);
    assert!(!state.loading);
    // only the profile read went out
    assert_eq!(documents.calls(), 1);
}

#[tokio::test]
async fn should_keep_collections_when_one_list_fails() {
    let documents = seeded_store();
    documents.fail_collection(Sale::COLLECTION);
    let session = bootstrap(MockIdentity::new(), documents);
    let held = vec![Stored::new("cached", bean("Cached lot"))];
    session
        .store
        .dispatch(AppAction::SetGreenBeans(held.clone()));

    session.handle_transition(Some(test_auth_user())).await;

    let state = session.store.snapshot();
    assert_eq!(state.user, Some(test_user()));
    assert_eq!(state.green_beans, held);
    assert!(state.notifications.is_empty());
    assert!(!state.loading);
    assert!(state.initialized);
}

#[tokio::test]
async fn should_clear_user_but_keep_collections_on_sign_out() {
    let session = bootstrap(MockIdentity::new(), seeded_store());
    session.handle_transition(Some(test_auth_user())).await;

    session.handle_transition(None).await;

    let state = session.store.snapshot();
    assert_eq!(state.user, None);
    assert_eq!(state.green_beans.len(), 2);
    assert!(!state.loading);
    assert!(state.initialized);
}

#[tokio::test]
async fn should_initialize_on_signed_out_startup() {
    let session = bootstrap(MockIdentity::new(), MockDocumentStore::new());
    assert_eq!(*session.store.snapshot(), AppState::default());

    session.handle_transition(None).await;

    let state = session.store.snapshot();
    assert!(state.initialized);
    assert!(!state.loading);
}

#[tokio::test]
async fn should_follow_identity_feed() {
    let identity = MockIdentity::new();
    let session = bootstrap(identity.clone(), seeded_store());
    let mut states = session.store.subscribe();

    let driver = async {
        wait_for(&mut states, |s| s.initialized && s.user.is_none()).await;
        identity.emit(Some(test_auth_user()));
        wait_for(&mut states, |s| !s.loading && s.user.is_some()).await;
        let signed_in = session.store.snapshot();
        identity.emit(None);
        wait_for(&mut states, |s| !s.loading && s.user.is_none()).await;
        signed_in
    };

    let signed_in = tokio::select! {
        _ = session.run() => panic!("identity feed closed early"),
        state = tokio::time::timeout(Duration::from_secs(5), driver) => state.unwrap(),
    };

    assert_eq!(signed_in.green_beans.len(), 2);
    assert!(signed_in.roasting_sessions.is_empty());
    let state = session.store.snapshot();
    assert_eq!(state.user, None);
    assert_eq!(state.green_beans.len(), 2);
}

#[tokio::test]
async fn should_load_user_data_in_one_update() {
    let session = bootstrap(MockIdentity::new(), seeded_store());
    let mut states = session.store.subscribe();
    states.mark_unchanged();

    session
        .load_user_data(&UserId::from(TEST_UID))
        .await
        .unwrap();

    assert!(states.has_changed().unwrap());
    let state = states.borrow_and_update().clone();
    assert_eq!(state.green_beans.len(), 2);
    assert_eq!(state.notifications.len(), 1);
    assert!(state.roasting_profiles.is_empty());
    assert!(!states.has_changed().unwrap());
}

#[tokio::test]
async fn should_bootstrap_once_for_a_sign_up() {
    let identity = MockIdentity::new();
    let documents = MockDocumentStore::new();
    let session = bootstrap(identity.clone(), documents.clone());
    let mut states = session.store.subscribe();
    let sign_up = SignUpUseCase {
        identity: identity.clone(),
        store: documents.clone(),
    };

    let driver = async {
        wait_for(&mut states, |s| s.initialized && s.user.is_none()).await;
        let user = sign_up
            .execute(SignUpInput {
                email: "ben@example.com".into(),
                password: "hunter22".into(),
                confirm_password: "hunter22".into(),
                name: "Ben".into(),
                phone: None,
                role: None,
            })
            .await
            .unwrap();
        wait_for(&mut states, |s| !s.loading && s.user.is_some()).await;
        let settled = documents.calls();

        // the display name change must not start another bootstrap
        identity.update_display_name("Benjamin").await.unwrap();
        let quiet = tokio::time::timeout(Duration::from_millis(100), states.changed()).await;
        (user, settled, quiet.is_err())
    };

    let (user, settled, quiet) = tokio::select! {
        _ = session.run() => panic!("identity feed closed early"),
        out = tokio::time::timeout(Duration::from_secs(5), driver) => out.unwrap(),
    };

    // profile write, profile read, five collection loads
    assert_eq!(settled, 7);
    assert!(quiet);
    assert_eq!(documents.calls(), settled);
    assert_eq!(session.store.snapshot().user.as_ref().map(|u| &u.id), Some(&user.id));
    assert_eq!(
        identity.current_user().and_then(|u| u.display_name).as_deref(),
        Some("Benjamin")
    );
}
