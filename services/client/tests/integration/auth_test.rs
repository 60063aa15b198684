use beanshub_client::domain::profile::{USERS_COLLECTION, decode_profile};
use beanshub_client::domain::repository::IdentityPort;
use beanshub_client::domain::types::FieldValue;
use beanshub_client::error::ClientError;
use beanshub_client::usecase::auth::{
    GetCurrentUserUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase,
};
use beanshub_client::usecase::user::UsersUseCase;
use beanshub_domain::id::UserId;
use beanshub_domain::user::{UserPatch, UserRole};

use crate::helpers::{
    MockDocumentStore, MockIdentity, TEST_EMAIL, TEST_PASSWORD, TEST_UID, store_with_profile,
    test_auth_user, test_user,
};

fn sign_up_input(role: Option<UserRole>) -> SignUpInput {
    SignUpInput {
        email: "ben@example.com".into(),
        password: "hunter22".into(),
        confirm_password: "hunter22".into(),
        name: "Ben".into(),
        phone: Some("+62 812 0000".into()),
        role,
    }
}

// ── SignUpUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_up_with_default_staff_role() {
    let identity = MockIdentity::new();
    let store = MockDocumentStore::new();
    let use_case = SignUpUseCase {
        identity: identity.clone(),
        store: store.clone(),
    };

    let user = use_case.execute(sign_up_input(None)).await.unwrap();

    assert_eq!(user.role, UserRole::Staff);
    assert!(user.is_active);
    assert_eq!(user.last_login, Some(user.created_at));
    assert_eq!(identity.display_name("ben@example.com").as_deref(), Some("Ben"));

    let doc = store.document(USERS_COLLECTION, user.id.as_str()).unwrap();
    assert_eq!(doc["role"], FieldValue::from("Staff"));
    assert_eq!(doc["id"], FieldValue::from(user.id.as_str()));
    assert_eq!(doc["phone"], FieldValue::from("+62 812 0000"));
    let FieldValue::String(created_at) = &doc["createdAt"] else {
        panic!("createdAt should be stored as an ISO string, got {:?}", doc["createdAt"]);
    };
    assert!(created_at.ends_with('Z'));
    let stored = decode_profile(&user.id, &doc).unwrap();
    assert_eq!(stored.name, "Ben");
    assert_eq!(
        stored.created_at.timestamp_millis(),
        user.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn should_sign_up_with_explicit_role() {
    let store = MockDocumentStore::new();
    let use_case = SignUpUseCase {
        identity: MockIdentity::new(),
        store: store.clone(),
    };

    let user = use_case
        .execute(sign_up_input(Some(UserRole::Admin)))
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Admin);
    let doc = store.document(USERS_COLLECTION, user.id.as_str()).unwrap();
    assert_eq!(doc["role"], FieldValue::from("Admin"));
}

#[tokio::test]
async fn should_reject_mismatched_passwords_without_calling_backend() {
    let identity = MockIdentity::new();
    let store = MockDocumentStore::new();
    let use_case = SignUpUseCase {
        identity: identity.clone(),
        store: store.clone(),
    };
    let mut input = sign_up_input(None);
    input.confirm_password = "hunter23".into();

    let result = use_case.execute(input).await;

    assert!(
        matches!(result, Err(ClientError::PasswordMismatch)),
        "expected PasswordMismatch, got {result:?}"
    );
    assert_eq!(identity.calls(), 0);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn should_reject_short_password_without_calling_backend() {
    let identity = MockIdentity::new();
    let use_case = SignUpUseCase {
        identity: identity.clone(),
        store: MockDocumentStore::new(),
    };
    let mut input = sign_up_input(None);
    input.password = "12345".into();
    input.confirm_password = "12345".into();

    let result = use_case.execute(input).await;

    assert!(
        matches!(result, Err(ClientError::PasswordTooShort)),
        "expected PasswordTooShort, got {result:?}"
    );
    assert_eq!(identity.calls(), 0);
}

#[tokio::test]
async fn should_surface_identity_error_verbatim_on_duplicate_email() {
    let identity = MockIdentity::new().with_account("ben@example.com", "whatever", "uid-ben");
    let use_case = SignUpUseCase {
        identity,
        store: MockDocumentStore::new(),
    };

    let err = use_case.execute(sign_up_input(None)).await.unwrap_err();

    assert_eq!(err.to_string(), "EMAIL_EXISTS");
}

#[tokio::test]
async fn should_keep_credential_when_profile_write_fails() {
    let identity = MockIdentity::new();
    let store = MockDocumentStore::new();
    store.fail_collection(USERS_COLLECTION);
    let use_case = SignUpUseCase {
        identity: identity.clone(),
        store,
    };

    let result = use_case.execute(sign_up_input(None)).await;

    assert!(matches!(result, Err(ClientError::Backend(_))));
    // no compensation: the identity stays created and signed in
    assert!(identity.current_user().is_some());
}

// ── SignInUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_and_record_last_login() {
    let identity = MockIdentity::new().with_account(TEST_EMAIL, TEST_PASSWORD, TEST_UID);
    let store = store_with_profile();
    let use_case = SignInUseCase {
        identity,
        store: store.clone(),
    };

    let user = use_case
        .execute(SignInInput {
            email: TEST_EMAIL.into(),
            password: TEST_PASSWORD.into(),
        })
        .await
        .unwrap();

    assert_eq!(user.id, UserId::from(TEST_UID));
    assert_eq!(user.role, UserRole::Roaster);
    let last_login = user.last_login.expect("last login should be set");

    let doc = store.document(USERS_COLLECTION, TEST_UID).unwrap();
    let stored = decode_profile(&user.id, &doc).unwrap();
    assert_eq!(
        stored.last_login.map(|t| t.timestamp_millis()),
        Some(last_login.timestamp_millis())
    );
    // merge touches lastLogin only
    assert_eq!(stored.name, test_user().name);
    assert_eq!(stored.created_at, test_user().created_at);
}

#[tokio::test]
async fn should_fail_sign_in_when_profile_is_missing() {
    let identity = MockIdentity::new().with_account(TEST_EMAIL, TEST_PASSWORD, TEST_UID);
    let use_case = SignInUseCase {
        identity: identity.clone(),
        store: MockDocumentStore::new(),
    };

    let err = use_case
        .execute(SignInInput {
            email: TEST_EMAIL.into(),
            password: TEST_PASSWORD.into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ProfileNotFound));
    assert_eq!(err.to_string(), "User data not found");
    assert!(identity.current_user().is_some());
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let identity = MockIdentity::new().with_account(TEST_EMAIL, TEST_PASSWORD, TEST_UID);
    let use_case = SignInUseCase {
        identity,
        store: store_with_profile(),
    };

    let err = use_case
        .execute(SignInInput {
            email: TEST_EMAIL.into(),
            password: "nope".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "IDENTITY");
    assert_eq!(err.to_string(), "INVALID_LOGIN_CREDENTIALS");
}

// ── SignOutUseCase / GetCurrentUserUseCase ───────────────────────────────────

#[tokio::test]
async fn should_return_none_when_no_identity_is_signed_in() {
    let use_case = GetCurrentUserUseCase {
        identity: MockIdentity::new(),
        store: store_with_profile(),
    };

    assert_eq!(use_case.execute().await, None);
}

#[tokio::test]
async fn should_return_profile_of_signed_in_identity() {
    let identity = MockIdentity::new().with_account(TEST_EMAIL, TEST_PASSWORD, TEST_UID);
    let store = store_with_profile();
    SignInUseCase {
        identity: identity.clone(),
        store: store.clone(),
    }
    .execute(SignInInput {
        email: TEST_EMAIL.into(),
        password: TEST_PASSWORD.into(),
    })
    .await
    .unwrap();

    let current = GetCurrentUserUseCase {
        identity: identity.clone(),
        store,
    };
    assert_eq!(current.execute().await.map(|u| u.id), Some(UserId::from(TEST_UID)));

    SignOutUseCase {
        identity: identity.clone(),
    }
    .execute()
    .await
    .unwrap();
    assert_eq!(current.execute().await, None);
}

#[tokio::test]
async fn should_swallow_profile_read_errors() {
    let identity = MockIdentity::new().with_account(TEST_EMAIL, TEST_PASSWORD, TEST_UID);
    identity.emit(Some(test_auth_user()));
    let store = store_with_profile();
    store.fail_collection(USERS_COLLECTION);

    let use_case = GetCurrentUserUseCase { identity, store };

    assert_eq!(use_case.execute().await, None);
}

// ── UsersUseCase ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_update_and_delete_profiles() {
    let store = store_with_profile();
    let users = UsersUseCase {
        store: store.clone(),
    };
    let id = UserId::from(TEST_UID);

    assert_eq!(users.list().await.unwrap(), vec![test_user()]);

    let patch = UserPatch {
        is_active: Some(false),
        ..Default::default()
    };
    users.update(&id, &patch).await.unwrap();
    assert!(!users.list().await.unwrap()[0].is_active);

    let calls = store.calls();
    users.update(&id, &UserPatch::default()).await.unwrap();
    assert_eq!(store.calls(), calls);

    users.delete(&id).await.unwrap();
    assert!(users.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn should_fail_update_of_missing_profile() {
    let users = UsersUseCase {
        store: MockDocumentStore::new(),
    };
    let patch = UserPatch {
        name: Some("Nobody".into()),
        ..Default::default()
    };

    let err = users.update(&UserId::from("ghost"), &patch).await.unwrap_err();

    assert_eq!(err.kind(), "DOCUMENT_NOT_FOUND");
}
