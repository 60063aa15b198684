use chrono::Utc;

use beanshub_domain::id::UserId;
use beanshub_domain::user::{User, UserRole};

use crate::domain::profile::{
    USERS_COLLECTION, decode_profile, encode_profile, last_login_fields, profile_id,
};
use crate::domain::repository::{DocumentStore, IdentityPort};
use crate::domain::types::SetMode;
use crate::error::ClientError;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Read a profile by uid. `Ok(None)` when no profile document exists.
pub async fn fetch_profile(
    store: &impl DocumentStore,
    uid: &UserId,
) -> Result<Option<User>, ClientError> {
    match store.get(USERS_COLLECTION, &profile_id(uid)).await? {
        Some(fields) => decode_profile(uid, &fields).map(Some),
        None => Ok(None),
    }
}

/// Like [`fetch_profile`], but read failures are logged and reported as absence.
pub async fn fetch_profile_or_absent(store: &impl DocumentStore, uid: &UserId) -> Option<User> {
    match fetch_profile(store, uid).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(user_id = %uid, error = %e, "error getting current user");
            None
        }
    }
}

// ── SignUp ───────────────────────────────────────────────────────────────────

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub phone: Option<String>,
    /// Defaults to `Staff`.
    pub role: Option<UserRole>,
}

/// Checks run before any network call.
pub fn validate_sign_up(input: &SignUpInput) -> Result<(), ClientError> {
    if input.password != input.confirm_password {
        return Err(ClientError::PasswordMismatch);
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::PasswordTooShort);
    }
    Ok(())
}

pub struct SignUpUseCase<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    pub identity: I,
    pub store: S,
}

impl<I, S> SignUpUseCase<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    /// Creates the credential, names it, then writes the profile.
    ///
    /// A failure after the credential exists leaves the credential in place;
    /// nothing is rolled back.
    pub async fn execute(&self, input: SignUpInput) -> Result<User, ClientError> {
        validate_sign_up(&input)?;

        let auth = self
            .identity
            .create_account(&input.email, &input.password)
            .await?;
        self.identity.update_display_name(&input.name).await?;

        let now = Utc::now();
        let user = User {
            id: auth.uid,
            email: input.email,
            name: input.name,
            role: input.role.unwrap_or_default(),
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            is_active: true,
            created_at: now,
            last_login: Some(now),
        };

        let fields = encode_profile(&user)?;
        self.store
            .set(USERS_COLLECTION, &profile_id(&user.id), &fields, SetMode::Replace)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "profile write failed after credential creation");
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "account created");
        Ok(user)
    }
}

// ── SignIn ───────────────────────────────────────────────────────────────────

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub struct SignInUseCase<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    pub identity: I,
    pub store: S,
}

impl<I, S> SignInUseCase<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    pub async fn execute(&self, input: SignInInput) -> Result<User, ClientError> {
        let auth = self.identity.sign_in(&input.email, &input.password).await?;

        let mut user = fetch_profile(&self.store, &auth.uid)
            .await?
            .ok_or(ClientError::ProfileNotFound)?;

        let now = Utc::now();
        self.store
            .set(
                USERS_COLLECTION,
                &profile_id(&auth.uid),
                &last_login_fields(now),
                SetMode::Merge,
            )
            .await?;
        user.last_login = Some(now);

        tracing::info!(user_id = %user.id, "signed in");
        Ok(user)
    }
}

// ── SignOut ──────────────────────────────────────────────────────────────────

pub struct SignOutUseCase<I: IdentityPort> {
    pub identity: I,
}

impl<I: IdentityPort> SignOutUseCase<I> {
    /// Ends the identity session. Cached collections are left alone.
    pub async fn execute(&self) -> Result<(), ClientError> {
        self.identity.sign_out().await
    }
}

// ── GetCurrentUser ───────────────────────────────────────────────────────────

pub struct GetCurrentUserUseCase<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    pub identity: I,
    pub store: S,
}

impl<I, S> GetCurrentUserUseCase<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    /// Never fails: no identity, no profile, and read errors all yield `None`.
    pub async fn execute(&self) -> Option<User> {
        let auth = self.identity.current_user()?;
        fetch_profile_or_absent(&self.store, &auth.uid).await
    }
}
