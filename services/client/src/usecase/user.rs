use beanshub_domain::id::UserId;
use beanshub_domain::user::{User, UserPatch};

use crate::domain::profile::{USERS_COLLECTION, decode_profile, encode_profile_patch, profile_id};
use crate::domain::repository::DocumentStore;
use crate::domain::types::Query;
use crate::error::ClientError;

// ── Roster ───────────────────────────────────────────────────────────────────

/// Administrative access to every profile.
pub struct UsersUseCase<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> UsersUseCase<S> {
    pub async fn list(&self) -> Result<Vec<User>, ClientError> {
        let snapshots = self
            .store
            .list(USERS_COLLECTION, &Query::all())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error listing users"))?;
        snapshots
            .iter()
            .map(|s| decode_profile(&UserId::from(s.id.as_str()), &s.fields))
            .collect()
    }

    /// An empty patch is a no-op and makes no call.
    pub async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<(), ClientError> {
        if patch.is_empty() {
            return Ok(());
        }
        let fields = encode_profile_patch(patch)?;
        self.store
            .update(USERS_COLLECTION, &profile_id(id), &fields)
            .await
            .inspect_err(|e| tracing::error!(user_id = %id, error = %e, "error updating user"))
    }

    /// Removes the profile document only; the identity credential is untouched.
    pub async fn delete(&self, id: &UserId) -> Result<(), ClientError> {
        self.store
            .delete(USERS_COLLECTION, &profile_id(id))
            .await
            .inspect_err(|e| tracing::error!(user_id = %id, error = %e, "error deleting user"))
    }
}
