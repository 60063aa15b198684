#![allow(async_fn_in_trait)]

use tokio::sync::watch;

use beanshub_domain::id::RecordId;

use crate::domain::types::{AuthUser, Document, Query, SetMode, Snapshot};
use crate::error::ClientError;

/// Port for the hosted identity provider.
pub trait IdentityPort: Send + Sync {
    /// Create an email/password credential. The new identity becomes the
    /// signed-in user.
    async fn create_account(&self, email: &str, password: &str)
    -> Result<AuthUser, ClientError>;

    /// Set the display name of the signed-in identity.
    async fn update_display_name(&self, name: &str) -> Result<(), ClientError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Sign-in/sign-out feed. The receiver's current value is the identity at
    /// the time of subscription.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// Port for the hosted document store.
pub trait DocumentStore: Send + Sync {
    /// Insert a document; the store assigns and returns its id.
    async fn add(&self, collection: &str, fields: &Document) -> Result<RecordId, ClientError>;

    /// Write a document under a caller-chosen id.
    async fn set(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &Document,
        mode: SetMode,
    ) -> Result<(), ClientError>;

    /// Overwrite the given fields of an existing document.
    /// Fails with `DocumentNotFound` if the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &Document,
    ) -> Result<(), ClientError>;

    async fn get(&self, collection: &str, id: &RecordId)
    -> Result<Option<Document>, ClientError>;

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), ClientError>;

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Snapshot>, ClientError>;
}
