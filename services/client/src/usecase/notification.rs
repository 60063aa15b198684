use beanshub_domain::id::{RecordId, UserId};
use beanshub_domain::notification::{Notification, NotificationPatch};
use beanshub_domain::stored::Stored;

use crate::domain::record::Record;
use crate::domain::repository::DocumentStore;
use crate::domain::types::{Query, Sort};
use crate::error::ClientError;
use crate::usecase::records::{list_records, update_record};

/// The only filtered, server-ordered read: one user's notifications, newest first.
pub fn notifications_for(user_id: &UserId) -> Query {
    Query::where_eq("userId", user_id.as_str()).order_by(Notification::DATE_FIELD, Sort::Desc)
}

pub async fn list_notifications(
    store: &impl DocumentStore,
    user_id: &UserId,
) -> Result<Vec<Stored<Notification>>, ClientError> {
    list_records(store, &notifications_for(user_id)).await
}

// ── Notifications ────────────────────────────────────────────────────────────

pub struct NotificationsUseCase<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> NotificationsUseCase<S> {
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Stored<Notification>>, ClientError> {
        list_notifications(&self.store, user_id).await
    }

    pub async fn mark_read(&self, id: &RecordId) -> Result<(), ClientError> {
        let patch = NotificationPatch {
            read: Some(true),
            ..Default::default()
        };
        update_record::<Notification>(&self.store, id, &patch).await
    }
}
