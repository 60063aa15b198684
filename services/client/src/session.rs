//! Session bootstrap: keeps the store in step with the identity provider.

use beanshub_domain::bean::GreenBean;
use beanshub_domain::id::UserId;
use beanshub_domain::roasting::{RoastingProfile, RoastingSession};
use beanshub_domain::sale::Sale;

use crate::domain::repository::{DocumentStore, IdentityPort};
use crate::domain::types::{AuthUser, Query};
use crate::error::ClientError;
use crate::store::{AppAction, Store};
use crate::usecase::auth::fetch_profile_or_absent;
use crate::usecase::notification::list_notifications;
use crate::usecase::records::list_records;

pub struct SessionBootstrap<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    pub identity: I,
    pub documents: S,
    pub store: Store,
}

impl<I, S> SessionBootstrap<I, S>
where
    I: IdentityPort,
    S: DocumentStore,
{
    /// Follow the identity feed until the provider is dropped. The identity
    /// current at subscription time is handled first.
    pub async fn run(&self) {
        let mut changes = self.identity.subscribe();
        changes.mark_changed();
        while changes.changed().await.is_ok() {
            let auth = changes.borrow_and_update().clone();
            self.handle_transition(auth).await;
        }
        tracing::debug!("identity feed closed");
    }

    /// Apply one sign-in or sign-out. Never fails; `loading` is raised for the
    /// duration and `initialized` is set once it completes.
    ///
    /// Signing out clears the current user only. Collections stay as they were
    /// until the next sign-in replaces them.
    pub async fn handle_transition(&self, auth: Option<AuthUser>) {
        self.store.dispatch(AppAction::SetLoading(true));

        match auth {
            Some(auth) => {
                let user = fetch_profile_or_absent(&self.documents, &auth.uid).await;
                self.store.dispatch(AppAction::SetUser(user.clone()));
                match user {
                    Some(user) => {
                        if let Err(e) = self.load_user_data(&user.id).await {
                            tracing::error!(user_id = %user.id, error = %e, "error loading user data");
                        }
                    }
                    None => {
                        tracing::warn!(user_id = %auth.uid, "no profile for signed-in identity, treating as signed out");
                    }
                }
            }
            None => {
                self.store.dispatch(AppAction::SetUser(None));
                tracing::info!("signed out");
            }
        }

        self.store.dispatch(AppAction::Batch(vec![
            AppAction::SetLoading(false),
            AppAction::SetInitialized(true),
        ]));
    }

    /// Fetch the five collections concurrently and apply them together.
    /// Any failure leaves every collection as it was.
    pub async fn load_user_data(&self, user_id: &UserId) -> Result<(), ClientError> {
        let all = Query::all();
        let (green_beans, roasting_profiles, roasting_sessions, sales, notifications) = tokio::try_join!(
            list_records::<GreenBean>(&self.documents, &all),
            list_records::<RoastingProfile>(&self.documents, &all),
            list_records::<RoastingSession>(&self.documents, &all),
            list_records::<Sale>(&self.documents, &all),
            list_notifications(&self.documents, user_id),
        )?;

        tracing::info!(
            user_id = %user_id,
            green_beans = green_beans.len(),
            roasting_profiles = roasting_profiles.len(),
            roasting_sessions = roasting_sessions.len(),
            sales = sales.len(),
            notifications = notifications.len(),
            "user data loaded"
        );

        self.store.dispatch(AppAction::Batch(vec![
            AppAction::SetGreenBeans(green_beans),
            AppAction::SetRoastingProfiles(roasting_profiles),
            AppAction::SetRoastingSessions(roasting_sessions),
            AppAction::SetSales(sales),
            AppAction::SetNotifications(notifications),
        ]));
        Ok(())
    }
}
