//! Client-side state store.
//!
//! The current snapshot lives behind a `watch` channel. Each dispatched action
//! is reduced into a new immutable snapshot that replaces the old one in a
//! single send, so subscribers only ever observe whole transitions.

mod reducer;

use std::sync::Arc;

use tokio::sync::watch;

pub use reducer::{AppAction, AppState};

#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<Arc<AppState>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(state));
        Self { tx: Arc::new(tx) }
    }

    pub fn dispatch(&self, action: AppAction) {
        tracing::debug!(action = action_name(&action), "dispatch");
        self.tx.send_modify(|state| {
            let next = (**state).clone().reduce(action);
            *state = Arc::new(next);
        });
    }

    /// The current snapshot. Cheap; later dispatches do not affect it.
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.tx.subscribe()
    }
}

fn action_name(action: &AppAction) -> &'static str {
    match action {
        AppAction::SetUser(_) => "SET_USER",
        AppAction::SetLoading(_) => "SET_LOADING",
        AppAction::SetInitialized(_) => "SET_INITIALIZED",
        AppAction::SetUsers(_) => "SET_USERS",
        AppAction::SetGreenBeans(_) => "SET_GREEN_BEANS",
        AppAction::SetRoastingProfiles(_) => "SET_ROASTING_PROFILES",
        AppAction::SetRoastingSessions(_) => "SET_ROASTING_SESSIONS",
        AppAction::SetSales(_) => "SET_SALES",
        AppAction::SetNotifications(_) => "SET_NOTIFICATIONS",
        AppAction::AddUser(_) => "ADD_USER",
        AppAction::UpdateUser(_) => "UPDATE_USER",
        AppAction::DeleteUser(_) => "DELETE_USER",
        AppAction::AddGreenBean(_) => "ADD_GREEN_BEAN",
        AppAction::UpdateGreenBean(_) => "UPDATE_GREEN_BEAN",
        AppAction::DeleteGreenBean(_) => "DELETE_GREEN_BEAN",
        AppAction::AddRoastingProfile(_) => "ADD_ROASTING_PROFILE",
        AppAction::UpdateRoastingProfile(_) => "UPDATE_ROASTING_PROFILE",
        AppAction::DeleteRoastingProfile(_) => "DELETE_ROASTING_PROFILE",
        AppAction::AddRoastingSession(_) => "ADD_ROASTING_SESSION",
        AppAction::UpdateRoastingSession(_) => "UPDATE_ROASTING_SESSION",
        AppAction::DeleteRoastingSession(_) => "DELETE_ROASTING_SESSION",
        AppAction::AddSale(_) => "ADD_SALE",
        AppAction::UpdateSale(_) => "UPDATE_SALE",
        AppAction::DeleteSale(_) => "DELETE_SALE",
        AppAction::AddNotification(_) => "ADD_NOTIFICATION",
        AppAction::MarkNotificationRead(_) => "MARK_NOTIFICATION_READ",
        AppAction::DeleteNotification(_) => "DELETE_NOTIFICATION",
        AppAction::Batch(_) => "BATCH",
    }
}
