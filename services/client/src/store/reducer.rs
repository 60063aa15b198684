use beanshub_domain::bean::GreenBean;
use beanshub_domain::id::{RecordId, UserId};
use beanshub_domain::notification::Notification;
use beanshub_domain::roasting::{RoastingProfile, RoastingSession};
use beanshub_domain::sale::Sale;
use beanshub_domain::stored::Stored;
use beanshub_domain::user::User;

/// Everything the client holds in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// The signed-in user's profile.
    pub user: Option<User>,
    /// Roster copy for administrative listing.
    pub users: Vec<User>,
    pub green_beans: Vec<Stored<GreenBean>>,
    pub roasting_profiles: Vec<Stored<RoastingProfile>>,
    pub roasting_sessions: Vec<Stored<RoastingSession>>,
    pub sales: Vec<Stored<Sale>>,
    /// Newest first.
    pub notifications: Vec<Stored<Notification>>,
    pub loading: bool,
    pub initialized: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            user: None,
            users: Vec::new(),
            green_beans: Vec::new(),
            roasting_profiles: Vec::new(),
            roasting_sessions: Vec::new(),
            sales: Vec::new(),
            notifications: Vec::new(),
            loading: true,
            initialized: false,
        }
    }
}

/// The fixed vocabulary of state mutations.
///
/// `Set*` replaces a whole collection or field; `Add*`/`Update*`/`Delete*`
/// splice a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SetUser(Option<User>),
    SetLoading(bool),
    SetInitialized(bool),
    SetUsers(Vec<User>),
    SetGreenBeans(Vec<Stored<GreenBean>>),
    SetRoastingProfiles(Vec<Stored<RoastingProfile>>),
    SetRoastingSessions(Vec<Stored<RoastingSession>>),
    SetSales(Vec<Stored<Sale>>),
    SetNotifications(Vec<Stored<Notification>>),
    AddUser(User),
    UpdateUser(User),
    DeleteUser(UserId),
    AddGreenBean(Stored<GreenBean>),
    UpdateGreenBean(Stored<GreenBean>),
    DeleteGreenBean(RecordId),
    AddRoastingProfile(Stored<RoastingProfile>),
    UpdateRoastingProfile(Stored<RoastingProfile>),
    DeleteRoastingProfile(RecordId),
    AddRoastingSession(Stored<RoastingSession>),
    UpdateRoastingSession(Stored<RoastingSession>),
    DeleteRoastingSession(RecordId),
    AddSale(Stored<Sale>),
    UpdateSale(Stored<Sale>),
    DeleteSale(RecordId),
    /// Prepended: the newest notification comes first.
    AddNotification(Stored<Notification>),
    MarkNotificationRead(RecordId),
    DeleteNotification(RecordId),
    /// Applied in order as a single transition; observers never see a prefix.
    Batch(Vec<AppAction>),
}

impl AppState {
    /// Pure transition: consume a snapshot, return the next one.
    #[must_use]
    pub fn reduce(mut self, action: AppAction) -> Self {
        match action {
            AppAction::SetUser(user) => self.user = user,
            AppAction::SetLoading(loading) => self.loading = loading,
            AppAction::SetInitialized(initialized) => self.initialized = initialized,
            AppAction::SetUsers(users) => self.users = users,
            AppAction::SetGreenBeans(items) => self.green_beans = items,
            AppAction::SetRoastingProfiles(items) => self.roasting_profiles = items,
            AppAction::SetRoastingSessions(items) => self.roasting_sessions = items,
            AppAction::SetSales(items) => self.sales = items,
            AppAction::SetNotifications(items) => self.notifications = items,
            AppAction::AddUser(user) => self.users.push(user),
            AppAction::UpdateUser(user) => {
                if let Some(slot) = self.users.iter_mut().find(|u| u.id == user.id) {
                    *slot = user;
                }
            }
            AppAction::DeleteUser(id) => self.users.retain(|u| u.id != id),
            AppAction::AddGreenBean(item) => self.green_beans.push(item),
            AppAction::UpdateGreenBean(item) => replace(&mut self.green_beans, item),
            AppAction::DeleteGreenBean(id) => self.green_beans.retain(|s| s.id != id),
            AppAction::AddRoastingProfile(item) => self.roasting_profiles.push(item),
            AppAction::UpdateRoastingProfile(item) => replace(&mut self.roasting_profiles, item),
            AppAction::DeleteRoastingProfile(id) => self.roasting_profiles.retain(|s| s.id != id),
            AppAction::AddRoastingSession(item) => self.roasting_sessions.push(item),
            AppAction::UpdateRoastingSession(item) => replace(&mut self.roasting_sessions, item),
            AppAction::DeleteRoastingSession(id) => self.roasting_sessions.retain(|s| s.id != id),
            AppAction::AddSale(item) => self.sales.push(item),
            AppAction::UpdateSale(item) => replace(&mut self.sales, item),
            AppAction::DeleteSale(id) => self.sales.retain(|s| s.id != id),
            AppAction::AddNotification(item) => self.notifications.insert(0, item),
            AppAction::MarkNotificationRead(id) => {
                if let Some(slot) = self.notifications.iter_mut().find(|n| n.id == id) {
                    slot.record.read = true;
                }
            }
            AppAction::DeleteNotification(id) => self.notifications.retain(|s| s.id != id),
            AppAction::Batch(actions) => {
                return actions.into_iter().fold(self, Self::reduce);
            }
        }
        self
    }
}

/// Swap in the record with the same id; unknown ids are ignored.
fn replace<T>(items: &mut [Stored<T>], item: Stored<T>) {
    if let Some(slot) = items.iter_mut().find(|s| s.id == item.id) {
        *slot = item;
    }
}
