//! User profile types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Staff role within the roastery.
///
/// Wire format: the variant name as a string (`"Admin"`, `"Roaster"`, `"Staff"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Roaster,
    /// Assigned to every self-service sign-up.
    #[default]
    Staff,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Roaster => "Roaster",
            Self::Staff => "Staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Roaster" => Ok(Self::Roaster),
            "Staff" => Ok(Self::Staff),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Application-level user profile, distinct from the identity credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Partial update of a profile. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.phone.is_none() && self.is_active.is_none()
    }

    /// Apply the patch to a held copy of the profile.
    pub fn apply(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name.clone_from(name);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(ref phone) = self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}
