//! Roasting profiles and the sessions roasted against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{RecordId, UserId};

/// Target roast degree of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoastLevel {
    Light,
    Medium,
    #[serde(rename = "Medium-Dark")]
    MediumDark,
    Dark,
}

/// A reusable roast recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastingProfile {
    pub name: String,
    pub roast_level: RoastLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bean_type: Option<String>,
    /// Charge temperature in °C.
    pub charge_temperature: f64,
    /// Drop temperature in °C.
    pub drop_temperature: f64,
    /// Seconds from charge to first crack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_crack_time: Option<u32>,
    /// Seconds from charge to drop.
    pub total_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastingProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roast_level: Option<RoastLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bean_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_crack_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One batch roasted from a green bean lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastingSession {
    pub bean_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<RecordId>,
    pub roaster_id: UserId,
    /// Green weight charged, kg.
    pub green_weight: f64,
    /// Roasted weight dropped, kg.
    pub roasted_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub roast_date: DateTime<Utc>,
}

impl RoastingSession {
    /// Moisture and chaff loss as a percentage of the green weight.
    ///
    /// Returns `None` for a zero or negative green weight.
    pub fn weight_loss_percent(&self) -> Option<f64> {
        if self.green_weight <= 0.0 {
            return None;
        }
        Some((self.green_weight - self.roasted_weight) / self.green_weight * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastingSessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roasted_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roast_date: Option<DateTime<Utc>>,
}
