//! Mapping between domain records and store documents.
//!
//! Every record carries exactly one date field. On write it is promoted to a
//! store timestamp; on read it is accepted as a timestamp, as an ISO-8601
//! string, or replaced by the current time when absent or unreadable.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use beanshub_domain::bean::{GreenBean, GreenBeanPatch};
use beanshub_domain::notification::{Notification, NotificationPatch};
use beanshub_domain::roasting::{
    RoastingProfile, RoastingProfilePatch, RoastingSession, RoastingSessionPatch,
};
use beanshub_domain::sale::{Sale, SalePatch};
use beanshub_domain::stored::Stored;

use crate::domain::types::{Document, FieldValue, Snapshot, document_to_json};
use crate::error::ClientError;

/// A record type stored in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const DATE_FIELD: &'static str;
    type Patch: Serialize + Send + Sync;
}

impl Record for GreenBean {
    const COLLECTION: &'static str = "greenBeans";
    const DATE_FIELD: &'static str = "entryDate";
    type Patch = GreenBeanPatch;
}

impl Record for RoastingProfile {
    const COLLECTION: &'static str = "roastingProfiles";
    const DATE_FIELD: &'static str = "createdAt";
    type Patch = RoastingProfilePatch;
}

impl Record for RoastingSession {
    const COLLECTION: &'static str = "roastingSessions";
    const DATE_FIELD: &'static str = "roastDate";
    type Patch = RoastingSessionPatch;
}

impl Record for Sale {
    const COLLECTION: &'static str = "sales";
    const DATE_FIELD: &'static str = "saleDate";
    type Patch = SalePatch;
}

impl Record for Notification {
    const COLLECTION: &'static str = "notifications";
    const DATE_FIELD: &'static str = "timestamp";
    type Patch = NotificationPatch;
}

/// Read a date field in any of the shapes the store has been seen to hold.
pub fn decode_timestamp(value: Option<&FieldValue>) -> DateTime<Utc> {
    match value {
        Some(FieldValue::Timestamp(t)) => *t,
        Some(FieldValue::String(s)) => parse_iso(s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "unreadable date string, substituting now");
            Utc::now()
        }),
        _ => Utc::now(),
    }
}

/// RFC 3339 first, then a zone-less date-time or a bare date taken as UTC.
fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn encode<T: Record>(record: &T) -> Result<Document, ClientError> {
    encode_with_date(record, T::DATE_FIELD)
}

/// Encode a partial record; absent fields are left out of the document.
pub fn encode_patch<T: Record>(patch: &T::Patch) -> Result<Document, ClientError> {
    encode_with_date(patch, T::DATE_FIELD)
}

fn encode_with_date(value: &impl Serialize, date_field: &str) -> Result<Document, ClientError> {
    let Value::Object(map) = to_json(value)? else {
        return Err(ClientError::MalformedDocument(
            "record did not serialize to an object".to_owned(),
        ));
    };
    Ok(map
        .into_iter()
        .map(|(key, value)| {
            let field = if key == date_field {
                promote_date(value)
            } else {
                FieldValue::from_json(value)
            };
            (key, field)
        })
        .collect())
}

fn promote_date(value: Value) -> FieldValue {
    if let Some(dt) = value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    {
        // store timestamps hold microseconds
        return FieldValue::Timestamp(dt.with_timezone(&Utc).trunc_subsecs(6));
    }
    FieldValue::from_json(value)
}

pub fn decode<T: Record>(snapshot: &Snapshot) -> Result<Stored<T>, ClientError> {
    let date = decode_timestamp(snapshot.fields.get(T::DATE_FIELD));
    let mut map = document_to_json(&snapshot.fields);
    map.insert(
        T::DATE_FIELD.to_owned(),
        Value::String(date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    );
    let record = serde_json::from_value(Value::Object(map)).map_err(|e| {
        ClientError::MalformedDocument(format!("{}/{}: {e}", T::COLLECTION, snapshot.id))
    })?;
    Ok(Stored {
        id: snapshot.id.clone(),
        record,
    })
}

/// Overlay a patch on a held record, as the store would after an update.
pub fn apply_patch<T: Record>(record: &T, patch: &T::Patch) -> Result<T, ClientError> {
    let Value::Object(mut base) = to_json(record)? else {
        return Err(ClientError::MalformedDocument(
            "record did not serialize to an object".to_owned(),
        ));
    };
    if let Value::Object(overlay) = to_json(patch)? {
        base.extend(overlay);
    }
    serde_json::from_value(Value::Object(base))
        .map_err(|e| ClientError::MalformedDocument(format!("{}: {e}", T::COLLECTION)))
}

fn to_json(value: &impl Serialize) -> Result<Value, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::MalformedDocument(e.to_string()))
}
