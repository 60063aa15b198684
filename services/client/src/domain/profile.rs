//! Mapping between user profiles and `users` documents.
//!
//! Profiles keep `createdAt` / `lastLogin` as ISO strings rather than store
//! timestamps; reads accept either shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use beanshub_core::serde::{format_rfc3339_ms, to_rfc3339_ms};
use beanshub_domain::id::{RecordId, UserId};
use beanshub_domain::user::{User, UserPatch, UserRole};

use crate::domain::record::decode_timestamp;
use crate::domain::types::{Document, FieldValue, document_to_json};
use crate::error::ClientError;

pub const USERS_COLLECTION: &str = "users";

/// Profiles are keyed by the identity's uid.
pub fn profile_id(id: &UserId) -> RecordId {
    RecordId::from(id.as_str())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDocument<'a> {
    id: &'a str,
    email: &'a str,
    name: &'a str,
    role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    is_active: bool,
    #[serde(serialize_with = "to_rfc3339_ms")]
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login: Option<String>,
}

pub fn encode_profile(user: &User) -> Result<Document, ClientError> {
    let doc = ProfileDocument {
        id: user.id.as_str(),
        email: &user.email,
        name: &user.name,
        role: user.role,
        phone: user.phone.as_deref(),
        is_active: user.is_active,
        created_at: user.created_at,
        last_login: user.last_login.as_ref().map(format_rfc3339_ms),
    };
    match serde_json::to_value(doc) {
        Ok(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from_json(v)))
            .collect()),
        Ok(_) => Err(ClientError::MalformedDocument(
            "profile did not serialize to an object".to_owned(),
        )),
        Err(e) => Err(ClientError::MalformedDocument(e.to_string())),
    }
}

pub fn encode_profile_patch(patch: &UserPatch) -> Result<Document, ClientError> {
    match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from_json(v)))
            .collect()),
        Ok(_) => Err(ClientError::MalformedDocument(
            "profile patch did not serialize to an object".to_owned(),
        )),
        Err(e) => Err(ClientError::MalformedDocument(e.to_string())),
    }
}

/// The single-field merge written on every successful sign-in.
pub fn last_login_fields(at: DateTime<Utc>) -> Document {
    Document::from([(
        "lastLogin".to_owned(),
        FieldValue::String(format_rfc3339_ms(&at)),
    )])
}

pub fn decode_profile(id: &UserId, fields: &Document) -> Result<User, ClientError> {
    let created_at = decode_timestamp(fields.get("createdAt"));
    let last_login = match fields.get("lastLogin") {
        None | Some(FieldValue::Null) => None,
        other => Some(decode_timestamp(other)),
    };

    let mut map = document_to_json(fields);
    map.insert("id".to_owned(), Value::String(id.to_string()));
    map.insert("createdAt".to_owned(), iso(created_at));
    map.insert("lastLogin".to_owned(), last_login.map_or(Value::Null, iso));
    map.entry("isActive").or_insert(Value::Bool(true));

    serde_json::from_value(Value::Object(map))
        .map_err(|e| ClientError::MalformedDocument(format!("{USERS_COLLECTION}/{id}: {e}")))
}

fn iso(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
