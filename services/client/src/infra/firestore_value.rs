//! Firestore REST value encoding.
//!
//! Each value is a single-key object naming its type, e.g.
//! `{"integerValue": "42"}` or `{"timestampValue": "2024-03-01T10:00:00Z"}`.

use anyhow::{Context as _, anyhow, bail};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::{Map, Value, json};

use beanshub_domain::id::RecordId;

use crate::domain::types::{Document, FieldValue};

pub fn to_wire(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        // int64 travels as a decimal string.
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => double_to_wire(*d),
        FieldValue::String(s) => json!({ "stringValue": s }),
        // Firestore keeps microseconds and would round anything finer away.
        FieldValue::Timestamp(t) => json!({
            "timestampValue": t.trunc_subsecs(6).to_rfc3339_opts(SecondsFormat::AutoSi, true)
        }),
        FieldValue::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_wire).collect();
            json!({ "arrayValue": { "values": values } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": fields_to_wire(fields) } }),
    }
}

fn double_to_wire(d: f64) -> Value {
    if d.is_nan() {
        json!({ "doubleValue": "NaN" })
    } else if d.is_infinite() {
        let s = if d > 0.0 { "Infinity" } else { "-Infinity" };
        json!({ "doubleValue": s })
    } else {
        json!({ "doubleValue": d })
    }
}

pub fn fields_to_wire(fields: &Document) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), to_wire(v)))
            .collect::<Map<String, Value>>(),
    )
}

pub fn from_wire(value: &Value) -> anyhow::Result<FieldValue> {
    let obj = value.as_object().context("field value is not an object")?;
    let (kind, inner) = obj.iter().next().context("field value has no type")?;
    let field = match kind.as_str() {
        "nullValue" => FieldValue::Null,
        "booleanValue" => FieldValue::Bool(inner.as_bool().context("booleanValue")?),
        "integerValue" => FieldValue::Integer(match inner {
            Value::String(s) => s.parse().context("integerValue")?,
            other => other.as_i64().context("integerValue")?,
        }),
        "doubleValue" => FieldValue::Double(match inner {
            Value::String(s) => match s.as_str() {
                "NaN" => f64::NAN,
                "Infinity" => f64::INFINITY,
                "-Infinity" => f64::NEG_INFINITY,
                other => other.parse().context("doubleValue")?,
            },
            other => other.as_f64().context("doubleValue")?,
        }),
        "stringValue" | "referenceValue" | "bytesValue" => {
            FieldValue::String(inner.as_str().context("string-like value")?.to_owned())
        }
        "timestampValue" => {
            let s = inner.as_str().context("timestampValue")?;
            FieldValue::Timestamp(
                DateTime::parse_from_rfc3339(s)
                    .with_context(|| format!("timestampValue {s}"))?
                    .with_timezone(&Utc),
            )
        }
        "geoPointValue" => FieldValue::Map(fields_from_plain(inner)),
        "arrayValue" => FieldValue::Array(match inner.get("values") {
            Some(Value::Array(items)) => items.iter().map(from_wire).collect::<Result<_, _>>()?,
            _ => Vec::new(),
        }),
        "mapValue" => FieldValue::Map(fields_from_wire(inner.get("fields"))?),
        other => bail!("unsupported field type {other}"),
    };
    Ok(field)
}

fn fields_from_plain(value: &Value) -> Document {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v.clone())))
            .collect(),
        _ => Document::new(),
    }
}

/// Decode a `fields` object. A missing `fields` key is an empty document.
pub fn fields_from_wire(fields: Option<&Value>) -> anyhow::Result<Document> {
    match fields {
        None | Some(Value::Null) => Ok(Document::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| {
                from_wire(v)
                    .with_context(|| format!("field {k}"))
                    .map(|field| (k.clone(), field))
            })
            .collect(),
        Some(_) => Err(anyhow!("fields is not an object")),
    }
}

/// The id is the last segment of the document resource name.
pub fn document_id(name: &str) -> RecordId {
    RecordId::from(name.rsplit('/').next().unwrap_or(name))
}
