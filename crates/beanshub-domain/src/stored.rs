use serde::{Deserialize, Serialize};

use crate::id::RecordId;

/// A record as held by the client: its store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Stored<T> {
    pub fn new(id: impl Into<RecordId>, record: T) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }
}
