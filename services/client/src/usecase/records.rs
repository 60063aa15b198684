//! Create/update/delete/list for the record collections.
//!
//! Every failure is logged with its collection and re-raised unchanged.

use beanshub_domain::id::RecordId;
use beanshub_domain::stored::Stored;

use crate::domain::record::{Record, decode, encode, encode_patch};
use crate::domain::repository::DocumentStore;
use crate::domain::types::{Query, Snapshot};
use crate::error::ClientError;

pub async fn add_record<T: Record>(
    store: &impl DocumentStore,
    record: &T,
) -> Result<RecordId, ClientError> {
    let result = match encode(record) {
        Ok(fields) => store.add(T::COLLECTION, &fields).await,
        Err(e) => Err(e),
    };
    result.inspect_err(|e| {
        tracing::error!(collection = T::COLLECTION, error = %e, "error adding record");
    })
}

pub async fn update_record<T: Record>(
    store: &impl DocumentStore,
    id: &RecordId,
    patch: &T::Patch,
) -> Result<(), ClientError> {
    let result = match encode_patch::<T>(patch) {
        Ok(fields) => store.update(T::COLLECTION, id, &fields).await,
        Err(e) => Err(e),
    };
    result.inspect_err(|e| {
        tracing::error!(collection = T::COLLECTION, id = %id, error = %e, "error updating record");
    })
}

pub async fn delete_record<T: Record>(
    store: &impl DocumentStore,
    id: &RecordId,
) -> Result<(), ClientError> {
    store
        .delete(T::COLLECTION, id)
        .await
        .inspect_err(|e| {
            tracing::error!(collection = T::COLLECTION, id = %id, error = %e, "error deleting record");
        })
}

/// Documents that cannot be read as `T` are skipped with a warning, so one
/// damaged document does not hide the rest of its collection.
pub async fn list_records<T: Record>(
    store: &impl DocumentStore,
    query: &Query,
) -> Result<Vec<Stored<T>>, ClientError> {
    let snapshots = store.list(T::COLLECTION, query).await.inspect_err(|e| {
        tracing::error!(collection = T::COLLECTION, error = %e, "error listing records");
    })?;
    Ok(snapshots
        .iter()
        .filter_map(|snapshot| {
            decode::<T>(snapshot)
                .inspect_err(|e| {
                    tracing::warn!(collection = T::COLLECTION, id = %snapshot.id, error = %e, "skipping unreadable record");
                })
                .ok()
        })
        .collect())
}

/// Record operations over one document store, for any [`Record`] type.
pub struct Records<S: DocumentStore> {
    pub store: S,
}

impl<S: DocumentStore> Records<S> {
    pub async fn add<T: Record>(&self, record: &T) -> Result<RecordId, ClientError> {
        add_record(&self.store, record).await
    }

    /// Add and return the record as the client should hold it: as the store
    /// will read it back, dates at store precision.
    pub async fn add_stored<T: Record>(&self, record: T) -> Result<Stored<T>, ClientError> {
        let id = self.add(&record).await?;
        decode(&Snapshot {
            id,
            fields: encode(&record)?,
        })
    }

    pub async fn update<T: Record>(&self, id: &RecordId, patch: &T::Patch) -> Result<(), ClientError> {
        update_record::<T>(&self.store, id, patch).await
    }

    pub async fn delete<T: Record>(&self, id: &RecordId) -> Result<(), ClientError> {
        delete_record::<T>(&self.store, id).await
    }

    /// The whole collection, unfiltered, in store order.
    pub async fn list<T: Record>(&self) -> Result<Vec<Stored<T>>, ClientError> {
        list_records(&self.store, &Query::all()).await
    }

    pub async fn query<T: Record>(&self, query: &Query) -> Result<Vec<Stored<T>>, ClientError> {
        list_records(&self.store, query).await
    }
}
