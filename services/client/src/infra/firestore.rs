use anyhow::{Context as _, anyhow};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use beanshub_domain::id::RecordId;

use crate::config::ClientConfig;
use crate::domain::repository::DocumentStore;
use crate::domain::types::{Document, Query, SetMode, Snapshot, Sort};
use crate::error::ClientError;
use crate::infra::firebase_auth::FirebaseAuth;
use crate::infra::firestore_value::{document_id, fields_from_wire, fields_to_wire, to_wire};

/// Firestore REST client implementing `DocumentStore`.
///
/// Requests carry the signed-in identity's id token when there is one, so
/// security rules see the same caller the browser client would.
#[derive(Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    /// `…/v1/projects/{project}/databases/{db}/documents`
    documents_url: String,
    auth: FirebaseAuth,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl FirestoreClient {
    pub fn new(config: &ClientConfig, http: reqwest::Client, auth: FirebaseAuth) -> Self {
        Self {
            http,
            documents_url: format!(
                "{}/v1/{}",
                config.firestore_url.trim_end_matches('/'),
                config.documents_path()
            ),
            auth,
        }
    }

    /// The documents root extended by `segments`, each percent-encoded as a
    /// single path segment.
    fn resource_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.documents_url).context("build document url")?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("{} is not a hierarchical url", self.documents_url))?
            .extend(segments);
        Ok(url)
    }

    fn collection_url(&self, collection: &str) -> Result<Url, ClientError> {
        self.resource_url(&[collection])
    }

    fn document_url(&self, collection: &str, id: &RecordId) -> Result<Url, ClientError> {
        self.resource_url(&[collection, id.as_str()])
    }

    /// Document URL for a PATCH: a field mask unless the whole document is
    /// replaced, and an existence precondition for updates.
    fn patch_url(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &Document,
        write: Write,
    ) -> Result<Url, ClientError> {
        let mut url = self.document_url(collection, id)?;
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if write != Write::Set(SetMode::Replace) {
            pairs.extend(fields.keys().map(|key| ("updateMask.fieldPaths", key.as_str())));
        }
        if write == Write::Update {
            pairs.push(("currentDocument.exists", "true"));
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        Ok(match self.auth.id_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn patch(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &Document,
        write: Write,
    ) -> Result<Response, ClientError> {
        let url = self.patch_url(collection, id, fields, write)?;
        let request = self
            .http
            .patch(url)
            .json(&json!({ "fields": fields_to_wire(fields) }));
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .with_context(|| format!("PATCH {collection}/{id}"))?;
        Ok(response)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Set(SetMode),
    Update,
}

/// Body of a `:runQuery` request for a top-level collection.
pub fn structured_query(collection: &str, query: &Query) -> Value {
    let mut structured = json!({ "from": [{ "collectionId": collection }] });
    if let Some(filter) = &query.filter {
        structured["where"] = json!({
            "fieldFilter": {
                "field": { "fieldPath": filter.field },
                "op": "EQUAL",
                "value": to_wire(&filter.value),
            }
        });
    }
    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Sort::Asc => "ASCENDING",
            Sort::Desc => "DESCENDING",
        };
        structured["orderBy"] = json!([{
            "field": { "fieldPath": order.field },
            "direction": direction,
        }]);
    }
    json!({ "structuredQuery": structured })
}

/// Turn a non-success response into an error carrying Firestore's message.
async fn failure(response: Response, operation: &str) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => format!("{} {}", envelope.error.status, envelope.error.message),
        Err(_) => body,
    };
    ClientError::Backend(anyhow!("{operation}: firestore returned {status}: {}", message.trim()))
}

fn snapshot(document: WireDocument) -> Result<Snapshot, ClientError> {
    let fields = fields_from_wire(document.fields.as_ref())
        .with_context(|| format!("decode {}", document.name))?;
    Ok(Snapshot {
        id: document_id(&document.name),
        fields,
    })
}

impl DocumentStore for FirestoreClient {
    async fn add(&self, collection: &str, fields: &Document) -> Result<RecordId, ClientError> {
        let request = self
            .http
            .post(self.collection_url(collection)?)
            .json(&json!({ "fields": fields_to_wire(fields) }));
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .with_context(|| format!("POST {collection}"))?;
        if !response.status().is_success() {
            return Err(failure(response, &format!("add to {collection}")).await);
        }
        let document: WireDocument = response
            .json()
            .await
            .with_context(|| format!("decode created {collection} document"))?;
        Ok(document_id(&document.name))
    }

    async fn set(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &Document,
        mode: SetMode,
    ) -> Result<(), ClientError> {
        let response = self.patch(collection, id, fields, Write::Set(mode)).await?;
        if !response.status().is_success() {
            return Err(failure(response, &format!("set {collection}/{id}")).await);
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: &Document,
    ) -> Result<(), ClientError> {
        let response = self.patch(collection, id, fields, Write::Update).await?;
        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ClientError::DocumentNotFound {
                collection: collection.to_owned(),
                id: id.to_string(),
            }),
            _ => Err(failure(response, &format!("update {collection}/{id}")).await),
        }
    }

    async fn get(
        &self,
        collection: &str,
        id: &RecordId,
    ) -> Result<Option<Document>, ClientError> {
        let request = self.http.get(self.document_url(collection, id)?);
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .with_context(|| format!("GET {collection}/{id}"))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let document: WireDocument = response
                    .json()
                    .await
                    .with_context(|| format!("decode {collection}/{id}"))?;
                Ok(Some(snapshot(document)?.fields))
            }
            _ => Err(failure(response, &format!("get {collection}/{id}")).await),
        }
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), ClientError> {
        let request = self.http.delete(self.document_url(collection, id)?);
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .with_context(|| format!("DELETE {collection}/{id}"))?;
        if !response.status().is_success() {
            return Err(failure(response, &format!("delete {collection}/{id}")).await);
        }
        Ok(())
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Snapshot>, ClientError> {
        let request = self
            .http
            .post(format!("{}:runQuery", self.documents_url))
            .json(&structured_query(collection, query));
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .with_context(|| format!("query {collection}"))?;
        if !response.status().is_success() {
            return Err(failure(response, &format!("query {collection}")).await);
        }
        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .with_context(|| format!("decode {collection} query results"))?;
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(snapshot)
            .collect()
    }
}
