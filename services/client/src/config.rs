use serde::Deserialize;

use beanshub_core::config::Config;

/// Client configuration loaded from environment variables.
///
/// Only the project credentials are required. The service URLs default to the
/// production Google endpoints; point them at the local emulator suite for
/// development.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Web API key of the hosted project. Env var: `FIREBASE_API_KEY`.
    pub firebase_api_key: String,
    /// Project identifier. Env var: `FIREBASE_PROJECT_ID`.
    pub firebase_project_id: String,
    /// Identity Toolkit base URL. Env var: `FIREBASE_AUTH_URL`.
    #[serde(default = "default_auth_url")]
    pub firebase_auth_url: String,
    /// Secure Token service base URL, used to refresh id tokens.
    /// Env var: `FIREBASE_TOKEN_URL`.
    #[serde(default = "default_token_url")]
    pub firebase_token_url: String,
    /// Firestore REST base URL. Env var: `FIRESTORE_URL`.
    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,
    /// Firestore database id (default `(default)`). Env var: `FIRESTORE_DATABASE`.
    #[serde(default = "default_database")]
    pub firestore_database: String,
}

fn default_auth_url() -> String {
    "https://identitytoolkit.googleapis.com".to_owned()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com".to_owned()
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com".to_owned()
}

fn default_database() -> String {
    "(default)".to_owned()
}

impl Config for ClientConfig {}

impl ClientConfig {
    /// Resource path of the documents root, e.g.
    /// `projects/p/databases/(default)/documents`.
    pub fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.firebase_project_id, self.firestore_database
        )
    }
}
