use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context as _;
use chrono::{DateTime, Duration, Utc};
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use url::Url;

use beanshub_domain::id::UserId;

use crate::config::ClientConfig;
use crate::domain::repository::IdentityPort;
use crate::domain::types::AuthUser;
use crate::error::ClientError;

/// Lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Identity Toolkit REST client implementing `IdentityPort`.
///
/// Holds the signed-in session in memory and publishes every sign-in and
/// sign-out on a watch channel. Clones share the session. The id token is
/// refreshed through the Secure Token service once it nears expiry.
#[derive(Clone)]
pub struct FirebaseAuth {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    auth_url: String,
    token_url: String,
    api_key: String,
    tokens: Mutex<Option<Tokens>>,
    session: watch::Sender<Option<AuthUser>>,
}

struct Tokens {
    id_token: String,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, as a decimal string.
    #[serde(default)]
    expires_in: Option<String>,
}

/// The Secure Token service answers in snake_case.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    pub fn new(config: &ClientConfig, http: reqwest::Client) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                http,
                auth_url: config.firebase_auth_url.trim_end_matches('/').to_owned(),
                token_url: config.firebase_token_url.trim_end_matches('/').to_owned(),
                api_key: config.firebase_api_key.clone(),
                tokens: Mutex::new(None),
                session,
            }),
        }
    }

    /// Bearer token of the signed-in identity, refreshed first if it is about
    /// to expire. `None` when signed out.
    pub async fn id_token(&self) -> Result<Option<String>, ClientError> {
        let (current, refresh_token) = {
            let slot = self.token_slot();
            match slot.as_ref() {
                None => return Ok(None),
                Some(tokens) if !is_stale(tokens.expires_at, Utc::now()) => {
                    return Ok(Some(tokens.id_token.clone()));
                }
                Some(tokens) => (tokens.id_token.clone(), tokens.refresh_token.clone()),
            }
        };
        let Some(refresh_token) = refresh_token else {
            return Ok(Some(current));
        };

        let refreshed = self.refresh(&refresh_token).await?;
        let mut slot = self.token_slot();
        // signed out while the refresh was in flight
        if slot.is_none() {
            return Ok(None);
        }
        *slot = Some(Tokens {
            id_token: refreshed.id_token.clone(),
            refresh_token: Some(refreshed.refresh_token),
            expires_at: expiry(refreshed.expires_in.as_deref(), Utc::now()),
        });
        tracing::debug!("id token refreshed");
        Ok(Some(refreshed.id_token))
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<Tokens>> {
        self.inner
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint(&self, base: &str, path: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{base}/v1/{path}")).context("build identity url")?;
        url.query_pairs_mut().append_pair("key", &self.inner.api_key);
        Ok(url)
    }

    async fn call<B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<AccountResponse, ClientError> {
        let url = self.endpoint(&self.inner.auth_url, &format!("accounts:{method}"))?;
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("accounts:{method}"))?;
        if !response.status().is_success() {
            return Err(identity_error(response).await);
        }
        let account = response
            .json()
            .await
            .with_context(|| format!("decode accounts:{method} response"))?;
        Ok(account)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(&self.inner.token_url, "token")?)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(refresh_body(refresh_token))
            .send()
            .await
            .context("refresh id token")?;
        if !response.status().is_success() {
            return Err(identity_error(response).await);
        }
        let refreshed = response
            .json()
            .await
            .context("decode token refresh response")?;
        Ok(refreshed)
    }

    fn establish(&self, account: AccountResponse) -> AuthUser {
        let user = AuthUser {
            uid: UserId::from(account.local_id),
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
        };
        let expires_at = expiry(account.expires_in.as_deref(), Utc::now());
        *self.token_slot() = account.id_token.map(|id_token| Tokens {
            id_token,
            refresh_token: account.refresh_token,
            expires_at,
        });
        self.inner.session.send_replace(Some(user.clone()));
        tracing::info!(uid = %user.uid, "signed in");
        user
    }

    /// Record a new display name on the held session. A profile edit is not
    /// a sign-in, so feed subscribers are not woken.
    fn rename_session(&self, name: &str) {
        self.inner.session.send_if_modified(|session| {
            if let Some(user) = session {
                user.display_name = Some(name.to_owned());
            }
            false
        });
    }
}

fn expiry(expires_in: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    now + Duration::seconds(secs)
}

fn is_stale(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= now
}

fn refresh_body(refresh_token: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("grant_type", "refresh_token")
        .append_pair("refresh_token", refresh_token)
        .finish()
}

/// The identity provider reports failures as `{"error":{"message":"EMAIL_EXISTS"}}`;
/// that message is what callers get to see.
async fn identity_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match parse_error_message(&body) {
        Some(message) => ClientError::Identity(message),
        None => ClientError::Identity(format!("identity provider returned {status}")),
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
}

impl IdentityPort for FirebaseAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, ClientError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account = self.call("signUp", &request).await?;
        Ok(self.establish(account))
    }

    async fn update_display_name(&self, name: &str) -> Result<(), ClientError> {
        let token = self.id_token().await?.ok_or(ClientError::NotSignedIn)?;
        let request = json!({
            "idToken": token,
            "displayName": name,
            "returnSecureToken": false,
        });
        self.call("update", &request).await?;
        self.rename_session(name);
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, ClientError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account = self.call("signInWithPassword", &request).await?;
        Ok(self.establish(account))
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        *self.token_slot() = None;
        self.inner.session.send_replace(None);
        tracing::info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.inner.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.inner.session.subscribe()
    }
}
