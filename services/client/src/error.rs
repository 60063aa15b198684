/// Client error variants.
///
/// Identity-provider messages are carried verbatim so they can be shown to the
/// user as-is. Document-store failures arrive as `Backend` with their context
/// chain intact.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Identity(String),
    #[error("User data not found")]
    ProfileNotFound,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("not signed in")]
    NotSignedIn,
    #[error("document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("backend error: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl ClientError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identity(_) => "IDENTITY",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            Self::MalformedDocument(_) => "MALFORMED_DOCUMENT",
            Self::Backend(_) => "BACKEND",
        }
    }

    /// Errors raised before any network call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::PasswordMismatch | Self::PasswordTooShort)
    }
}
