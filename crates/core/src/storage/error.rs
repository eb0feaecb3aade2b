//! Storage error types.

use std::io;

use thiserror::Error;

/// Result type alias using `StorageError`.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-independent error classification.
///
/// Callers branch on this instead of matching backend-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The claim or its backing resource does not exist.
    NotFound,
    /// Generic backend failure.
    Unknown,
    /// No client is registered for the claim kind.
    UnknownClaimType,
    /// The claim cannot be downloaded from.
    UnableToDownload,
    /// The claim cannot be uploaded to.
    UnableToUpload,
    /// The identity or suffix is malformed.
    InvalidIdentity,
    /// The transfer was cancelled by its token.
    Cancelled,
}

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Claim or backing resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Dispatch miss: no client handles this claim kind.
    #[error("unknown storage claim type '{kind}'")]
    UnknownClaimType {
        /// Kind carried by the claim.
        kind: String,
    },

    /// Claim cannot be downloaded from.
    #[error("unable to download storage claim content: {0}")]
    UnableToDownload(String),

    /// Claim cannot be uploaded to.
    #[error("unable to upload storage claim content: {0}")]
    UnableToUpload(String),

    /// Malformed identity or allocation suffix.
    #[error("invalid storage claim identity '{identity}': {reason}")]
    InvalidIdentity {
        /// Offending identity.
        identity: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Local I/O failure.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// HTTP transport failure.
    #[error("{context}: {source}")]
    Request {
        /// What was being done.
        context: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx HTTP response.
    #[error("{operation} request failed with HTTP {status}{}", format_body(.body.as_deref()))]
    Http {
        /// Transfer direction (`download` / `upload`).
        operation: &'static str,
        /// Response status code.
        status: u16,
        /// Response body, only kept when small.
        body: Option<String>,
    },

    /// Object store operation failed.
    #[error("{context}: {message}")]
    Backend {
        /// What was being done.
        context: String,
        /// Object store error message.
        message: String,
    },

    /// Storage backend configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Transfer cancelled.
    #[error("transfer cancelled")]
    Cancelled,
}

fn format_body(body: Option<&str>) -> String {
    body.map(|b| format!(" `{b}`")).unwrap_or_default()
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an unknown claim type error.
    #[must_use]
    pub fn unknown_claim_type(kind: impl Into<String>) -> Self {
        Self::UnknownClaimType { kind: kind.into() }
    }

    /// Create an unable to download error.
    #[must_use]
    pub fn unable_to_download(reason: impl Into<String>) -> Self {
        Self::UnableToDownload(reason.into())
    }

    /// Create an unable to upload error.
    #[must_use]
    pub fn unable_to_upload(reason: impl Into<String>) -> Self {
        Self::UnableToUpload(reason.into())
    }

    /// Create an invalid identity error.
    #[must_use]
    pub fn invalid_identity(identity: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidIdentity {
            identity: identity.into(),
            reason,
        }
    }

    /// Wrap an I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap an HTTP transport error with context.
    #[must_use]
    pub fn request(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            context: context.into(),
            source,
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Translate an object store error, mapping missing keys to `NotFound`.
    #[must_use]
    pub fn backend(context: impl Into<String>, err: &opendal::Error) -> Self {
        let context = context.into();
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound(format!("{context}: {err}")),
            _ => Self::Backend {
                context,
                message: err.to_string(),
            },
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            Self::UnknownClaimType { .. } => ErrorKind::UnknownClaimType,
            Self::UnableToDownload(_) => ErrorKind::UnableToDownload,
            Self::UnableToUpload(_) => ErrorKind::UnableToUpload,
            Self::InvalidIdentity { .. } => ErrorKind::InvalidIdentity,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io { .. }
            | Self::Request { .. }
            | Self::Http { .. }
            | Self::Backend { .. }
            | Self::Configuration(_) => ErrorKind::Unknown,
        }
    }

    /// Whether this error means the claim does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
