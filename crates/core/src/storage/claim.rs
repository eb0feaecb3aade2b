//! Storage claim data model.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{StorageError, StorageResult};

/// Backend-specific resolved state carried by a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimParams {
    /// Local filesystem claim.
    Local {
        /// Absolute path of the backing file.
        path: PathBuf,
    },
    /// Object store claim reachable through presigned URLs.
    Remote {
        /// Presigned PUT URL.
        upload_url: String,
        /// Presigned GET URL.
        download_url: String,
        /// When both URLs stop being accepted.
        expires_at: DateTime<Utc>,
    },
}

/// Handle to a stored object, independent of the backend serving it.
///
/// Claims are built by a `StorageControl` and never modified afterwards;
/// re-resolving an identity produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageClaim {
    identity: String,
    kind: String,
    params: ClaimParams,
}

impl StorageClaim {
    /// Create a claim.
    #[must_use]
    pub fn new(identity: impl Into<String>, kind: impl Into<String>, params: ClaimParams) -> Self {
        Self {
            identity: identity.into(),
            kind: kind.into(),
            params,
        }
    }

    /// Unique identity, usable for `get` and `purge`.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Backend kind tag used for dispatch.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Resolved backend state.
    #[must_use]
    pub fn params(&self) -> &ClaimParams {
        &self.params
    }

    /// Backing file path, for local claims with a non-empty path.
    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        match &self.params {
            ClaimParams::Local { path } if !path.as_os_str().is_empty() => Some(path),
            _ => None,
        }
    }

    /// Presigned download URL, for remote claims with a non-empty URL.
    #[must_use]
    pub fn download_url(&self) -> Option<&str> {
        match &self.params {
            ClaimParams::Remote { download_url, .. } if !download_url.is_empty() => {
                Some(download_url)
            }
            _ => None,
        }
    }

    /// Presigned upload URL, for remote claims with a non-empty URL.
    #[must_use]
    pub fn upload_url(&self) -> Option<&str> {
        match &self.params {
            ClaimParams::Remote { upload_url, .. } if !upload_url.is_empty() => Some(upload_url),
            _ => None,
        }
    }

    /// Expiry of the presigned URLs, for remote claims.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.params {
            ClaimParams::Remote { expires_at, .. } => Some(*expires_at),
            ClaimParams::Local { .. } => None,
        }
    }
}

/// Input to claim allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageClaimRequest {
    /// Appended to a generated unique prefix to form the identity.
    pub suffix: String,
}

impl StorageClaimRequest {
    /// Create a request with the given suffix.
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

/// Build a fresh identity: `{uuid}/{suffix}`.
pub(crate) fn generate_identity(req: &StorageClaimRequest) -> StorageResult<String> {
    if req.suffix.is_empty() {
        return Err(StorageError::invalid_identity(
            &req.suffix,
            "suffix must not be empty",
        ));
    }

    let identity = format!("{}/{}", Uuid::new_v4(), req.suffix);
    validate_identity(&identity)?;
    Ok(identity)
}

/// Reject identities that could escape the storage root or address a directory.
pub(crate) fn validate_identity(identity: &str) -> StorageResult<()> {
    if identity.is_empty() {
        return Err(StorageError::invalid_identity(identity, "must not be empty"));
    }
    if identity.starts_with('/') || identity.contains('\\') {
        return Err(StorageError::invalid_identity(
            identity,
            "must be a relative forward-slash path",
        ));
    }

    for segment in identity.split('/') {
        match segment {
            "" => return Err(StorageError::invalid_identity(identity, "empty path segment")),
            "." | ".." => {
                return Err(StorageError::invalid_identity(
                    identity,
                    "relative path segment",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}
