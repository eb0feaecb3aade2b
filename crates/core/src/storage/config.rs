//! Backend construction options.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use upstorage_shared::{LocalSettings, S3Settings};

/// Options for the local filesystem backend.
#[derive(Debug, Clone)]
pub struct LocalStorageOptions {
    /// Directory under which all claims are allocated.
    pub root: PathBuf,
}

impl LocalStorageOptions {
    /// Create options rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl From<&LocalSettings> for LocalStorageOptions {
    fn from(settings: &LocalSettings) -> Self {
        Self::new(settings.root.clone())
    }
}

/// Options for the S3-compatible backend.
#[derive(Clone)]
pub struct RemoteStorageOptions {
    /// Endpoint URL; its scheme decides whether TLS is used.
    pub endpoint: String,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Bucket holding the claim objects.
    pub bucket: String,
    /// Signing region.
    pub region: String,
    /// Lifetime of every presigned URL.
    pub signed_url_ttl: Duration,
}

impl RemoteStorageOptions {
    /// Default signing region.
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    /// Default presigned URL lifetime: 24 hours.
    pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create options with the default region and URL lifetime.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket: bucket.into(),
            region: Self::DEFAULT_REGION.to_string(),
            signed_url_ttl: Self::DEFAULT_SIGNED_URL_TTL,
        }
    }

    /// Set the signing region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the presigned URL lifetime.
    #[must_use]
    pub fn with_signed_url_ttl(mut self, ttl: Duration) -> Self {
        self.signed_url_ttl = ttl;
        self
    }
}

impl fmt::Debug for RemoteStorageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStorageOptions")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("signed_url_ttl", &self.signed_url_ttl)
            .finish()
    }
}

impl From<&S3Settings> for RemoteStorageOptions {
    fn from(settings: &S3Settings) -> Self {
        Self::new(
            settings.endpoint.clone(),
            settings.access_key.clone(),
            settings.secret_key.clone(),
            settings.bucket.clone(),
        )
        .with_region(settings.region.clone())
        .with_signed_url_ttl(Duration::from_secs(settings.signed_url_ttl_secs))
    }
}
