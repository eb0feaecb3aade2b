//! Remote storage control backed by an S3-compatible object store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use opendal::{Operator, services};
use reqwest::Url;
use tracing::debug;

use super::STORAGE_CLAIM_KIND;
use crate::storage::claim::{
    ClaimParams, StorageClaim, StorageClaimRequest, generate_identity, validate_identity,
};
use crate::storage::config::RemoteStorageOptions;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::StorageControl;

/// Presigned URL pair for one object key.
struct SignedUrls {
    upload_url: String,
    download_url: String,
    expires_at: DateTime<Utc>,
}

/// Issues presigned URL pairs and deletes objects in one bucket.
///
/// Allocation and resolution only sign URLs locally; purge talks to the store.
#[derive(Debug, Clone)]
pub struct RemoteStorageControl {
    operator: Operator,
    bucket: String,
    signed_url_ttl: Duration,
}

impl RemoteStorageControl {
    /// Build a control from options.
    ///
    /// Uses path-style addressing; TLS follows the endpoint scheme.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not an http(s) URL or
    /// the object store client cannot be built.
    pub fn new(options: RemoteStorageOptions) -> StorageResult<Self> {
        let endpoint = Url::parse(&options.endpoint).map_err(|e| {
            StorageError::configuration(format!(
                "parsing endpoint url '{}': {e}",
                options.endpoint
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(StorageError::configuration(format!(
                "unsupported endpoint scheme '{}'",
                endpoint.scheme()
            )));
        }
        if options.bucket.is_empty() {
            return Err(StorageError::configuration("bucket must not be empty"));
        }

        let builder = services::S3::default()
            .endpoint(endpoint.as_str().trim_end_matches('/'))
            .bucket(&options.bucket)
            .access_key_id(&options.access_key)
            .secret_access_key(&options.secret_key)
            .region(&options.region);

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        debug!(
            endpoint = %endpoint,
            bucket = %options.bucket,
            ttl_secs = options.signed_url_ttl.as_secs(),
            "remote storage control configured"
        );

        Ok(Self {
            operator,
            bucket: options.bucket,
            signed_url_ttl: options.signed_url_ttl,
        })
    }

    /// Bucket holding the claim objects.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Lifetime of issued URLs.
    #[must_use]
    pub fn signed_url_ttl(&self) -> Duration {
        self.signed_url_ttl
    }

    /// Presigned download URL for an identity, without building a claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is malformed or signing fails.
    pub async fn get_storage_claim_download_url(&self, identity: &str) -> StorageResult<String> {
        validate_identity(identity)?;
        self.presign_download(identity).await
    }

    async fn presign_download(&self, identity: &str) -> StorageResult<String> {
        let request = self
            .operator
            .presign_read(identity, self.signed_url_ttl)
            .await
            .map_err(|e| StorageError::backend("signing download url", &e))?;
        Ok(request.uri().to_string())
    }

    async fn presign_upload(&self, identity: &str) -> StorageResult<String> {
        let request = self
            .operator
            .presign_write(identity, self.signed_url_ttl)
            .await
            .map_err(|e| StorageError::backend("signing upload url", &e))?;
        Ok(request.uri().to_string())
    }

    async fn sign_urls(&self, identity: &str) -> StorageResult<SignedUrls> {
        let issued_at = Utc::now();
        let download_url = self.presign_download(identity).await?;
        let upload_url = self.presign_upload(identity).await?;

        let ttl = TimeDelta::from_std(self.signed_url_ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Ok(SignedUrls {
            upload_url,
            download_url,
            expires_at,
        })
    }
}

#[async_trait]
impl StorageControl for RemoteStorageControl {
    fn kind(&self) -> &'static str {
        STORAGE_CLAIM_KIND
    }

    async fn allocate_storage_claim(
        &self,
        req: &StorageClaimRequest,
    ) -> StorageResult<StorageClaim> {
        let identity = generate_identity(req)?;
        self.get_storage_claim(&identity).await
    }

    async fn get_storage_claim(&self, identity: &str) -> StorageResult<StorageClaim> {
        validate_identity(identity)?;
        let urls = self.sign_urls(identity).await?;

        debug!(identity = %identity, expires_at = %urls.expires_at, "signed remote storage claim");
        Ok(StorageClaim::new(
            identity,
            STORAGE_CLAIM_KIND,
            ClaimParams::Remote {
                upload_url: urls.upload_url,
                download_url: urls.download_url,
                expires_at: urls.expires_at,
            },
        ))
    }

    async fn purge_storage_claim(&self, identity: &str) -> StorageResult<()> {
        validate_identity(identity)?;

        // S3 deletes succeed for missing keys; stat first to surface NotFound.
        self.operator
            .stat(identity)
            .await
            .map_err(|e| StorageError::backend(format!("looking up object '{identity}'"), &e))?;
        self.operator
            .delete(identity)
            .await
            .map_err(|e| StorageError::backend(format!("deleting object '{identity}'"), &e))?;

        debug!(identity = %identity, "purged remote storage claim");
        Ok(())
    }
}
