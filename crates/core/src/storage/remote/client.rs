//! Remote storage client: HTTP transfers against presigned URLs.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::{self, File};
use tokio_util::io::StreamReader;
use tracing::debug;

use super::http::{DEFAULT_CONTENT_TYPE, ensure_success};
use crate::storage::claim::StorageClaim;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::StorageClient;
use crate::storage::transfer::{Progress, TransferContext, copy_with_progress, is_regular_file};

/// Transfers claim content with plain HTTP GET/PUT.
///
/// Uploads are buffered in memory before the PUT is sent.
#[derive(Debug, Clone, Default)]
pub struct RemoteStorageClient {
    http: reqwest::Client,
}

impl RemoteStorageClient {
    /// Create a client with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client on top of a preconfigured HTTP client.
    #[must_use]
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl StorageClient for RemoteStorageClient {
    async fn download(
        &self,
        claim: &StorageClaim,
        destination: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()> {
        ctx.ensure_active()?;

        let url = claim.download_url().ok_or_else(|| {
            StorageError::unable_to_download(format!(
                "claim '{}' has no download url",
                claim.identity()
            ))
        })?;

        let mut writer = File::create(destination)
            .await
            .map_err(|e| StorageError::io("creating & truncating file for download", e))?;

        let response = ctx
            .run(self.http.get(url).send())
            .await?
            .map_err(|e| StorageError::request("performing download request", e))?;
        let response = ensure_success("download", response).await?;

        let total = response.content_length();
        let reader = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
        tokio::pin!(reader);
        let copied = copy_with_progress(&mut reader, &mut writer, total, ctx).await?;

        debug!(identity = %claim.identity(), bytes = copied, "downloaded remote storage claim");
        Ok(())
    }

    async fn upload(
        &self,
        claim: &StorageClaim,
        source: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()> {
        ctx.ensure_active()?;

        if !is_regular_file(source).await? {
            return Err(StorageError::unable_to_upload(format!(
                "unable to find file to upload: {}",
                source.display()
            )));
        }

        let url = claim.upload_url().ok_or_else(|| {
            StorageError::unable_to_upload(format!(
                "claim '{}' has no upload url",
                claim.identity()
            ))
        })?;

        let body = ctx
            .run(fs::read(source))
            .await?
            .map_err(|e| StorageError::io("reading file to upload", e))?;
        let total = body.len() as u64;
        ctx.report(Progress::new(0, Some(total)));

        let request = self
            .http
            .put(url)
            .header(CONTENT_TYPE, DEFAULT_CONTENT_TYPE)
            .body(body);
        let response = ctx
            .run(request.send())
            .await?
            .map_err(|e| StorageError::request("performing upload request", e))?;
        ensure_success("upload", response).await?;

        ctx.report(Progress::new(total, Some(total)));
        debug!(identity = %claim.identity(), bytes = total, "uploaded remote storage claim");
        Ok(())
    }
}
