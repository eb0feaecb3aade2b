//! The control and client contracts implemented by every backend.

use std::path::Path;

use async_trait::async_trait;

use super::claim::{StorageClaim, StorageClaimRequest};
use super::error::StorageResult;
use super::transfer::TransferContext;

/// Allocates, resolves and destroys storage claims.
#[async_trait]
pub trait StorageControl: Send + Sync {
    /// Kind tag stamped on every claim this control produces.
    fn kind(&self) -> &'static str;

    /// Allocate a claim with a fresh identity.
    async fn allocate_storage_claim(&self, req: &StorageClaimRequest)
    -> StorageResult<StorageClaim>;

    /// Resolve an existing identity into a claim.
    async fn get_storage_claim(&self, identity: &str) -> StorageResult<StorageClaim>;

    /// Remove the resource behind an identity.
    async fn purge_storage_claim(&self, identity: &str) -> StorageResult<()>;
}

/// Moves bytes between a local file and the resource a claim refers to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Copy the claim content into `destination`, creating or truncating it.
    async fn download(
        &self,
        claim: &StorageClaim,
        destination: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()>;

    /// Copy `source` into the resource behind the claim.
    async fn upload(
        &self,
        claim: &StorageClaim,
        source: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()>;
}
