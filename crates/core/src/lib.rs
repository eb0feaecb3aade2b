//! Core storage logic for upstorage.
//!
//! This crate unifies a local filesystem store and an S3-compatible object
//! store behind one claim lifecycle: allocate, transfer, resolve, purge.
//!
//! # Modules
//!
//! - `storage` - Claim model, backends, dispatch and transfer context

pub mod storage;

pub use storage::{
    ClaimParams, ErrorKind, Progress, StorageBackends, StorageClaim, StorageClaimRequest,
    StorageClient, StorageControl, StorageError, StorageResult, TransferContext, UniversalClient,
};
