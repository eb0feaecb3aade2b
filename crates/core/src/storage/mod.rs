//! Storage claims over interchangeable backends.
//!
//! A `StorageControl` allocates, resolves and purges claims; a
//! `StorageClient` moves bytes between a local file and the resource a claim
//! points at. `UniversalClient` picks the client from the claim kind, so
//! callers never need to know which backend served a claim.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        StorageClaim                             │
//! │        identity  │  kind ("local" / "s3")  │  ClaimParams       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ LocalStorageControl  → file under root │ RemoteStorageControl   │
//! │ LocalStorageClient   → tokio::fs copy  │ → presigned GET / PUT  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │            UniversalClient (kind → StorageClient)               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod claim;
mod config;
mod dispatch;
mod error;
pub mod local;
mod registry;
pub mod remote;
mod traits;
mod transfer;

pub use claim::{ClaimParams, StorageClaim, StorageClaimRequest};
pub use config::{LocalStorageOptions, RemoteStorageOptions};
pub use dispatch::{ClientsMap, UniversalClient};
pub use error::{ErrorKind, StorageError, StorageResult};
pub use local::{LocalStorageClient, LocalStorageControl};
pub use registry::StorageBackends;
pub use remote::{RemoteStorageClient, RemoteStorageControl};
pub use traits::{StorageClient, StorageControl};
pub use transfer::{Progress, TransferContext};
