//! S3-compatible object store backend.
//!
//! The control signs a GET/PUT URL pair per claim; the client moves bytes
//! with plain HTTP against those URLs and needs no credentials.
//!
//! ```text
//! ┌───────────────────────────┐   presign_read / presign_write   ┌──────────────┐
//! │   RemoteStorageControl    │ ───────────────────────────────▶ │   OpenDAL    │
//! │ allocate / get / purge    │   stat + delete                  │  (S3 API)    │
//! └───────────────────────────┘                                   └──────────────┘
//!               │ StorageClaim { upload_url, download_url }
//!               ▼
//! ┌───────────────────────────┐   HTTP GET / PUT                 ┌──────────────┐
//! │    RemoteStorageClient    │ ───────────────────────────────▶ │  Object URL  │
//! └───────────────────────────┘                                   └──────────────┘
//! ```

mod client;
mod control;
mod http;

pub use client::RemoteStorageClient;
pub use control::RemoteStorageControl;
pub use http::DEFAULT_CONTENT_TYPE;

/// Kind tag of remote claims.
pub const STORAGE_CLAIM_KIND: &str = "s3";
