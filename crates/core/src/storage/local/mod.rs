//! Local filesystem backend.
//!
//! Claims are plain files under a configured root. The identity is the path
//! relative to the root, the claim params carry the absolute path.

mod client;
mod control;

pub use client::LocalStorageClient;
pub use control::LocalStorageControl;

/// Kind tag of local claims.
pub const STORAGE_CLAIM_KIND: &str = "local";
