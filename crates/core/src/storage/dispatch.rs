//! Routing of transfers to the client registered for a claim kind.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use super::claim::StorageClaim;
use super::error::{StorageError, StorageResult};
use super::traits::StorageClient;
use super::transfer::TransferContext;

/// Clients keyed by claim kind.
pub type ClientsMap = HashMap<String, Arc<dyn StorageClient>>;

/// A `StorageClient` that forwards each call to the client registered for
/// `claim.kind()`.
///
/// Unknown kinds fail with `UnknownClaimType` before any I/O happens.
#[derive(Clone, Default)]
pub struct UniversalClient {
    clients: ClientsMap,
}

impl UniversalClient {
    /// Create a router over an existing map.
    #[must_use]
    pub fn new(clients: ClientsMap) -> Self {
        Self { clients }
    }

    /// Register `client` for `kind`, replacing any previous registration.
    #[must_use]
    pub fn with_client(mut self, kind: impl Into<String>, client: Arc<dyn StorageClient>) -> Self {
        self.register(kind, client);
        self
    }

    /// Register `client` for `kind`, replacing any previous registration.
    pub fn register(&mut self, kind: impl Into<String>, client: Arc<dyn StorageClient>) {
        self.clients.insert(kind.into(), client);
    }

    /// Whether a client is registered for `kind`.
    #[must_use]
    pub fn supports(&self, kind: &str) -> bool {
        self.clients.contains_key(kind)
    }

    fn client_for(&self, claim: &StorageClaim) -> StorageResult<&Arc<dyn StorageClient>> {
        self.clients
            .get(claim.kind())
            .ok_or_else(|| StorageError::unknown_claim_type(claim.kind()))
    }
}

impl fmt::Debug for UniversalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("UniversalClient")
            .field("kinds", &kinds)
            .finish()
    }
}

#[async_trait]
impl StorageClient for UniversalClient {
    async fn download(
        &self,
        claim: &StorageClaim,
        destination: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()> {
        self.client_for(claim)?
            .download(claim, destination, ctx)
            .await
    }

    async fn upload(
        &self,
        claim: &StorageClaim,
        source: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()> {
        self.client_for(claim)?.upload(claim, source, ctx).await
    }
}
