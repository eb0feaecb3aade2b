//! Wiring of configured backends into controls and a universal client.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;
use upstorage_shared::StorageSettings;

use super::config::{LocalStorageOptions, RemoteStorageOptions};
use super::dispatch::UniversalClient;
use super::error::{StorageError, StorageResult};
use super::local::{LocalStorageClient, LocalStorageControl};
use super::remote::{RemoteStorageClient, RemoteStorageControl};
use super::traits::{StorageClient, StorageControl};

/// Every configured backend: one control per kind and a client that routes
/// by claim kind.
#[derive(Clone, Default)]
pub struct StorageBackends {
    controls: HashMap<&'static str, Arc<dyn StorageControl>>,
    client: UniversalClient,
}

impl StorageBackends {
    /// Build the backends enabled in `settings`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a backend cannot be constructed.
    pub fn from_settings(settings: &StorageSettings) -> StorageResult<Self> {
        let mut backends = Self::default();

        if let Some(local) = &settings.local {
            let control = LocalStorageControl::new(LocalStorageOptions::from(local))?;
            info!(root = %control.root().display(), "local storage backend enabled");
            backends.add(Arc::new(control), Arc::new(LocalStorageClient::new()));
        }

        if let Some(s3) = &settings.s3 {
            let control = RemoteStorageControl::new(RemoteStorageOptions::from(s3))?;
            info!(bucket = %control.bucket(), "s3 storage backend enabled");
            backends.add(Arc::new(control), Arc::new(RemoteStorageClient::new()));
        }

        Ok(backends)
    }

    /// Register a control/client pair under the control's kind.
    pub fn add(&mut self, control: Arc<dyn StorageControl>, client: Arc<dyn StorageClient>) {
        let kind = control.kind();
        self.client.register(kind, client);
        self.controls.insert(kind, control);
    }

    /// Control serving `kind`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownClaimType` if no backend of that kind is configured.
    pub fn control(&self, kind: &str) -> StorageResult<Arc<dyn StorageControl>> {
        self.controls
            .get(kind)
            .cloned()
            .ok_or_else(|| StorageError::unknown_claim_type(kind))
    }

    /// Client routing transfers across every configured backend.
    #[must_use]
    pub fn client(&self) -> &UniversalClient {
        &self.client
    }

    /// Configured kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.controls.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for StorageBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackends")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use upstorage_shared::{LocalSettings, S3Settings};

    use super::*;
    use crate::storage::error::ErrorKind;
    use crate::storage::{local, remote};

    fn s3_settings(endpoint: &str) -> S3Settings {
        S3Settings {
            endpoint: endpoint.to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
            bucket: "claims".to_string(),
            region: "us-east-1".to_string(),
            signed_url_ttl_secs: 60,
        }
    }

    #[test]
    fn test_empty_settings_configure_nothing() {
        let backends = StorageBackends::from_settings(&StorageSettings::default()).expect("ok");
        assert!(backends.kinds().is_empty());
        let err = backends.control(local::STORAGE_CLAIM_KIND).err().expect("missing");
        assert_eq!(err.kind(), ErrorKind::UnknownClaimType);
    }

    #[test]
    fn test_both_backends_registered() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = StorageSettings {
            local: Some(LocalSettings {
                root: dir.path().to_path_buf(),
            }),
            s3: Some(s3_settings("http://127.0.0.1:9000")),
        };

        let backends = StorageBackends::from_settings(&settings).expect("backends");

        assert_eq!(
            backends.kinds(),
            vec![local::STORAGE_CLAIM_KIND, remote::STORAGE_CLAIM_KIND]
        );
        assert!(backends.client().supports(local::STORAGE_CLAIM_KIND));
        assert!(backends.client().supports(remote::STORAGE_CLAIM_KIND));
        assert_eq!(
            backends.control(remote::STORAGE_CLAIM_KIND).expect("s3").kind(),
            remote::STORAGE_CLAIM_KIND
        );
    }

    #[test]
    fn test_malformed_s3_endpoint_fails_at_startup() {
        let settings = StorageSettings {
            local: None,
            s3: Some(s3_settings("::not-a-url::")),
        };

        let err = StorageBackends::from_settings(&settings).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }
}
