//! Shared helpers for storage integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use chrono::{TimeDelta, Utc};
use tokio::net::TcpListener;
use upstorage_core::storage::remote;
use upstorage_core::{ClaimParams, StorageClaim};
use upstorage_shared::LogConfig;

/// Install a test subscriber once per test binary.
pub fn init_tracing() {
    let _ = upstorage_shared::init_tracing(&LogConfig {
        filter: "upstorage_core=debug".to_string(),
        json: false,
    });
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
}

/// In-process stand-in for presigned object URLs.
///
/// `GET/PUT /objects/{key}` behave like a bucket, `/errors/forbidden` and
/// `/errors/large` always fail.
#[derive(Debug, Clone, Default)]
pub struct FakeObjectStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    base_url: String,
}

impl FakeObjectStore {
    /// Bind to an ephemeral port and serve in the background.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake object store");
        let addr = listener.local_addr().expect("local addr");
        let store = Self {
            objects: Arc::default(),
            base_url: format!("http://{addr}"),
        };

        let app = Router::new()
            .route("/objects/{key}", get(get_object).put(put_object))
            .route("/errors/forbidden", any(forbidden))
            .route("/errors/large", any(large_error))
            .with_state(store.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake object store");
        });

        store
    }

    /// URL of an object key.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/objects/{key}", self.base_url)
    }

    /// URL answering 403 with a short body.
    pub fn forbidden_url(&self) -> String {
        format!("{}/errors/forbidden", self.base_url)
    }

    /// URL answering 500 with a 4 KiB body.
    pub fn large_error_url(&self) -> String {
        format!("{}/errors/large", self.base_url)
    }

    /// Seed an object.
    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects.lock().expect("lock").insert(
            key.to_string(),
            StoredObject {
                body: Bytes::copy_from_slice(body),
                content_type: None,
            },
        );
    }

    /// Stored bytes of an object.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("lock")
            .get(key)
            .map(|o| o.body.to_vec())
    }

    /// Content type sent with the last PUT of an object.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .expect("lock")
            .get(key)
            .and_then(|o| o.content_type.clone())
    }
}

async fn get_object(
    State(store): State<FakeObjectStore>,
    Path(key): Path<String>,
) -> Result<Bytes, (StatusCode, &'static str)> {
    store
        .objects
        .lock()
        .expect("lock")
        .get(&key)
        .map(|o| o.body.clone())
        .ok_or((StatusCode::NOT_FOUND, "NoSuchKey"))
}

async fn put_object(
    State(store): State<FakeObjectStore>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    store
        .objects
        .lock()
        .expect("lock")
        .insert(key, StoredObject { body, content_type });
    StatusCode::OK
}

async fn forbidden() -> (StatusCode, &'static str) {
    (StatusCode::FORBIDDEN, "AccessDenied")
}

async fn large_error() -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(4096))
}

/// Remote claim pointing at arbitrary URLs.
pub fn remote_claim(upload_url: &str, download_url: &str) -> StorageClaim {
    StorageClaim::new(
        "prefix/object.bin",
        remote::STORAGE_CLAIM_KIND,
        ClaimParams::Remote {
            upload_url: upload_url.to_string(),
            download_url: download_url.to_string(),
            expires_at: Utc::now() + TimeDelta::hours(1),
        },
    )
}

/// Path-style S3 endpoint holding one bucket, enough for stat and delete.
#[derive(Debug, Clone, Default)]
pub struct FakeBucket {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    endpoint: String,
}

impl FakeBucket {
    /// Bucket name the fake answers for.
    pub const NAME: &'static str = "claims";

    /// Bind to an ephemeral port and serve in the background.
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake bucket");
        let addr = listener.local_addr().expect("local addr");
        let bucket = Self {
            endpoint: format!("http://{addr}"),
            ..Self::default()
        };

        let app = Router::new()
            .route("/{bucket}/{*key}", any(bucket_object))
            .with_state(bucket.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake bucket");
        });

        bucket
    }

    /// Endpoint URL to configure the S3 client with.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Seed an object.
    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("lock")
            .insert(key.to_string(), Bytes::copy_from_slice(body));
    }

    /// Whether an object is stored.
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().expect("lock").contains_key(key)
    }

    /// Keys that received a DELETE, in order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("lock").clone()
    }
}

async fn bucket_object(
    State(fake): State<FakeBucket>,
    method: Method,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    if bucket != FakeBucket::NAME {
        return (StatusCode::NOT_FOUND, "NoSuchBucket").into_response();
    }
    match method {
        Method::HEAD => match fake.objects.lock().expect("lock").get(&key) {
            Some(body) => (StatusCode::OK, [(header::CONTENT_LENGTH, body.len())]).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        Method::DELETE => {
            fake.objects.lock().expect("lock").remove(&key);
            fake.deleted.lock().expect("lock").push(key);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
