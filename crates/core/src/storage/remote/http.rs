//! HTTP response translation.

use reqwest::Response;
use tracing::warn;

use crate::storage::error::{StorageError, StorageResult};

/// Content type sent with every upload.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Error bodies at or above this size are not echoed back.
const ERROR_BODY_LIMIT: u64 = 2 * 1024;

/// Pass 2xx responses through, turn anything else into `StorageError::Http`.
pub(crate) async fn ensure_success(
    operation: &'static str,
    response: Response,
) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.content_length() {
        Some(len) if len > 0 && len < ERROR_BODY_LIMIT => response.text().await.ok(),
        _ => None,
    };

    warn!(operation, status = status.as_u16(), "presigned URL request failed");
    Err(StorageError::Http {
        operation,
        status: status.as_u16(),
        body,
    })
}
