//! Transfer context: cancellation and progress reporting.

use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::error::{StorageError, StorageResult};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Snapshot of a running transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Bytes moved so far.
    pub transferred: u64,
    /// Total bytes, when known up front.
    pub total: Option<u64>,
}

impl Progress {
    /// Create a progress snapshot.
    #[must_use]
    pub fn new(transferred: u64, total: Option<u64>) -> Self {
        Self { transferred, total }
    }

    /// Fraction of completion in `[0, 1]`. Unknown totals report `0.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        match self.total {
            Some(0) => 1.0,
            Some(total) => (self.transferred as f64 / total as f64).min(1.0),
            None => 0.0,
        }
    }

    /// Whether every expected byte has been moved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.transferred >= total)
    }
}

/// Per-call transfer options shared by every `StorageClient`.
///
/// Cloning shares the cancellation token and progress channel.
#[derive(Debug, Clone, Default)]
pub struct TransferContext {
    cancel: CancellationToken,
    progress: Option<Arc<watch::Sender<Progress>>>,
}

impl TransferContext {
    /// Context with a fresh token and no progress reporting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Report progress to the given channel.
    #[must_use]
    pub fn with_progress(mut self, sender: watch::Sender<Progress>) -> Self {
        self.progress = Some(Arc::new(sender));
        self
    }

    /// Create a progress channel and attach its sender.
    #[must_use]
    pub fn with_progress_channel(self) -> (Self, watch::Receiver<Progress>) {
        let (tx, rx) = watch::channel(Progress::default());
        (self.with_progress(tx), rx)
    }

    /// Token observed by the transfer.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn ensure_active(&self) -> StorageResult<()> {
        if self.is_cancelled() {
            Err(StorageError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(sender) = &self.progress {
            sender.send_replace(progress);
        }
    }

    /// Drive `fut` unless cancellation wins first.
    pub(crate) async fn run<F: Future>(&self, fut: F) -> StorageResult<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(StorageError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

/// Stream `reader` into `writer`, checking for cancellation and reporting
/// progress after every chunk. Returns the number of bytes copied.
pub(crate) async fn copy_with_progress<R, W>(
    reader: &mut R,
    writer: &mut W,
    total: Option<u64>,
    ctx: &TransferContext,
) -> StorageResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut transferred = 0u64;
    ctx.report(Progress::new(0, total));

    loop {
        let read = ctx
            .run(reader.read(&mut buf))
            .await?
            .map_err(|e| StorageError::io("reading transfer source", e))?;
        if read == 0 {
            break;
        }

        ctx.run(writer.write_all(&buf[..read]))
            .await?
            .map_err(|e| StorageError::io("writing transfer destination", e))?;

        transferred += read as u64;
        ctx.report(Progress::new(transferred, total));
    }

    writer
        .flush()
        .await
        .map_err(|e| StorageError::io("flushing transfer destination", e))?;
    ctx.report(Progress::new(transferred, Some(transferred)));

    Ok(transferred)
}

/// Whether `path` is an existing regular file.
pub(crate) async fn is_regular_file(path: &Path) -> StorageResult<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io(
            format!("inspecting {}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(Progress::new(0, Some(100)), 0.0)]
    #[case(Progress::new(50, Some(100)), 0.5)]
    #[case(Progress::new(100, Some(100)), 1.0)]
    #[case(Progress::new(150, Some(100)), 1.0)]
    #[case(Progress::new(0, Some(0)), 1.0)]
    #[case(Progress::new(42, None), 0.0)]
    fn test_progress_fraction(#[case] progress: Progress, #[case] expected: f64) {
        assert!((progress.fraction() - expected).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_copy_reports_final_progress() {
        let data = vec![7u8; COPY_BUFFER_SIZE * 2 + 10];
        let mut reader = data.as_slice();
        let mut writer = Vec::new();
        let (ctx, rx) = TransferContext::new().with_progress_channel();

        let copied = copy_with_progress(&mut reader, &mut writer, Some(data.len() as u64), &ctx)
            .await
            .expect("copy succeeds");

        assert_eq!(copied, data.len() as u64);
        assert_eq!(writer, data);
        let last = *rx.borrow();
        assert!(last.is_complete());
        assert!((last.fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_copy_unknown_total_completes_at_end() {
        let data = b"hello".to_vec();
        let mut reader = data.as_slice();
        let mut writer = Vec::new();
        let (ctx, rx) = TransferContext::new().with_progress_channel();

        copy_with_progress(&mut reader, &mut writer, None, &ctx)
            .await
            .expect("copy succeeds");

        assert_eq!(*rx.borrow(), Progress::new(5, Some(5)));
    }

    #[tokio::test]
    async fn test_copy_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = TransferContext::new().with_cancellation(token);
        let mut reader: &[u8] = b"hello";
        let mut writer = Vec::new();

        let err = copy_with_progress(&mut reader, &mut writer, None, &ctx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(writer.is_empty());
    }

    #[tokio::test]
    async fn test_is_regular_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("present");
        tokio::fs::write(&file, b"x").await.expect("write");

        assert!(is_regular_file(&file).await.expect("metadata"));
        assert!(!is_regular_file(&dir.path().join("absent")).await.expect("metadata"));
        assert!(!is_regular_file(dir.path()).await.expect("metadata"));
    }
}
