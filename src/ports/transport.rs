use async_trait::async_trait;
use std::error::Error;
use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Fixed chunk size for streaming uploads - the video platform's
/// recommended 30 MiB.
pub const DEFAULT_CHUNK_BYTES: usize = 30 * 1024 * 1024;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChunkTransport: Send + Sync {
    /// Stream a local file to the upload target in fixed-size chunks.
    ///
    /// Percentages 0-100 are reported through `progress` as chunks are
    /// acknowledged. Cancelling the token aborts between or during chunks;
    /// the implementation must then return an error rather than Ok.
    async fn send_file(
        &self,
        path: &Path,
        upload_url: &str,
        chunk_bytes: usize,
        progress: UnboundedSender<u8>,
        cancel: CancellationToken,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
