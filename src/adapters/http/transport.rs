//! Chunked HTTP transport for streaming a file to the upload target.

use crate::ports::transport::ChunkTransport;
use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use std::error::Error;
use std::path::Path;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upload aborted")]
    Aborted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("chunk request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload target refused chunk at offset {offset} (http status {status})")]
    ChunkRefused { offset: u64, status: u16 },
}

/// Streams files with plain `PUT` requests carrying `Content-Range`
/// headers, the contract of resumable upload targets.
pub struct HttpChunkTransport {
    http: reqwest::Client,
}

impl HttpChunkTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpChunkTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChunkTransport for HttpChunkTransport {
    async fn send_file(
        &self,
        path: &Path,
        upload_url: &str,
        chunk_bytes: usize,
        progress: UnboundedSender<u8>,
        cancel: CancellationToken,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut file = File::open(path).await.map_err(TransportError::Io)?;
        let total = file.metadata().await.map_err(TransportError::Io)?.len();

        let mut offset = 0u64;
        let mut buf = vec![0u8; chunk_bytes];
        loop {
            let filled = fill_chunk(&mut file, &mut buf)
                .await
                .map_err(TransportError::Io)?;
            if filled == 0 {
                break;
            }

            let request = self
                .http
                .put(upload_url)
                .header(CONTENT_RANGE, content_range(offset, filled as u64, total))
                .body(buf[..filled].to_vec())
                .send();
            let response = tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Aborted.into()),
                sent = request => sent.map_err(TransportError::Http)?,
            };

            let status = response.status();
            // 308 acknowledges an intermediate chunk on resumable targets.
            if !(status.is_success() || status.as_u16() == 308) {
                return Err(TransportError::ChunkRefused {
                    offset,
                    status: status.as_u16(),
                }
                .into());
            }

            offset += filled as u64;
            debug!(offset, total, "chunk acknowledged");
            // The receiver may already be gone on cancellation.
            let _ = progress.send(percent(offset, total));
        }

        Ok(())
    }
}

/// Reads until the buffer is full or the file ends; returns bytes filled.
async fn fill_chunk(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = file.read(&mut buf[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

fn content_range(offset: u64, len: u64, total: u64) -> String {
    format!("bytes {}-{}/{}", offset, offset + len - 1, total)
}

fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (sent.saturating_mul(100) / total).min(100) as u8
}
