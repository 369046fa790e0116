//! WebSocket feed: republishes `video-status-update` frames into the hub.

use super::hub::StatusHub;
use crate::domain::events::{PushFrame, VIDEO_STATUS_UPDATE};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connects to the push channel and keeps reconnecting with a fixed delay.
/// Runs until the returned task is aborted.
pub fn start(url: String, hub: Arc<StatusHub>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match connect_async(url.as_str()).await {
                Ok((mut ws, _)) => {
                    info!(%url, "push channel connected");
                    while let Some(message) = ws.next().await {
                        match message {
                            Ok(Message::Text(text)) => handle_frame(text.as_str(), &hub),
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(e) => {
                                warn!(error = %e, "push channel read failed");
                                break;
                            }
                        }
                    }
                }
                Err(e) => warn!(error = %e, "push channel connect failed"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

fn handle_frame(raw: &str, hub: &StatusHub) {
    let frame: PushFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "ignoring unparseable push frame");
            return;
        }
    };
    if frame.kind != VIDEO_STATUS_UPDATE {
        debug!(kind = %frame.kind, "ignoring unrelated push frame");
        return;
    }
    if hub.publish(frame.event).is_err() {
        debug!("no status subscribers, frame dropped");
    }
}
