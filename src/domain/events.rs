//! Push-channel event shapes.

use super::ids::ContentId;
use serde::{Deserialize, Serialize};

/// Frame type carrying video status updates.
pub const VIDEO_STATUS_UPDATE: &str = "video-status-update";

/// Status carried by a `video-status-update` frame. Anything the client
/// does not understand maps to `Unknown` and is ignored by the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    Processing,
    Ready,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// One asynchronous status update for a video, keyed by the provisional
/// video identity handed out with the upload target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatusEvent {
    pub video_id: ContentId,
    pub status: PushStatus,
    #[serde(default)]
    pub asset_id: Option<ContentId>,
    #[serde(default)]
    pub playback_id: Option<String>,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Raw frame as delivered by the push channel.
#[derive(Debug, Clone, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub event: VideoStatusEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_ready_frame_parses_with_all_payload_fields() {
        let raw = r#"{
            "type": "video-status-update",
            "videoId": 7401,
            "status": "ready",
            "assetId": "asset_1",
            "playbackId": "abc",
            "contentUrl": "https://stream.example/abc.m3u8",
            "duration": 93.5
        }"#;
        let frame: PushFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.kind, VIDEO_STATUS_UPDATE);
        assert_eq!(frame.event.video_id, ContentId::from("7401"));
        assert_eq!(frame.event.status, PushStatus::Ready);
        assert_eq!(frame.event.playback_id.as_deref(), Some("abc"));
        assert_eq!(frame.event.duration, Some(93.5));
    }

    #[test]
    fn an_unrecognized_status_maps_to_unknown() {
        let raw = r#"{"type":"video-status-update","videoId":"v1","status":"rebalancing"}"#;
        let frame: PushFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.event.status, PushStatus::Unknown);
    }

    #[test]
    fn an_error_frame_carries_the_message() {
        let raw = r#"{"type":"video-status-update","videoId":"v1","status":"error","error":"input file corrupt"}"#;
        let frame: PushFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.event.status, PushStatus::Error);
        assert_eq!(frame.event.error.as_deref(), Some("input file corrupt"));
    }
}
