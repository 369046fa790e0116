use crate::domain::events::VideoStatusEvent;
use tokio::sync::broadcast;

/// Process-wide fan-out point for video status events. Everything that
/// cares about upload outcomes subscribes here, so the process holds one
/// push-channel connection no matter how many lessons are uploading.
#[derive(Debug)]
pub struct StatusHub {
    sender: broadcast::Sender<VideoStatusEvent>,
}

impl StatusHub {
    pub fn new() -> Self {
        // Capacity of 100 events should be sufficient for now
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    pub fn publish(
        &self,
        event: VideoStatusEvent,
    ) -> Result<usize, broadcast::error::SendError<VideoStatusEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VideoStatusEvent> {
        self.sender.subscribe()
    }
}

impl Default for StatusHub {
    fn default() -> Self {
        Self::new()
    }
}
