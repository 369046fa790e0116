//! Cancellation handles, addressable by lesson id.

use crate::domain::ids::ContentId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Anything that can abort one lesson's in-flight upload. Implementations
/// must tolerate being called more than once.
#[async_trait]
pub trait CancelHandle: Send + Sync {
    async fn cancel(&self);
}

/// Lets the section editor abort an upload without holding the upload
/// service itself. `register` keeps the first handle so an active one is
/// never clobbered; `invoke` consumes the handle it calls.
#[derive(Clone, Default)]
pub struct CancelRegistry {
    handles: Arc<Mutex<HashMap<ContentId, Arc<dyn CancelHandle>>>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, lesson_id: ContentId, handle: Arc<dyn CancelHandle>) {
        self.handles.lock().await.entry(lesson_id).or_insert(handle);
    }

    /// Cancels and discards the registered handle. Returns false when
    /// nothing was registered (already invoked, or never started).
    pub async fn invoke(&self, lesson_id: &ContentId) -> bool {
        let handle = self.handles.lock().await.remove(lesson_id);
        match handle {
            Some(handle) => {
                handle.cancel().await;
                true
            }
            None => false,
        }
    }

    /// Drops a handle without calling it, once its upload reached a
    /// terminal state on its own.
    pub async fn discard(&self, lesson_id: &ContentId) {
        self.handles.lock().await.remove(lesson_id);
    }
}
