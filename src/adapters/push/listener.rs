use super::hub::StatusHub;
use crate::application::store::CourseStore;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Routes every published status event into the course store, which
/// resolves the owning lesson strictly by video id. One listener serves
/// all concurrently uploading lessons.
pub fn start(hub: Arc<StatusHub>, store: CourseStore) -> JoinHandle<()> {
    let mut rx = hub.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => store.apply_status_event(&event).await,
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "status listener lagged behind the push feed");
                }
                Err(RecvError::Closed) => {
                    debug!("status hub closed, stopping listener");
                    break;
                }
            }
        }
    })
}
