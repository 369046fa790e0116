//! Headless studio binary - drives one lesson's video upload end to end.
//!
//! It wires up:
//! - HTTP adapters (backend API client, chunked upload transport)
//! - The push-channel feed and the status listener
//! - The upload service around a throwaway course draft

use lectern::adapters::http::{BackendClient, HttpChunkTransport};
use lectern::adapters::push::{hub::StatusHub, listener, socket};
use lectern::adapters::token::StaticTokenProvider;
use lectern::application::cancel::CancelRegistry;
use lectern::application::cleanup::CleanupLog;
use lectern::application::store::CourseStore;
use lectern::application::uploader::{SourceFile, UploadService};
use lectern::config::StudioConfig;
use lectern::domain::course::{ContentType, Course};
use lectern::domain::upload::UploadStatus;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = StudioConfig::from_env();

    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        eprintln!("usage: lectern <video-file> [lesson-title]");
        std::process::exit(2);
    };
    let title = args.next().unwrap_or_else(|| String::from("Untitled lesson"));

    // 1. Adapters
    let tokens = Arc::new(StaticTokenProvider::new(config.api_token.clone()));
    let backend = match BackendClient::new(config.api_base_url.clone(), tokens) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to build backend client: {e}");
            std::process::exit(1);
        }
    };
    let transport = Arc::new(HttpChunkTransport::new());

    // 2. Aggregate state - a draft course around the one lesson
    let store = CourseStore::new(Course::new("Draft course"));
    let section_id = store.add_section("Section 1").await;
    let lesson_id = store
        .add_lesson(&section_id, &title, ContentType::Video)
        .await
        .expect("section was just created");

    // 3. Push channel
    let hub = Arc::new(StatusHub::new());
    let _listener = listener::start(hub.clone(), store.clone());
    let _feed = socket::start(config.push_url.clone(), hub.clone());

    // 4. Upload service
    let registry = CancelRegistry::new();
    let cleanup = CleanupLog::new();
    let uploads = UploadService::new(
        backend,
        transport,
        store.clone(),
        registry,
        cleanup.clone(),
    );

    if let Err(e) = uploads
        .start_upload(&lesson_id, SourceFile::from_path(&file))
        .await
    {
        eprintln!("Upload rejected: {e}");
        std::process::exit(1);
    }
    println!("Uploading {file} ...");

    // 5. Follow the lifecycle until the push channel's verdict
    let mut last_progress = None;
    let mut announced_processing = false;
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        match store.upload_status(&lesson_id).await {
            UploadStatus::Uploading => {
                let progress = store.progress(&lesson_id).await;
                if progress != last_progress {
                    if let Some(pct) = progress {
                        println!("  {pct}%");
                    }
                    last_progress = progress;
                }
            }
            UploadStatus::Processing => {
                if !announced_processing {
                    println!("  processing...");
                    announced_processing = true;
                }
            }
            UploadStatus::Success => {
                let lesson = store.lesson_snapshot(&lesson_id).await;
                let playback = lesson
                    .and_then(|l| l.video.playback_id)
                    .unwrap_or_default();
                println!("Ready: playback {playback}");
                break;
            }
            UploadStatus::Error => {
                let message = store
                    .lesson_snapshot(&lesson_id)
                    .await
                    .and_then(|l| l.video.error)
                    .unwrap_or_else(|| String::from("unknown error"));
                eprintln!("Upload failed: {message}");
                std::process::exit(1);
            }
            UploadStatus::Idle => {
                println!("Upload cancelled");
                break;
            }
        }
    }

    for entry in cleanup.drain().await {
        eprintln!("Pending remote cleanup: {:?} {} ({})", entry.op, entry.id, entry.error);
    }
}
