//! Clipcast CLI: upload recordings and video files to the Clipcast API.
//!
//! Set CLIPCAST_API_URL (or API_URL) plus CLIPCAST_TOKEN for Bearer auth or
//! CLIPCAST_API_KEY (or API_KEY) for X-API-Key auth.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clipcast_api_client::ApiClient;
use clipcast_cli::{init_tracing, read_pending_file, read_recording};
use clipcast_core::ClientConfig;
use clipcast_pipeline::{BatchUploader, PipelineState, UploadOrchestrator};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Parser)]
#[command(name = "clipcast", about = "Clipcast recording upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a finished screen recording, optionally with its webcam stream
    Record {
        /// Path to the screen capture
        screen: PathBuf,
        /// Path to the webcam capture recorded alongside it
        #[arg(long)]
        webcam: Option<PathBuf>,
        /// Recording length in seconds
        #[arg(long, default_value = "0")]
        duration: f64,
        /// Video title (defaults to "Recording <date>")
        #[arg(long)]
        title: Option<String>,
    },
    /// Upload one or more video files, one after another
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the monthly video quota
    Limits,
    /// Rename a video
    Rename {
        /// Video ID
        id: String,
        /// New title
        title: String,
    },
    /// Delete a video by ID
    Delete {
        /// Video ID
        id: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Log every state change and progress tick until the sender goes away.
/// Terminal states are logged once with their outcome.
fn watch_state(mut rx: watch::Receiver<PipelineState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if state.is_terminal() {
                if let PipelineState::Failed {
                    reason,
                    recoverable,
                    suggested_action,
                    ..
                } = &state
                {
                    tracing::info!(
                        reason = %reason,
                        recoverable,
                        suggested_action = suggested_action.unwrap_or(""),
                        "Upload did not finish"
                    );
                }
                continue;
            }
            match state.progress() {
                Some(p) => tracing::info!(
                    state = state.name(),
                    loaded = p.loaded,
                    total = p.total,
                    percent = p.percent,
                    "Uploading"
                ),
                None => tracing::info!(state = state.name(), "Pipeline state"),
            }
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().context(
        "Invalid configuration. Set CLIPCAST_API_URL and CLIPCAST_TOKEN or CLIPCAST_API_KEY",
    )?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            screen,
            webcam,
            duration,
            title,
        } => {
            let recording = read_recording(&screen, webcam.as_deref(), duration, title).await?;
            let mut orchestrator = UploadOrchestrator::from_config(&config)?;
            let watcher = watch_state(orchestrator.subscribe());

            let result = orchestrator.start(recording).await;
            watcher.abort();
            let share = result?;
            print_json(&share)?;
        }
        Commands::Upload { files } => {
            let mut pending = Vec::with_capacity(files.len());
            for path in &files {
                pending.push(read_pending_file(path).await?);
            }

            let mut batch = BatchUploader::new(UploadOrchestrator::from_config(&config)?);
            let watcher = watch_state(batch.subscribe_state());
            let mut active = batch.subscribe_active();
            let active_watcher = tokio::spawn(async move {
                while active.changed().await.is_ok() {
                    if let Some(file) = active.borrow_and_update().clone() {
                        tracing::info!(
                            file = file.index + 1,
                            total = file.total,
                            title = %file.title,
                            "Uploading file"
                        );
                    }
                }
            });

            let result = batch.run(pending).await;
            watcher.abort();
            active_watcher.abort();
            let summary = result?;
            tracing::info!("{}", summary.summary());
            print_json(&summary)?;
        }
        Commands::Limits => {
            let client = ApiClient::from_config(&config)?;
            let quota = client.get_video_limits().await?;
            print_json(&quota)?;
        }
        Commands::Rename { id, title } => {
            let client = ApiClient::from_config(&config)?;
            client.update_video_title(&id, &title).await?;
            print_json(&serde_json::json!({ "id": id, "title": title }))?;
        }
        Commands::Delete { id } => {
            let client = ApiClient::from_config(&config)?;
            client.delete_video_record(&id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Video {} deleted", id) }),
            )?;
        }
    }

    Ok(())
}
