//! Command-line front end for the study clipboard
//!
//! Drives the same widget the host page uses, against a recording surface.
//!
//! Run: cargo run --bin study-clipboard -- capture notes.txt diagram.png

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use study_clipboard::config::WidgetConfig;
use study_clipboard::durable::DurableStore;
use study_clipboard::models::FileContent;
use study_clipboard::preview::ObjectUrlRegistry;
use study_clipboard::render::format_bytes;
use study_clipboard::surface::MemorySurface;
use study_clipboard::sync::{select_channel, BroadcastHub};
use study_clipboard::upload::{HttpUploadService, UploadService};
use study_clipboard::{ClipboardError, ClipboardWidget, WidgetDeps, WidgetHandle};

/// Longest the CLI waits for uploads and snippets before writing
const SETTLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Parser, Debug)]
#[command(name = "study-clipboard", about = "Shared drag-and-drop clipboard")]
struct Args {
    /// SQLite database holding the clipboard items
    #[arg(long, env = "STUDY_CLIPBOARD_DB", default_value = "study-clipboard.sqlite3")]
    db: PathBuf,

    /// JSON file with widget configuration overrides
    #[arg(long, env = "STUDY_CLIPBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture files as a single drop
    Capture {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Relay base URL; files are uploaded to `{url}/api/upload`
        #[arg(long, env = "STUDY_CLIPBOARD_UPLOAD_URL")]
        upload_url: Option<String>,

        #[arg(long, env = "STUDY_CLIPBOARD_UPLOAD_TOKEN", hide_env_values = true)]
        upload_token: Option<String>,
    },
    /// Print stored items, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove every item
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            WidgetConfig::from_json_str(&raw)?
        }
        None => WidgetConfig::default(),
    };

    match args.command {
        Command::Capture {
            paths,
            upload_url,
            upload_token,
        } => {
            let uploader = match upload_url {
                Some(url) => {
                    let service = HttpUploadService::new(&url, upload_token).map_err(ClipboardError::from)?;
                    info!("uploading to {}", service.endpoint());
                    Some(Arc::new(service) as Arc<dyn UploadService>)
                }
                None => None,
            };
            let widget = attach(&args.db, config, uploader).await?;
            capture(&widget, &paths).await?;
            widget.destroy();
        }
        Command::List { json } => {
            let widget = attach(&args.db, config, None).await?;
            list(&widget, json)?;
            widget.destroy();
        }
        Command::Clear => {
            let widget = attach(&args.db, config, None).await?;
            let removed = widget.items().len();
            widget.clear();
            widget.flush().await;
            println!("Removed {} item(s)", removed);
            widget.destroy();
        }
    }

    Ok(())
}

async fn attach(
    db: &Path,
    config: WidgetConfig,
    uploader: Option<Arc<dyn UploadService>>,
) -> Result<WidgetHandle> {
    let store = DurableStore::file(db);
    if !store.is_available().await {
        return Err(ClipboardError::Unavailable).with_context(|| format!("opening {}", db.display()));
    }

    let anchors = &config.anchors;
    let surface = Arc::new(MemorySurface::with_anchors([
        anchors.root.clone(),
        anchors.capsule.clone(),
        anchors.panel.clone(),
        anchors.list.clone(),
        anchors.count.clone(),
        anchors.empty.clone(),
    ]));
    // A private hub: nothing else in this process listens
    let hub = BroadcastHub::new();
    let channel = select_channel(Some(&hub), None, &config.channel_name, &config.storage_sync_key);

    let deps = WidgetDeps {
        store,
        channel,
        previews: Arc::new(ObjectUrlRegistry::default()),
        uploader,
        surface,
    };
    ClipboardWidget::init(config.with_reduced_motion(true), deps)
        .await
        .context("clipboard anchors missing")
}

async fn capture(widget: &WidgetHandle, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let content = FileContent::from_path(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        files.push(content);
    }

    let count = files.len();
    widget.capture(files);

    let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
    while widget.pending_tasks() > 0 {
        if tokio::time::Instant::now() >= deadline {
            warn!("gave up waiting for {} background task(s)", widget.pending_tasks());
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    // Let the driver apply the last completions
    tokio::time::sleep(Duration::from_millis(50)).await;
    widget.flush().await;

    let items = widget.items();
    for item in items.iter().take(count) {
        match &item.remote_url {
            Some(url) => println!("{}  {}", item.name, url),
            None => println!("{}", item.name),
        }
    }
    println!("Captured {} item(s), {} stored", count, items.len());
    Ok(())
}

fn list(widget: &WidgetHandle, json: bool) -> Result<()> {
    let items = widget.items();
    if json {
        let records: Vec<_> = items
            .iter()
            .map(|item| {
                let mut record = item.to_record();
                record.file_blob = None;
                record
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Clipboard is empty");
    }
    for item in &items {
        let captured = chrono::DateTime::from_timestamp_millis(item.captured_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{}  {} · {}  {}",
            captured,
            item.display_type,
            format_bytes(item.size),
            item.name
        );
    }
    Ok(())
}
