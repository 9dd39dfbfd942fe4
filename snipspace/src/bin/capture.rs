//! snipspace-capture - command-line capture client
//!
//! Unlocks a session against a running snipspace server, classifies the
//! given text, and drives the capture flow through the HTTP boundary.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use snipspace::client::HttpEntryBoundary;
use snipspace_common::capture::{CaptureFlow, DraftImage, SubmitOutcome};

/// Command-line arguments for snipspace-capture
#[derive(Parser, Debug)]
#[command(name = "snipspace-capture")]
#[command(about = "Capture a clipping into a running snipspace dashboard")]
#[command(version)]
struct Args {
    /// Text content; read from stdin when omitted and no image is given
    text: Option<String>,

    /// Base URL of the snipspace server
    #[arg(short, long, default_value = "http://127.0.0.1:5760", env = "SNIPSPACE_SERVER")]
    server: String,

    /// Access password for the unlock step
    #[arg(short, long, env = "SNIPSPACE_PASSWORD", default_value = "")]
    password: String,

    /// Optional entry title
    #[arg(short, long)]
    title: Option<String>,

    /// Optional image attachment
    #[arg(short, long)]
    image: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")?;

    let unlock = client
        .post(format!("{}/api/session", args.server.trim_end_matches('/')))
        .json(&serde_json::json!({ "password": args.password }))
        .send()
        .await
        .context("Failed to reach snipspace server")?;
    if !unlock.status().is_success() {
        bail!(
            "Unlock failed ({}); pass --password or set SNIPSPACE_PASSWORD",
            unlock.status()
        );
    }

    let mut flow = CaptureFlow::new();

    let text = match args.text {
        Some(text) => text,
        None if args.image.is_some() => String::new(),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer.trim_end().to_string()
        }
    };
    flow.set_text(text);

    if let Some(title) = args.title {
        flow.set_title(title);
    }

    if let Some(path) = &args.image {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = mime_for_path(path);
        if let Err(message) = flow.attach_image(DraftImage {
            file_name,
            mime_type,
            bytes,
        }) {
            bail!(message);
        }
    }

    let boundary = HttpEntryBoundary::new(client, args.server);
    match flow.submit(&boundary).await {
        SubmitOutcome::Saved(entry) => {
            println!("Saved {} entry {}", entry.entry_type, entry.id);
            Ok(())
        }
        SubmitOutcome::Rejected(message) | SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Busy => bail!("A submission is already in flight"),
    }
}

fn mime_for_path(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
    .to_string()
}
