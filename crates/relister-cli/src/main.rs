//! relister - runs one reconciliation pass.
//!
//! Listings and the sandbox's active postings come from a JSON state file,
//! images from a local directory. The state file is written back after the
//! pass unless `--dry-run` is given.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::info;

use relister_core::impls::{
    ActivePosting, InMemoryRecordStore, LocalBlobStore, SandboxPostingService,
};
use relister_core::{AppBuilder, Listing, RepostOrder, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "relister", version, about = "Run one listing reconciliation pass")]
struct Args {
    /// Sandbox state file holding the listings table and active postings.
    #[arg(long, env = "RELISTER_STATE")]
    state: PathBuf,

    /// Directory that blob keys are resolved against.
    #[arg(long, env = "RELISTER_BLOB_DIR")]
    blob_dir: PathBuf,

    /// `concurrent` or `sequential`.
    #[arg(long, env = "RELISTER_REPOST_ORDER", default_value_t = RepostOrder::Concurrent)]
    repost_order: RepostOrder,

    /// Do not write the state file back after the pass.
    #[arg(long)]
    dry_run: bool,
}

/// On-disk sandbox state.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    listings: Vec<Listing>,
    #[serde(default)]
    postings: Vec<ActivePosting>,
}

async fn load_state(path: &Path) -> Result<StateFile> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading state file {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing state file {}", path.display()))
}

async fn save_state(path: &Path, state: &StateFile) -> Result<()> {
    let json = serde_json::to_vec_pretty(state).context("encoding state")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = Args::parse();

    let state = load_state(&args.state).await?;
    info!(
        listings = state.listings.len(),
        postings = state.postings.len(),
        "loaded sandbox state"
    );

    let records = Arc::new(InMemoryRecordStore::new(state.listings));
    let posting = Arc::new(SandboxPostingService::from_postings(state.postings));
    let blobs = Arc::new(LocalBlobStore::new(&args.blob_dir));

    let app = AppBuilder::new()
        .record_store(Arc::clone(&records))
        .blob_store(blobs)
        .posting_service(Arc::clone(&posting))
        .repost_order(args.repost_order)
        .build()
        .context("wiring the reconciler")?;

    let result = app.run_once().await;

    // Writes that happened before a failure are real, so they are kept.
    if args.dry_run {
        info!("dry run, state file left untouched");
    } else {
        let state = StateFile {
            listings: records.snapshot().await,
            postings: posting.postings().await,
        };
        save_state(&args.state, &state).await?;
    }

    let summary = result.context("reconciliation pass failed")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
