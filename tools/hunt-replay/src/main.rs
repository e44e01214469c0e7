use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use yessplora_core::config::{AdminCredentials, GameConfig};
use yessplora_core::hunt::HuntSession;
use yessplora_core::persist::FileStorage;

mod replay;
mod track;

use replay::{ReplayOptions, replay};
use track::read_track;

#[derive(Parser, Debug)]
#[command(
    name = "hunt-replay",
    author,
    version,
    about = "Replay a recorded GPS track through a treasure hunt session",
    long_about = "Feeds every position of a GeoJSON track (LineString, MultiPoint or Point \
                  features, in file order) into a fresh hunt with the given spots, and \
                  prints which tasks were presented along the way as JSON."
)]
struct Args {
    /// Treasure spots as a JSON array of drafts (see spot-import)
    #[arg(short, long)]
    spots: PathBuf,

    /// GeoJSON track file
    #[arg(short, long)]
    track: PathBuf,

    /// Game config JSON; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Persist the session snapshot into this directory
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Complete every presented task straight away
    #[arg(long)]
    complete: bool,

    /// Seconds between consecutive track points
    #[arg(long, default_value = "1")]
    interval_secs: i64,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GameConfig::default(),
    };
    // The replay acts as its own admin to load the spot list
    config.admin = Some(AdminCredentials {
        username: "replay".into(),
        password: "replay".into(),
    });

    let spots_json = std::fs::read_to_string(&args.spots)
        .with_context(|| format!("Failed to read spots: {}", args.spots.display()))?;
    let drafts = serde_json::from_str(&spots_json)
        .with_context(|| format!("Failed to parse spots from: {}", args.spots.display()))?;

    let track = read_track(&args.track, args.interval_secs * 1000)?;
    if track.is_empty() {
        bail!("Track has no positions: {}", args.track.display());
    }
    log::info!("Replaying {} positions", track.len());

    let session = match &args.state_dir {
        Some(dir) => {
            let storage = FileStorage::new(dir)
                .with_context(|| format!("Failed to open state dir: {}", dir.display()))?;
            HuntSession::with_storage(config, Box::new(storage))
        }
        None => HuntSession::new(config),
    };

    let summary = replay(
        session,
        drafts,
        &track,
        ReplayOptions {
            complete_tasks: args.complete,
        },
    )?;

    log::info!(
        "Presented {} tasks, completed {}, progress {}%",
        summary.presented.len(),
        summary.completed.len(),
        summary.progress
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
