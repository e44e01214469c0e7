use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

mod kml;

#[derive(Parser, Debug)]
#[command(
    name = "spot-import",
    author,
    version,
    about = "Convert KML placemarks into treasure spot drafts",
    long_about = "Reads every Point placemark in a KML file and writes a JSON array of \
                  spot drafts (name, description, task, latitude, longitude, radius) \
                  that can be posted to the admin server one by one."
)]
struct Args {
    /// Input KML file
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Activation radius in meters for every imported spot
    #[arg(short, long)]
    radius: Option<f64>,

    /// Fail instead of skipping placemarks that do not form a valid spot
    #[arg(long)]
    strict: bool,

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

    let data = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read KML file: {}", args.input.display()))?;
    let xml = String::from_utf8_lossy(&data);

    let placemarks = kml::read_placemarks(&xml)
        .with_context(|| format!("Failed to parse KML from: {}", args.input.display()))?;
    log::info!("Found {} point placemarks", placemarks.len());

    let mut drafts = Vec::with_capacity(placemarks.len());
    for placemark in placemarks {
        let mut draft = placemark.into_draft();
        if let Some(radius) = args.radius {
            draft = draft.with_radius(radius);
        }

        match draft.validate() {
            Ok(()) => drafts.push(draft),
            Err(error) if args.strict => bail!("Placemark {:?} is invalid: {error}", draft.name),
            Err(error) => log::warn!("Skipping placemark {:?}: {error}", draft.name),
        }
    }

    let json = serde_json::to_string_pretty(&drafts)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            log::info!("Wrote {} spots to {}", drafts.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
