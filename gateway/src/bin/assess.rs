//! One-shot risk assessment CLI
//!
//! Fetches the three hazard feeds for a location, scores it, and prints
//! the assessment as JSON.
//!
//! Usage:
//!   assess --latitude 39.7392 --longitude -104.9903 --radius-km 500

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use geo_filter::GeoPoint;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use risk_gateway::{assess, AppState};
use risk_scoring::{RiskScorer, ScoreWeights};

#[derive(Parser, Debug)]
#[command(name = "assess", about = "Assess natural-disaster risk for a location")]
struct Args {
    /// Latitude of the location (-90 to 90)
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,

    /// Longitude of the location (-180 to 180)
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,

    /// Search radius in km
    #[arg(long, default_value_t = 500.0)]
    radius_km: f64,

    /// Write the assessment JSON to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if !(-90.0..=90.0).contains(&args.latitude) {
        anyhow::bail!("latitude {} out of range [-90, 90]", args.latitude);
    }
    if !(-180.0..=180.0).contains(&args.longitude) {
        anyhow::bail!("longitude {} out of range [-180, 180]", args.longitude);
    }
    if args.radius_km <= 0.0 {
        anyhow::bail!("radius_km must be positive, got {}", args.radius_km);
    }

    let state = AppState::new(RiskScorer::new(ScoreWeights::default()));
    let center = GeoPoint::new(args.latitude, args.longitude);

    info!(
        "Assessing ({:.4}, {:.4}) within {} km",
        args.latitude, args.longitude, args.radius_km
    );

    let assessment = assess::assess_location(&state, center, args.radius_km, Utc::now()).await;

    info!(
        "Composite: {:.1} ({})",
        assessment.result.composite_score, assessment.result.risk_level
    );
    info!(
        "Sources: {} earthquakes, {} fire detections, {} alerts",
        assessment.data_sources.earthquakes,
        assessment.data_sources.wildfires,
        assessment.data_sources.weather_alerts
    );

    match &args.output {
        Some(path) => {
            info!("Writing assessment to {:?}", path);
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &assessment)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
    }

    Ok(())
}
