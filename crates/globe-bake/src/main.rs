//! Globe Land Dot Baker
//!
//! Fetches the land GeoJSON, samples every feature on the dot grid and
//! writes the `[[lon, lat], ...]` list the web globe can load instead of
//! sampling in the browser.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_client::config::DEFAULT_LAND_URL;
use agent_client::{ApiClient, ClientConfig, LandSource};
use globe_core::land::DEFAULT_DOT_SPACING;
use globe_core::{DotSampler, SamplePoint};

#[derive(Parser, Debug)]
#[command(name = "globe-bake")]
#[command(about = "Precompute the globe's land dots", long_about = None)]
struct Args {
    /// GeoJSON source (defaults to ARTHIK_LAND_URL, then Natural Earth 110m land)
    #[arg(short, long)]
    url: Option<String>,

    /// Dot spacing; the grid step is spacing x 0.08 degrees
    #[arg(short, long)]
    spacing: Option<f64>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl Args {
    /// Resolve the source URL and spacing against the environment config
    fn resolve(&self, config: &ClientConfig) -> (String, f64) {
        let (env_url, env_spacing) = match &config.land_source {
            LandSource::Sampled { url, dot_spacing } => (url.clone(), *dot_spacing),
            LandSource::Precomputed { .. } => (DEFAULT_LAND_URL.to_string(), DEFAULT_DOT_SPACING),
        };
        (
            self.url.clone().unwrap_or(env_url),
            self.spacing.filter(|s| *s > 0.0).unwrap_or(env_spacing),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = ClientConfig::from_env();
    let (url, spacing) = args.resolve(&config);

    let client = ApiClient::new(config).context("building HTTP client")?;

    tracing::info!("Fetching land polygons from {}", url);
    let started = Instant::now();
    let land = client
        .fetch_land(&url)
        .await
        .with_context(|| format!("loading {url}"))?;
    tracing::info!(
        "Loaded {} features in {:.1?}",
        land.features.len(),
        started.elapsed()
    );

    let started = Instant::now();
    let sampler = DotSampler::new(spacing);
    let points = sampler.sample_collection(&land);
    tracing::info!(
        "Sampled {} dots (step {:.2}°) in {:.1?}",
        points.len(),
        sampler.step(),
        started.elapsed()
    );

    let payload = encode(&points)?;
    match &args.out {
        Some(path) => {
            tokio::fs::write(path, &payload)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote {} bytes to {}", payload.len(), path.display());
        }
        None => println!("{payload}"),
    }

    Ok(())
}

fn encode(points: &[SamplePoint]) -> anyhow::Result<String> {
    serde_json::to_string(points).context("encoding dot list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_core::land::parse_sample_points;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["globe-bake", "--spacing", "8", "-o", "dots.json"]).unwrap();
        assert_eq!(args.spacing, Some(8.0));
        assert_eq!(args.out, Some(PathBuf::from("dots.json")));
        assert!(args.url.is_none());
    }

    #[test]
    fn test_flags_override_environment() {
        let config = ClientConfig::default();
        let args = Args::try_parse_from(["globe-bake", "--url", "https://land.test/x.json"]).unwrap();
        let (url, spacing) = args.resolve(&config);
        assert_eq!(url, "https://land.test/x.json");
        assert_eq!(spacing, DEFAULT_DOT_SPACING);

        let args = Args::try_parse_from(["globe-bake", "--spacing=-1"]).unwrap();
        assert_eq!(args.resolve(&config).1, DEFAULT_DOT_SPACING);
    }

    #[test]
    fn test_encoded_points_load_back() {
        let points = vec![SamplePoint::new(-10.5, 20.25), SamplePoint::new(30.0, -45.0)];
        let payload = encode(&points).unwrap();
        assert_eq!(payload, "[[-10.5,20.25],[30.0,-45.0]]");
        assert_eq!(parse_sample_points(&payload).unwrap(), points);
    }
}
