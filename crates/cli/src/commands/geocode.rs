//! Resolve country codes through the geocode cache.

use anyhow::Result;
use clap::Args;
use trade_map_core::AppConfig;

/// Arguments for the geocode command.
#[derive(Args, Debug, Clone)]
pub struct GeocodeArgs {
    /// Country codes to resolve
    #[arg(required = true)]
    pub codes: Vec<String>,
}

/// Prints one line per code. A failing code is reported and the rest still run.
pub async fn run_geocode(args: GeocodeArgs, config: &AppConfig) -> Result<()> {
    let mut cache = super::open_cache(config)?;

    for code in &args.codes {
        match cache.resolve(code).await {
            Ok(Some(position)) => {
                println!("{code:<8} {:>10.4} {:>10.4}", position.lat, position.lon)
            }
            Ok(None) => println!("{code:<8} unresolved"),
            Err(e) => println!("{code:<8} error: {e}"),
        }
    }

    let stats = cache.stats();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        failures = stats.failures,
        cached = cache.len(),
        "Geocode cache"
    );
    Ok(())
}
