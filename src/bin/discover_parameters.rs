//! GeoSphere Parameter Discovery Utility
//!
//! Finds out which parameter codes the nowcast-v1-15min-1km model accepts.
//! A single unfiltered request usually lists them all; when it does not,
//! every candidate short code is tried on its own, one request at a time.
//!
//! Results are written to `geosphere_parameters_<timestamp>.json` in the
//! current directory.

use std::{collections::BTreeSet, time::Duration};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use reqwest::StatusCode;
use serde_json::{json, Value};

const MODEL: &str = "nowcast-v1-15min-1km";
const BASE_URL: &str =
    "https://dataset.api.hub.geosphere.at/v1/timeseries/forecast/nowcast-v1-15min-1km";

const CANDIDATES: &[&str] = &[
    // temperature
    "t2m", "tt", "tx", "tn", "ts",
    // precipitation
    "rr", "tp", "pr", "rs", "rl",
    // dew point
    "td", "d2m", "dp",
    // wind
    "ff", "dd", "fx", "u10", "v10", "ws", "wd", "wg",
    // humidity
    "rh", "rf", "hh", "hu",
    // pressure
    "sp", "pp", "ps", "pm", "sl", "msl",
    // cloud
    "cc", "cl", "n", "nh", "nm", "nl",
    // visibility
    "vv", "vis", "si",
    // radiation
    "gs", "sd", "uv", "sw", "lw",
    // other
    "sf", "sn", "hs", "ev", "et",
];

#[derive(Parser)]
#[command(about = "Discover the parameters offered by the GeoSphere nowcast")]
struct Args {
    /// Timeseries endpoint of the model
    #[arg(long, default_value = BASE_URL)]
    url: String,

    /// Test location as `lat,lon`
    #[arg(long, default_value = "48.133029,16.4277403")]
    lat_lon: String,

    /// Seconds to wait between single-parameter requests
    #[arg(long, default_value_t = 5)]
    delay: u64,
}

#[derive(Debug, Default)]
struct Discovery {
    valid: BTreeSet<String>,
    invalid: BTreeSet<String>,
    tested: BTreeSet<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    log::info!("Discovering parameters of {} at {}", MODEL, args.lat_lon);
    let mut discovery = Discovery::default();

    // Whatever was classified before Ctrl-C is still reported.
    tokio::select! {
        _ = discover(&client, &args, &mut discovery) => {}
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Discovery interrupted, saving partial results");
        }
    }

    report(&discovery, &args.lat_lon)
}

async fn discover(client: &reqwest::Client, args: &Args, discovery: &mut Discovery) {
    let listed = list_all(client, &args.url, &args.lat_lon).await;
    if !listed.is_empty() {
        log::info!("Found {} parameters from the full request", listed.len());
        discovery.valid = listed;
        return;
    }

    let candidates = candidates();
    log::info!(
        "Full request listed nothing, testing {} codes (about {:.1} minutes)",
        candidates.len(),
        (candidates.len() as u64 * args.delay) as f64 / 60.0
    );

    for (i, code) in candidates.iter().enumerate() {
        log::info!("[{}/{}] Testing {}", i + 1, candidates.len(), code);
        test_parameter(client, &args.url, &args.lat_lon, code, discovery).await;

        if i + 1 < candidates.len() {
            tokio::time::sleep(Duration::from_secs(args.delay)).await;
        }
    }
}

/// Short codes of two to four characters, sorted and without duplicates.
fn candidates() -> Vec<&'static str> {
    CANDIDATES
        .iter()
        .copied()
        .filter(|code| (2..=4).contains(&code.len()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn parameters(body: &Value) -> Option<&serde_json::Map<String, Value>> {
    body.get("features")?
        .get(0)?
        .get("properties")?
        .get("parameters")?
        .as_object()
}

fn has_data(body: &Value, code: &str) -> bool {
    parameters(body)
        .and_then(|p| p.get(code))
        .and_then(|p| p.get("data"))
        .is_some_and(|data| !data.is_null())
}

async fn list_all(client: &reqwest::Client, url: &str, lat_lon: &str) -> BTreeSet<String> {
    let response = match client.get(url).query(&[("lat_lon", lat_lon)]).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Full request failed: {}", e);
            return BTreeSet::new();
        }
    };
    if !response.status().is_success() {
        log::warn!("Full request returned HTTP {}", response.status());
        return BTreeSet::new();
    }

    match response.json::<Value>().await {
        Ok(body) => parameters(&body)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default(),
        Err(e) => {
            log::warn!("Full request returned unreadable JSON: {}", e);
            BTreeSet::new()
        }
    }
}

/// Classifies `code`: valid on 200 with data, invalid on 200 without data
/// or 422. Anything else is logged and left unclassified.
async fn test_parameter(
    client: &reqwest::Client,
    url: &str,
    lat_lon: &str,
    code: &str,
    discovery: &mut Discovery,
) {
    discovery.tested.insert(code.to_string());

    let response = client
        .get(url)
        .query(&[("parameters", code), ("lat_lon", lat_lon)])
        .send()
        .await;

    match response {
        Ok(response) if response.status() == StatusCode::OK => {
            match response.json::<Value>().await {
                Ok(body) if has_data(&body, code) => {
                    log::info!("VALID: {}", code);
                    discovery.valid.insert(code.to_string());
                }
                Ok(_) => {
                    log::info!("INVALID: {} (no data returned)", code);
                    discovery.invalid.insert(code.to_string());
                }
                Err(e) => log::warn!("ERROR: {} returned unreadable JSON: {}", code, e),
            }
        }
        Ok(response) if response.status() == StatusCode::UNPROCESSABLE_ENTITY => {
            log::info!("INVALID: {} (validation error)", code);
            discovery.invalid.insert(code.to_string());
        }
        Ok(response) => log::warn!("ERROR: {} returned HTTP {}", code, response.status()),
        Err(e) => log::warn!("ERROR: {} failed: {}", code, e),
    }
}

fn report(discovery: &Discovery, lat_lon: &str) -> Result<()> {
    println!("\nValid parameters ({}):", discovery.valid.len());
    for code in &discovery.valid {
        println!("  • {}", code);
    }
    if !discovery.invalid.is_empty() {
        println!("\nInvalid parameters ({}):", discovery.invalid.len());
        for code in &discovery.invalid {
            println!("  • {}", code);
        }
    }

    let now = Local::now();
    let results = json!({
        "timestamp": now.to_rfc3339(),
        "model": MODEL,
        "test_location": lat_lon,
        "valid_parameters": discovery.valid,
        "invalid_parameters": discovery.invalid,
        "summary": {
            "total_tested": discovery.tested.len(),
            "valid_count": discovery.valid.len(),
            "invalid_count": discovery.invalid.len(),
        }
    });

    let filename = format!("geosphere_parameters_{}.json", now.format("%Y%m%d_%H%M%S"));
    std::fs::write(&filename, serde_json::to_string_pretty(&results)?)?;
    println!("\nResults saved to: {}", filename);

    Ok(())
}

// -- Tests -------------------------------------------------------------------
