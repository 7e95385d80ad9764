//! Fetch, align and save each configured source.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use futures::future::join_all;
use indicatif::MultiProgress;

use crate::{
    cli::create_spinner,
    config::Config,
    download::Fetcher,
    payload::{ForecastPayload, NowcastPayload},
    persist::{Metadata, Store},
    source::{SourceConfig, SourceKind},
};

use super::{decode, timestamp};

/// Runs every source in `kinds` concurrently, each starting one rate-limit
/// delay after the previous. A failing source is logged and recorded in
/// its metadata file without stopping the others. Returns the processed
/// file of each source that succeeded.
pub async fn fetch(config: &Config, kinds: &[SourceKind]) -> Result<Vec<String>> {
    let fetcher = Fetcher::new(config)?;
    let store = Store::from_config(config);
    let progress = MultiProgress::new();

    let sources: Vec<SourceConfig> = kinds
        .iter()
        .map(|kind| SourceConfig::new(*kind, config))
        .collect();
    let (fetcher, store, progress) = (&fetcher, &store, &progress);
    let runs = sources.iter().enumerate().map(|(i, source)| async move {
        for _ in 0..i {
            fetcher.pause().await;
        }
        run_source(source, config, fetcher, store, progress).await
    });

    let mut saved = Vec::new();
    for (source, result) in sources.iter().zip(join_all(runs).await) {
        match result {
            Ok(path) => saved.push(path),
            Err(e) => log::error!("{}: {:#}", source.label, e),
        }
    }

    if saved.is_empty() {
        return Err(anyhow!("No source could be processed"));
    }

    Ok(saved)
}

async fn run_source(
    source: &SourceConfig,
    config: &Config,
    fetcher: &Fetcher,
    store: &Store,
    progress: &MultiProgress,
) -> Result<String> {
    let now = Local::now();
    let outcome = process_source(source, config, fetcher, store, progress, now).await;

    let metadata = match &outcome {
        Ok(_) => Metadata::success(source.label, timestamp(now)),
        Err(e) => Metadata::error(source.label, timestamp(now), format!("{:#}", e)),
    };
    if let Err(e) = store.save_processed(&Metadata::file_name(source.id), &metadata, now) {
        log::error!("Could not save metadata for {}: {:#}", source.label, e);
    }

    outcome
}

async fn process_source(
    source: &SourceConfig,
    config: &Config,
    fetcher: &Fetcher,
    store: &Store,
    progress: &MultiProgress,
    now: DateTime<Local>,
) -> Result<String> {
    let query = source.query(config.location.latitude, config.location.longitude);

    let bar = progress.add(create_spinner(format!("Fetching {}...", source.label)));
    let raw: serde_json::Value = match fetcher.get_json(&source.endpoint, &query).await {
        Ok(raw) => raw,
        Err(e) => {
            bar.abandon_with_message(format!("{} failed", source.label));
            return Err(e.into());
        }
    };
    bar.finish_with_message(format!("{} fetched", source.label));

    store.save_raw(source.raw_file, &raw, now)?;

    let sections = match source.kind {
        SourceKind::Nowcast => decode::<NowcastPayload>(raw)?,
        SourceKind::Forecast => decode::<ForecastPayload>(raw)?,
    };
    let document = source.build_document(sections, config, now);
    if document.forecast_data.is_empty() {
        log::warn!("{} returned no forecast records", source.label);
    }

    let path = store.save_processed(source.output_file, &document, now)?;
    log::info!(
        "{}: {} records saved to {}",
        source.label,
        document.forecast_data.len(),
        path.display()
    );

    Ok(path.to_string_lossy().to_string())
}

// -- Tests -------------------------------------------------------------------
