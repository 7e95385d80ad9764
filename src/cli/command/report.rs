//! Activity report from the forecast, in English and German.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::{
    cli::create_spinner,
    config::Config,
    download::Fetcher,
    payload::ForecastPayload,
    persist::{read_json, Analysis, ForecastDocument, Store},
    report::{prepare_summary, MistralClient},
    source::SourceConfig,
};

use super::{decode, timestamp};

/// Fetches today's forecast, keeps it as a document and reports on it.
pub async fn report(config: &Config) -> Result<String> {
    let client = MistralClient::new(&config.report)?;
    let fetcher = Fetcher::new(config)?;
    let store = Store::from_config(config);
    let source = SourceConfig::today(config);
    let now = Local::now();

    let query = source.query(config.location.latitude, config.location.longitude);
    let bar = create_spinner("Fetching today's forecast...".to_string());
    let raw: serde_json::Value = fetcher
        .get_json(&source.endpoint, &query)
        .await
        .context("Failed to fetch weather data")?;
    bar.finish_with_message("Today's forecast fetched");

    let document = source.build_document(decode::<ForecastPayload>(raw)?, config, now);
    store.save_raw(&config.report.weather_file, &document, now)?;

    generate(&client, &document, config, &store).await
}

/// Reports on a forecast document saved by an earlier run.
pub async fn analyze(config: &Config, file: &Path) -> Result<String> {
    let client = MistralClient::new(&config.report)?;
    let store = Store::from_config(config);
    let document: ForecastDocument = read_json(file)?;

    generate(&client, &document, config, &store).await
}

async fn generate(
    client: &MistralClient,
    document: &ForecastDocument,
    config: &Config,
    store: &Store,
) -> Result<String> {
    let summary = prepare_summary(document);
    log::debug!("Weather summary:\n{}", summary);

    let bar = create_spinner("Generating report...".to_string());
    let english = client
        .analyze(&document.location, &summary)
        .await
        .context("Failed to generate report")?;
    let german = client
        .translate(&english)
        .await
        .context("Failed to translate report")?;
    bar.finish_with_message("Report generated");

    let now = Local::now();
    let analysis = Analysis {
        timestamp: timestamp(now),
        english,
        german,
    };
    let path = store.save_processed(&config.report.analysis_file, &analysis, now)?;

    Ok(path.to_string_lossy().to_string())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn should_refuse_without_api_key() {
        let config = Config {
            report: crate::config::ReportConfig {
                api_key: None,
                ..Default::default()
            },
            ..Config::default()
        };

        assert!(report(&config).await.is_err());
    }

    #[tokio::test]
    async fn should_analyze_saved_document() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "<p>Report</p>"}}]
                }));
            })
            .await;

        let dir = TempDir::new().unwrap();
        let document_path = dir.path().join("today.json");
        std::fs::write(
            &document_path,
            json!({
                "location": "Vienna Kledering",
                "last_updated": "2025-06-01T06:00:00+02:00",
                "source": "Open-Meteo API",
                "forecast_data": [{"time": "2025-06-01T07:00", "temperature": 14.0}],
                "units": {"temperature": "°C"}
            })
            .to_string(),
        )
        .unwrap();

        let mut config = Config {
            data_dir: dir.path().join("data"),
            ..Config::default()
        };
        config.report.api_url = server.url("/chat");
        config.report.api_key = Some("key".to_string());

        let path = analyze(&config, &document_path).await.unwrap();

        // One call for the report, one for the translation.
        mock.assert_hits_async(2).await;
        let analysis: Analysis = read_json(Path::new(&path)).unwrap();
        assert_eq!(analysis.english, "<p>Report</p>");
        assert_eq!(analysis.german, "<p>Report</p>");
        assert!(path.ends_with("processed_weather_analysis.json"));
    }
}
