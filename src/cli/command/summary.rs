//! Summary statistics of a processed forecast document.

use std::{fmt, path::PathBuf};

use anyhow::Result;

use crate::{
    config::Config,
    persist::{read_json, ForecastDocument, Store},
    source::{is_metres_per_second, SourceConfig, SourceKind, KMH_PER_MS},
    stats::{self, ColumnStats},
};

/// Temperature minus dew point, averaged, above which the air counts as dry.
const COMFORT_SPREAD: f64 = 2.0;

pub fn summary(config: &Config, source: SourceKind, file: Option<PathBuf>) -> Result<String> {
    let path = file.unwrap_or_else(|| {
        Store::from_config(config).processed_path(SourceConfig::new(source, config).output_file)
    });
    let document: ForecastDocument = read_json(&path)?;

    Ok(WeatherSummary::from_document(&document).to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    pub location: String,
    pub temperature: Option<ColumnStats>,
    pub total_precipitation: Option<f64>,
    pub peak_precipitation: Option<(String, f64)>,
    pub mean_wind_kmh: Option<f64>,
    pub max_gust_kmh: Option<f64>,
    pub humidity_risk: Option<&'static str>,
}

impl WeatherSummary {
    pub fn from_document(document: &ForecastDocument) -> Self {
        let records = &document.forecast_data;
        let to_kmh = |name: &str| match document.units.get(name) {
            Some(unit) if is_metres_per_second(unit) => KMH_PER_MS,
            _ => 1.0,
        };

        let gust_field = ["wind_gust", "wind_gusts"]
            .into_iter()
            .find(|name| stats::column(records, name).is_some());

        let spreads: Vec<f64> = records
            .iter()
            .filter_map(|r| Some(r.number("temperature")? - r.number("dew_point")?))
            .collect();
        let humidity_risk = (!spreads.is_empty()).then(|| {
            let mean = spreads.iter().sum::<f64>() / spreads.len() as f64;
            if mean > COMFORT_SPREAD {
                "Low"
            } else {
                "Moderate"
            }
        });

        WeatherSummary {
            location: document.location.clone(),
            temperature: stats::column(records, "temperature"),
            total_precipitation: stats::column(records, "precipitation").map(|p| p.sum),
            peak_precipitation: stats::peak(records, "precipitation")
                .filter(|(_, value)| *value > 0.0)
                .map(|(record, value)| (record.time.clone(), value)),
            mean_wind_kmh: stats::column(records, "wind_speed")
                .map(|w| w.mean() * to_kmh("wind_speed")),
            max_gust_kmh: gust_field
                .and_then(|name| stats::column(records, name).map(|g| g.max * to_kmh(name))),
            humidity_risk,
        }
    }
}

impl fmt::Display for WeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "WEATHER SUMMARY - {}", self.location)?;
        writeln!(f, "{}", "=".repeat(50))?;

        match &self.temperature {
            Some(t) => {
                writeln!(f, "Temperature Range: {:.1}°C to {:.1}°C", t.min, t.max)?;
                let trend = if t.last > t.first { "Rising" } else { "Falling" };
                writeln!(f, "Temperature Trend: {}", trend)?;
            }
            None => writeln!(f, "Temperature Range: n/a")?,
        }
        if let Some(total) = self.total_precipitation {
            writeln!(f, "Total Precipitation: {:.2} mm", total)?;
        }
        if let Some((time, value)) = &self.peak_precipitation {
            writeln!(f, "Peak Rain: {:.2} mm at {}", value, time)?;
        }
        if let Some(wind) = self.mean_wind_kmh {
            writeln!(f, "Average Wind Speed: {:.1} km/h", wind)?;
        }
        if let Some(gust) = self.max_gust_kmh {
            writeln!(f, "Maximum Wind Gust: {:.1} km/h", gust)?;
        }
        if let Some(risk) = self.humidity_risk {
            writeln!(f, "Humidity Risk Level: {}", risk)?;
        }

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
