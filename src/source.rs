//! Data sources and their parameter tables.
//!
//! A [`SourceConfig`] holds everything that differs between providers: the
//! endpoint, which provider codes map to which output fields, the fallback
//! unit of each field, and the output file names. The fetch, normalize,
//! align and save steps are the same for every source.

use std::collections::HashMap;

use chrono::{DateTime, Local, SecondsFormat};

use crate::{
    align::{align, AlignedDataset, Column, NamedSeries, Value},
    config::Config,
    payload::{RawSection, Sections},
    persist::ForecastDocument,
};

pub(crate) const KMH_PER_MS: f64 = 3.6;

/// A unit change applied before alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    MetresPerSecondToKmh,
}

/// Maps a provider parameter code onto an output column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameter {
    pub code: &'static str,
    pub column: Column,
    pub conversion: Conversion,
}

const fn param(code: &'static str, name: &'static str, default_unit: &'static str) -> Parameter {
    Parameter {
        code,
        column: Column::new(name, default_unit),
        conversion: Conversion::None,
    }
}

const fn wind(code: &'static str, name: &'static str) -> Parameter {
    Parameter {
        code,
        column: Column::new(name, "m s-1"),
        conversion: Conversion::MetresPerSecondToKmh,
    }
}

pub const NOWCAST_PARAMETERS: &[Parameter] = &[
    param("t2m", "temperature", "°C"),
    param("td", "dew_point", "°C"),
    param("rh2m", "relative_humidity", "%"),
    param("rr", "precipitation", "kg m-2"),
    wind("ff", "wind_speed"),
    wind("fx", "wind_gust"),
    param("dd", "wind_direction", "°"),
];

pub const HOURLY_PARAMETERS: &[Parameter] = &[
    param("temperature_2m", "temperature", "°C"),
    param("apparent_temperature", "apparent_temperature", "°C"),
    param("relative_humidity_2m", "relative_humidity", "%"),
    param("precipitation", "precipitation", "mm"),
    param("precipitation_probability", "precipitation_probability", "%"),
    param("rain", "rain", "mm"),
    param("cloud_cover", "cloud_cover", "%"),
    param("visibility", "visibility", "m"),
    param("wind_speed_10m", "wind_speed", "km/h"),
    param("wind_direction_10m", "wind_direction", "°"),
    param("wind_gusts_10m", "wind_gusts", "km/h"),
    param("uv_index", "uv_index", ""),
    param("weather_code", "weather_code", "wmo code"),
    param("sunshine_duration", "sunshine_duration", "s"),
];

pub const DAILY_PARAMETERS: &[Parameter] = &[
    param("temperature_2m_max", "temperature_max", "°C"),
    param("temperature_2m_min", "temperature_min", "°C"),
    param("sunrise", "sunrise", "iso8601"),
    param("sunset", "sunset", "iso8601"),
    param("daylight_duration", "daylight_duration", "s"),
    param("uv_index_max", "uv_index_max", ""),
    param("precipitation_sum", "precipitation_sum", "mm"),
];

pub const CURRENT_PARAMETERS: &[Parameter] = &[
    param("temperature_2m", "temperature", "°C"),
    param("apparent_temperature", "apparent_temperature", "°C"),
    param("precipitation", "precipitation", "mm"),
    param("rain", "rain", "mm"),
    param("showers", "showers", "mm"),
    param("cloud_cover", "cloud_cover", "%"),
    param("wind_speed_10m", "wind_speed", "km/h"),
    param("wind_gusts_10m", "wind_gusts", "km/h"),
    param("wind_direction_10m", "wind_direction", "°"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    Nowcast,
    Forecast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Short name used in metadata file names.
    pub id: &'static str,
    /// Written as `source` in every document.
    pub label: &'static str,
    pub endpoint: String,
    pub raw_file: &'static str,
    pub output_file: &'static str,
    pub primary: &'static [Parameter],
    pub daily: &'static [Parameter],
    pub current: &'static [Parameter],
    pub past_days: Option<u32>,
    pub forecast_days: Option<u32>,
}

impl SourceConfig {
    pub fn new(kind: SourceKind, config: &Config) -> Self {
        match kind {
            SourceKind::Nowcast => Self::nowcast(config),
            SourceKind::Forecast => Self::forecast(config),
        }
    }

    pub fn nowcast(config: &Config) -> Self {
        SourceConfig {
            kind: SourceKind::Nowcast,
            id: "geosphere",
            label: "GeoSphere Austria nowcast-v1-15min-1km",
            endpoint: config.endpoints.nowcast.clone(),
            raw_file: "geosphere_raw.json",
            output_file: "geosphere.json",
            primary: NOWCAST_PARAMETERS,
            daily: &[],
            current: &[],
            past_days: None,
            forecast_days: None,
        }
    }

    pub fn forecast(config: &Config) -> Self {
        SourceConfig {
            kind: SourceKind::Forecast,
            id: "open_meteo",
            label: "Open-Meteo API",
            endpoint: config.endpoints.forecast.clone(),
            raw_file: "open_meteo.json",
            output_file: "weather.json",
            primary: HOURLY_PARAMETERS,
            daily: DAILY_PARAMETERS,
            current: CURRENT_PARAMETERS,
            past_days: config.past_days,
            forecast_days: None,
        }
    }

    /// The forecast narrowed to today, as fed to the report.
    pub fn today(config: &Config) -> Self {
        SourceConfig {
            past_days: None,
            forecast_days: Some(1),
            ..Self::forecast(config)
        }
    }

    pub fn query(&self, latitude: f64, longitude: f64) -> Vec<(String, String)> {
        match self.kind {
            SourceKind::Nowcast => vec![
                ("parameters".to_string(), codes(self.primary)),
                ("lat_lon".to_string(), format!("{},{}", latitude, longitude)),
            ],
            SourceKind::Forecast => {
                let mut query = vec![
                    ("latitude".to_string(), latitude.to_string()),
                    ("longitude".to_string(), longitude.to_string()),
                    ("hourly".to_string(), codes(self.primary)),
                    ("models".to_string(), "best_match".to_string()),
                    ("timezone".to_string(), "auto".to_string()),
                ];
                if !self.daily.is_empty() {
                    query.push(("daily".to_string(), codes(self.daily)));
                }
                if !self.current.is_empty() {
                    query.push(("current".to_string(), codes(self.current)));
                }
                if let Some(days) = self.past_days {
                    query.push(("past_days".to_string(), days.to_string()));
                }
                if let Some(days) = self.forecast_days {
                    query.push(("forecast_days".to_string(), days.to_string()));
                }
                query
            }
        }
    }

    /// Normalizes and aligns every section into the frontend document.
    pub fn build_document(
        &self,
        sections: Sections,
        config: &Config,
        now: DateTime<Local>,
    ) -> ForecastDocument {
        let convert = config.convert_wind_to_kmh;
        let primary = align_section(sections.primary, self.primary, convert);

        ForecastDocument {
            location: config.location.label.clone(),
            last_updated: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            source: self.label.to_string(),
            timezone: sections.site.timezone,
            latitude: sections.site.latitude.or(Some(config.location.latitude)),
            longitude: sections.site.longitude.or(Some(config.location.longitude)),
            forecast_data: primary.records,
            units: primary.units,
            daily: (!self.daily.is_empty())
                .then(|| align_section(sections.daily, self.daily, convert).into()),
            current: (!self.current.is_empty())
                .then(|| align_section(sections.current, self.current, convert).into()),
        }
    }
}

fn codes(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| p.code)
        .collect::<Vec<_>>()
        .join(",")
}

fn align_section(
    section: RawSection,
    parameters: &[Parameter],
    convert_wind: bool,
) -> AlignedDataset {
    let columns: Vec<Column> = parameters.iter().map(|p| p.column).collect();
    let (timestamps, series) = normalize(section, parameters, convert_wind);

    align(&timestamps, &series, &columns)
}

/// Renames provider codes to output fields and applies unit conversions.
///
/// Codes with no entry in `parameters` are dropped.
pub fn normalize(
    mut section: RawSection,
    parameters: &[Parameter],
    convert_wind: bool,
) -> (Vec<String>, HashMap<String, NamedSeries>) {
    let mut series = HashMap::new();

    for parameter in parameters {
        let Some(mut named) = section.series.remove(parameter.code) else {
            continue;
        };

        if convert_wind && parameter.conversion == Conversion::MetresPerSecondToKmh {
            let unit = named
                .unit
                .as_deref()
                .unwrap_or(parameter.column.default_unit);
            if is_metres_per_second(unit) {
                named = to_kmh(named);
            }
        }

        series.insert(parameter.column.name.to_string(), named);
    }

    (section.timestamps, series)
}

pub(crate) fn is_metres_per_second(unit: &str) -> bool {
    matches!(unit.trim(), "m s-1" | "m/s" | "ms-1" | "m s**-1")
}

fn to_kmh(series: NamedSeries) -> NamedSeries {
    let values = series
        .values
        .into_iter()
        .map(|value| value.and_then(|v| v.as_f64()).map(|v| Value::Number(v * KMH_PER_MS)))
        .collect();

    NamedSeries {
        values,
        unit: Some("km/h".to_string()),
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use crate::payload::{ForecastPayload, NowcastPayload, Payload};
    use chrono::TimeZone;

    fn nowcast_section() -> RawSection {
        let mut series = HashMap::new();
        series.insert(
            "t2m".to_string(),
            NamedSeries::numeric(&[18.0, 19.0], Some("degree_Celsius")),
        );
        series.insert("ff".to_string(), NamedSeries::numeric(&[2.0, 5.0], Some("m s-1")));
        series.insert("fx".to_string(), NamedSeries::new(vec![None, Some(10.0.into())], None));
        series.insert("xx".to_string(), NamedSeries::numeric(&[1.0, 1.0], None));

        RawSection {
            timestamps: vec!["T0".to_string(), "T1".to_string()],
            series,
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn should_convert_wind_to_kmh() {
        let (_, series) = normalize(nowcast_section(), NOWCAST_PARAMETERS, true);

        let speed = &series["wind_speed"];
        assert_eq!(speed.unit.as_deref(), Some("km/h"));
        assert_eq!(speed.values, vec![Some(Value::Number(7.2)), Some(Value::Number(18.0))]);

        // No unit in the payload: the default m s-1 applies, so it converts too.
        let gust = &series["wind_gust"];
        assert_eq!(gust.unit.as_deref(), Some("km/h"));
        assert_eq!(gust.values, vec![None, Some(Value::Number(36.0))]);
    }

    #[test]
    fn should_pass_wind_through_when_disabled() {
        let (_, series) = normalize(nowcast_section(), NOWCAST_PARAMETERS, false);

        let speed = &series["wind_speed"];
        assert_eq!(speed.unit.as_deref(), Some("m s-1"));
        assert_eq!(speed.values, vec![Some(Value::Number(2.0)), Some(Value::Number(5.0))]);
    }

    #[test]
    fn should_not_convert_other_units() {
        let mut section = nowcast_section();
        section
            .series
            .insert("ff".to_string(), NamedSeries::numeric(&[10.0], Some("km/h")));
        let (_, series) = normalize(section, NOWCAST_PARAMETERS, true);

        assert_eq!(series["wind_speed"].values, vec![Some(Value::Number(10.0))]);
    }

    #[test]
    fn should_rename_codes_and_drop_unknown() {
        let (timestamps, series) = normalize(nowcast_section(), NOWCAST_PARAMETERS, true);

        assert_eq!(timestamps.len(), 2);
        assert!(series.contains_key("temperature"));
        assert!(!series.contains_key("t2m"));
        assert!(!series.contains_key("xx"));
    }

    #[test]
    fn should_build_nowcast_query() {
        let source = SourceConfig::nowcast(&Config::default());
        let query = source.query(48.13, 16.42);

        assert_eq!(query[0].0, "parameters");
        assert_eq!(query[0].1, "t2m,td,rh2m,rr,ff,fx,dd");
        assert_eq!(query[1], ("lat_lon".to_string(), "48.13,16.42".to_string()));
    }

    #[test]
    fn should_build_today_query() {
        let source = SourceConfig::today(&Config::default());
        let query = source.query(48.13, 16.42);

        assert!(query.contains(&("forecast_days".to_string(), "1".to_string())));
        assert!(!query.iter().any(|(key, _)| key == "past_days"));
        assert!(query.iter().any(|(key, _)| key == "daily"));
    }

    #[test]
    fn should_build_nowcast_document() {
        let payload: NowcastPayload = serde_json::from_str(
            r#"{
                "timestamps": ["T0", "T1", "T2"],
                "features": [{"properties": {"parameters": {
                    "t2m": {"unit": "degree_Celsius", "data": [18.0, 18.5, 19.0]},
                    "ff": {"unit": "m s-1", "data": [1.0, 2.0]}
                }}}]
            }"#,
        )
        .unwrap();
        let config = Config::default();
        let source = SourceConfig::nowcast(&config);
        let document = source.build_document(payload.into_sections(), &config, fixed_now());

        assert_eq!(document.forecast_data.len(), 3);
        assert_eq!(document.source, source.label);
        assert_eq!(document.location, config.location.label);
        assert!(document.last_updated.starts_with("2025-06-01T12:30:00"));
        assert_eq!(document.forecast_data[2].get("wind_speed"), None);
        assert_eq!(document.forecast_data[1].number("wind_speed"), Some(7.2));
        assert_eq!(document.units.get("temperature"), Some("degree_Celsius"));
        assert_eq!(document.units.get("dew_point"), Some("°C"));
        assert_eq!(document.units.get("wind_speed"), Some("km/h"));
        assert!(document.daily.is_none());
        assert!(document.current.is_none());
    }

    #[test]
    fn should_build_empty_document_from_empty_payload() {
        let payload: NowcastPayload = serde_json::from_str("{}").unwrap();
        let config = Config::default();
        let document = SourceConfig::nowcast(&config).build_document(
            payload.into_sections(),
            &config,
            fixed_now(),
        );

        assert!(document.forecast_data.is_empty());
        assert_eq!(document.units.get("wind_speed"), Some("m s-1"));
        assert_eq!(document.latitude, Some(config.location.latitude));
    }

    #[test]
    fn should_build_forecast_document_with_all_sections() {
        let payload: ForecastPayload = serde_json::from_str(
            r#"{
                "timezone": "Europe/Vienna",
                "hourly_units": {"temperature_2m": "°C"},
                "hourly": {"time": ["H0", "H1"], "temperature_2m": [14.0, 15.0], "wind_speed_10m": [7.0, 9.0]},
                "daily": {"time": ["D0"], "sunrise": ["D0T04:54"]},
                "current": {"time": "C0", "temperature_2m": 14.5}
            }"#,
        )
        .unwrap();
        let config = Config::default();
        let document = SourceConfig::forecast(&config).build_document(
            payload.into_sections(),
            &config,
            fixed_now(),
        );

        assert_eq!(document.forecast_data.len(), 2);
        // Open-Meteo already reports km/h.
        assert_eq!(document.forecast_data[1].number("wind_speed"), Some(9.0));
        assert_eq!(document.timezone.as_deref(), Some("Europe/Vienna"));

        let daily = document.daily.unwrap();
        assert_eq!(daily.data.len(), 1);
        assert_eq!(
            daily.data[0].get("sunrise").and_then(Value::as_str),
            Some("D0T04:54")
        );

        let current = document.current.unwrap();
        assert_eq!(current.data.len(), 1);
        assert_eq!(current.data[0].number("temperature"), Some(14.5));
    }
}
