//! The JSON artifacts read by the frontend.

use serde::{Deserialize, Serialize};

use crate::align::{AlignedDataset, AlignedRecord, Units};

/// A processed forecast: one record per timestamp plus the unit of each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDocument {
    pub location: String,
    /// ISO 8601 with offset.
    pub last_updated: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub forecast_data: Vec<AlignedRecord>,
    #[serde(default)]
    pub units: Units,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Section>,
}

/// A secondary block of records, such as the daily outlook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub data: Vec<AlignedRecord>,
    #[serde(default)]
    pub units: Units,
}

impl From<AlignedDataset> for Section {
    fn from(dataset: AlignedDataset) -> Self {
        Section {
            data: dataset.records,
            units: dataset.units,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The outcome of one source's fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub last_update: String,
    pub source: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Metadata {
    pub fn success(source: &str, last_update: String) -> Self {
        Metadata {
            last_update,
            source: source.to_string(),
            status: Status::Success,
            error_message: None,
        }
    }

    pub fn error(source: &str, last_update: String, message: String) -> Self {
        Metadata {
            last_update,
            source: source.to_string(),
            status: Status::Error,
            error_message: Some(message),
        }
    }

    pub fn file_name(id: &str) -> String {
        format!("metadata_{}.json", id)
    }
}

/// The generated activity report in both languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub timestamp: String,
    pub english: String,
    pub german: String,
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use crate::align::Value;
    use serde_json::json;

    fn document() -> ForecastDocument {
        ForecastDocument {
            location: "Vienna Kledering".to_string(),
            last_updated: "2025-06-01T12:00:00+02:00".to_string(),
            source: "GeoSphere Austria nowcast-v1-15min-1km".to_string(),
            timezone: None,
            latitude: Some(48.13),
            longitude: Some(16.43),
            forecast_data: vec![AlignedRecord {
                time: "2025-06-01T10:00+00:00".to_string(),
                fields: vec![
                    ("temperature".to_string(), Some(Value::Number(18.5))),
                    ("precipitation".to_string(), None),
                ],
            }],
            units: Units(vec![
                ("temperature".to_string(), "°C".to_string()),
                ("precipitation".to_string(), "kg m-2".to_string()),
            ]),
            daily: None,
            current: None,
        }
    }

    #[test]
    fn should_serialize_frontend_shape() {
        let actual = serde_json::to_value(document()).unwrap();

        assert_eq!(
            actual,
            json!({
                "location": "Vienna Kledering",
                "last_updated": "2025-06-01T12:00:00+02:00",
                "source": "GeoSphere Austria nowcast-v1-15min-1km",
                "latitude": 48.13,
                "longitude": 16.43,
                "forecast_data": [
                    {"time": "2025-06-01T10:00+00:00", "temperature": 18.5, "precipitation": null}
                ],
                "units": {"temperature": "°C", "precipitation": "kg m-2"}
            })
        );
    }

    #[test]
    fn should_read_back_document() {
        let text = serde_json::to_string(&document()).unwrap();
        let parsed: ForecastDocument = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.forecast_data[0].number("temperature"), Some(18.5));
        assert_eq!(parsed.units.get("precipitation"), Some("kg m-2"));
        assert!(parsed.daily.is_none());
    }

    #[test]
    fn should_serialize_error_metadata() {
        let metadata = Metadata::error(
            "Open-Meteo API",
            "2025-06-01T12:00:00+02:00".to_string(),
            "HTTP 503".to_string(),
        );

        assert_eq!(
            serde_json::to_value(metadata).unwrap(),
            json!({
                "last_update": "2025-06-01T12:00:00+02:00",
                "source": "Open-Meteo API",
                "status": "error",
                "error_message": "HTTP 503"
            })
        );
    }

    #[test]
    fn should_omit_message_on_success() {
        let metadata = Metadata::success("Open-Meteo API", "t".to_string());
        let value = serde_json::to_value(metadata).unwrap();

        assert_eq!(value["status"], "success");
        assert!(value.get("error_message").is_none());
    }
}
