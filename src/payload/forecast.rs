//! Open-Meteo forecast payload.

use std::collections::HashMap;

use serde::Deserialize;

use super::{Payload, RawSection, Sections, Site};
use crate::align::{NamedSeries, Value};

#[derive(Debug, Default, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub hourly: Option<Block>,
    #[serde(default)]
    pub hourly_units: HashMap<String, String>,
    #[serde(default)]
    pub daily: Option<Block>,
    #[serde(default)]
    pub daily_units: HashMap<String, String>,
    #[serde(default)]
    pub current: Option<CurrentBlock>,
    #[serde(default)]
    pub current_units: HashMap<String, String>,
}

/// A block of arrays indexed by its `time` array.
#[derive(Debug, Default, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(flatten)]
    pub series: HashMap<String, serde_json::Value>,
}

/// The current conditions: one scalar per parameter at a single `time`.
#[derive(Debug, Default, Deserialize)]
pub struct CurrentBlock {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(flatten)]
    pub values: HashMap<String, serde_json::Value>,
}

impl Payload for ForecastPayload {
    fn into_sections(self) -> Sections {
        Sections {
            site: Site {
                latitude: self.latitude,
                longitude: self.longitude,
                timezone: self.timezone,
            },
            primary: block_section(self.hourly, &self.hourly_units),
            daily: block_section(self.daily, &self.daily_units),
            current: current_section(self.current, &self.current_units),
        }
    }
}

fn block_section(block: Option<Block>, units: &HashMap<String, String>) -> RawSection {
    let Some(block) = block else {
        return RawSection::default();
    };

    let series = block
        .series
        .into_iter()
        .filter_map(|(code, raw)| match raw {
            serde_json::Value::Array(items) => {
                let values = items.iter().map(to_value).collect();
                let unit = units.get(&code).map(String::as_str);
                Some((code, NamedSeries::new(values, unit)))
            }
            _ => None,
        })
        .collect();

    RawSection {
        timestamps: block.time,
        series,
    }
}

fn current_section(block: Option<CurrentBlock>, units: &HashMap<String, String>) -> RawSection {
    let Some(CurrentBlock {
        time: Some(time),
        values,
    }) = block
    else {
        return RawSection::default();
    };

    let series = values
        .into_iter()
        .map(|(code, raw)| {
            let unit = units.get(&code).map(String::as_str);
            let series = NamedSeries::new(vec![to_value(&raw)], unit);
            (code, series)
        })
        .collect();

    RawSection {
        timestamps: vec![time],
        series,
    }
}

fn to_value(raw: &serde_json::Value) -> Option<Value> {
    match raw {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Integer(i)),
            None => n.as_f64().map(Value::Number),
        },
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        _ => None,
    }
}

// -- Tests -------------------------------------------------------------------
