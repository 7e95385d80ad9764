//! Aligns parallel data series against a shared timestamp series.
//!
//! Providers deliver one array per parameter, each indexed by position
//! against a single timestamp array. [`align`] joins them into one flat
//! record per timestamp. The number of records is always the number of
//! timestamps: a short series pads with nulls, a long one is cut off.

use std::{collections::HashMap, fmt};

use serde::{
    de::Deserializer,
    ser::{SerializeMap, Serializer},
    Deserialize, Serialize,
};

/// A single sample. Most parameters are numeric but some (sunrise, sunset)
/// are timestamps carried as text. Integers stay integers so that codes such
/// as the WMO weather code round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// One parameter's values, positionally indexed against the timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedSeries {
    pub values: Vec<Option<Value>>,
    pub unit: Option<String>,
}

impl NamedSeries {
    pub fn new(values: Vec<Option<Value>>, unit: Option<&str>) -> Self {
        NamedSeries {
            values,
            unit: unit.map(str::to_string),
        }
    }

    #[cfg(test)]
    pub fn numeric(values: &[f64], unit: Option<&str>) -> Self {
        Self::new(values.iter().map(|v| Some(Value::Number(*v))).collect(), unit)
    }
}

/// A configured output field and the unit reported when the provider omits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub default_unit: &'static str,
}

impl Column {
    pub const fn new(name: &'static str, default_unit: &'static str) -> Self {
        Column { name, default_unit }
    }
}

/// The joined values of every configured field at one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord {
    pub time: String,
    pub fields: Vec<(String, Option<Value>)>,
}

impl AlignedRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }
}

impl Serialize for AlignedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("time", &self.time)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AlignedRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Flat {
            time: String,
            #[serde(flatten)]
            fields: std::collections::BTreeMap<String, Option<Value>>,
        }

        let flat = Flat::deserialize(deserializer)?;
        Ok(AlignedRecord {
            time: flat.time,
            fields: flat.fields.into_iter().collect(),
        })
    }
}

/// Field name to unit label, kept in configured field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Units(pub Vec<(String, String)>);

impl Units {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, unit)| unit.as_str())
    }
}

impl Serialize for Units {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, unit) in &self.0 {
            map.serialize_entry(name, unit)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Units {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let units = std::collections::BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(Units(units.into_iter().collect()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedDataset {
    pub records: Vec<AlignedRecord>,
    pub units: Units,
}

/// Joins `series` into one record per timestamp for each of `columns`.
///
/// A column with no series, or a series too short to reach an index, is
/// null at that index. The unit of a column is the series' own unit if it
/// has one, otherwise the column's default.
pub fn align(
    timestamps: &[String],
    series: &HashMap<String, NamedSeries>,
    columns: &[Column],
) -> AlignedDataset {
    let records = timestamps
        .iter()
        .enumerate()
        .map(|(idx, time)| AlignedRecord {
            time: time.clone(),
            fields: columns
                .iter()
                .map(|column| {
                    let value = value_or_none(series.get(column.name), idx);
                    (column.name.to_string(), value)
                })
                .collect(),
        })
        .collect();

    let units = columns
        .iter()
        .map(|column| {
            let unit = series
                .get(column.name)
                .and_then(|s| s.unit.clone())
                .unwrap_or_else(|| column.default_unit.to_string());
            (column.name.to_string(), unit)
        })
        .collect();

    AlignedDataset {
        records,
        units: Units(units),
    }
}

fn value_or_none(series: Option<&NamedSeries>, index: usize) -> Option<Value> {
    series
        .and_then(|s| s.values.get(index))
        .cloned()
        .flatten()
}

// -- Tests -------------------------------------------------------------------
