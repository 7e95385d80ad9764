//! GeoSphere Austria timeseries payload (GeoJSON feature collection).

use std::collections::HashMap;

use serde::Deserialize;

use super::{Payload, RawSection, Sections, Site};
use crate::align::{NamedSeries, Value};

#[derive(Debug, Default, Deserialize)]
pub struct NowcastPayload {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub parameters: HashMap<String, Parameter>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Option<Value>>>,
}

impl Payload for NowcastPayload {
    fn into_sections(self) -> Sections {
        // Only the first feature is requested, one point per query.
        let Some(feature) = self.features.into_iter().next() else {
            return Sections::default();
        };

        // GeoJSON orders coordinates longitude first.
        let site = match feature.geometry.as_ref().map(|g| g.coordinates.as_slice()) {
            Some([lon, lat, ..]) => Site {
                latitude: Some(*lat),
                longitude: Some(*lon),
                timezone: None,
            },
            _ => Site::default(),
        };

        let series = feature
            .properties
            .parameters
            .into_iter()
            .map(|(code, parameter)| {
                let values = parameter.data.unwrap_or_default();
                (code, NamedSeries::new(values, parameter.unit.as_deref()))
            })
            .collect();

        Sections {
            site,
            primary: RawSection {
                timestamps: self.timestamps,
                series,
            },
            ..Sections::default()
        }
    }
}

// -- Tests -------------------------------------------------------------------
