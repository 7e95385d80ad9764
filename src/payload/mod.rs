//! Typed provider payloads.
//!
//! Each provider's JSON is validated once here and split into sections of
//! parallel series keyed by the provider's own parameter codes. Missing keys
//! deserialize as empty so that a malformed payload degrades to empty
//! sections instead of an error.

pub mod forecast;
pub mod nowcast;

use std::collections::HashMap;

use crate::align::NamedSeries;

pub use forecast::ForecastPayload;
pub use nowcast::NowcastPayload;

/// One block of parallel series sharing a timestamp index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    pub timestamps: Vec<String>,
    pub series: HashMap<String, NamedSeries>,
}

/// Where a provider places the site it reports on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

/// The sections a payload can carry. Providers that only deliver a single
/// block fill `primary` and leave the rest empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    pub site: Site,
    pub primary: RawSection,
    pub daily: RawSection,
    pub current: RawSection,
}

// Define a trait for turning a decoded payload into its sections
pub trait Payload: serde::de::DeserializeOwned {
    fn into_sections(self) -> Sections;
}
