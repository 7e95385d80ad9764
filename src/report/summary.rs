//! Renders a forecast document into the plain-text digest sent to the model.

use std::{collections::BTreeSet, fmt::Write};

use crate::{
    align::{AlignedRecord, Value},
    persist::ForecastDocument,
    stats,
};

/// Builds the text summary of `document`'s hourly records.
///
/// Sections whose fields carry no numbers are left out rather than
/// rendered with placeholder values.
pub fn prepare_summary(document: &ForecastDocument) -> String {
    let records = &document.forecast_data;
    let mut out = String::new();

    let date = records
        .first()
        .map(|r| r.time.split('T').next().unwrap_or(&r.time).to_string())
        .unwrap_or_else(|| "unknown date".to_string());

    let _ = writeln!(out, "Weather Forecast Analysis for {}", date);
    let _ = write!(out, "Location: {}", document.location);
    if let (Some(lat), Some(lon)) = (document.latitude, document.longitude) {
        let _ = write!(out, " ({}, {})", lat, lon);
    }
    if let Some(timezone) = &document.timezone {
        let _ = write!(out, " | Timezone: {}", timezone);
    }
    out.push_str("\n\n");

    if let Some(t) = stats::column(records, "temperature") {
        let _ = writeln!(out, "TEMPERATURE:");
        let _ = writeln!(out, "- Range: {}°C to {}°C", t.min, t.max);
        let _ = writeln!(out, "- Hourly temperatures: {}", list(records, "temperature"));
        if stats::column(records, "apparent_temperature").is_some() {
            let _ = writeln!(
                out,
                "- Apparent temperatures: {}",
                list(records, "apparent_temperature")
            );
        }
        out.push('\n');
    }

    if let Some(w) = stats::column(records, "wind_speed") {
        let _ = writeln!(out, "WIND CONDITIONS:");
        let _ = writeln!(out, "- Average wind speed: {:.1} km/h", w.mean());
        let _ = writeln!(out, "- Maximum wind speed: {} km/h", w.max);
        if let Some(g) = stats::column(records, "wind_gusts") {
            let _ = writeln!(out, "- Maximum gusts: {} km/h", g.max);
        }
        let _ = writeln!(out, "- Wind directions: {}", list(records, "wind_direction"));
        let _ = writeln!(out, "- Hourly wind speeds: {}", list(records, "wind_speed"));
        out.push('\n');
    }

    let precipitation = stats::column(records, "precipitation");
    let probability = stats::column(records, "precipitation_probability");
    let humidity = stats::column(records, "relative_humidity");
    if precipitation.is_some() || probability.is_some() || humidity.is_some() {
        let _ = writeln!(out, "PRECIPITATION & HUMIDITY:");
        if let Some(p) = precipitation {
            let _ = writeln!(out, "- Total precipitation: {:.1} mm", p.sum);
        }
        if let Some(p) = probability {
            let _ = writeln!(out, "- Max precipitation probability: {}%", p.max);
        }
        if let Some(h) = humidity {
            let _ = writeln!(out, "- Average humidity: {:.1}%", h.mean());
        }
        if precipitation.is_some() {
            let _ = writeln!(out, "- Hourly precipitation: {}", list(records, "precipitation"));
        }
        out.push('\n');
    }

    let uv = stats::column(records, "uv_index");
    let sunshine = stats::column(records, "sunshine_duration");
    let daylight = daylight(document);
    if uv.is_some() || sunshine.is_some() || daylight.is_some() {
        let _ = writeln!(out, "SUN & UV:");
        if let Some((sunrise, sunset)) = daylight {
            let _ = writeln!(out, "- Sunrise: {} | Sunset: {}", sunrise, sunset);
        }
        if let Some(u) = uv {
            let _ = writeln!(out, "- Maximum UV index: {}", u.max);
        }
        if sunshine.is_some() {
            let seconds: f64 = stats::values(records, "sunshine_duration")
                .into_iter()
                .filter(|s| *s > 0.0)
                .sum();
            let _ = writeln!(out, "- Total sunshine duration: {:.1} hours", seconds / 3600.0);
        }
        out.push('\n');
    }

    let visibility = stats::column(records, "visibility");
    let clouds = stats::column(records, "cloud_cover");
    if visibility.is_some() || clouds.is_some() {
        let _ = writeln!(out, "VISIBILITY & CLOUD COVER:");
        if let Some(v) = visibility {
            let _ = writeln!(out, "- Average visibility: {:.1} km", v.mean() / 1000.0);
        }
        if clouds.is_some() {
            let _ = writeln!(out, "- Cloud cover by hour (%): {}", list(records, "cloud_cover"));
        }
        out.push('\n');
    }

    let codes = weather_codes(records);
    if !codes.is_empty() {
        let _ = writeln!(out, "WEATHER CODES:");
        let _ = writeln!(out, "- Present conditions (WMO codes): {:?}", codes);
        out.push('\n');
    }

    let _ = writeln!(out, "HOURLY TIMELINE:");
    let _ = writeln!(out, "Time | Temp | Wind | UV | Precip% | Cloud%");
    for record in records {
        let time = record.time.split('T').nth(1).unwrap_or(&record.time);
        let _ = writeln!(
            out,
            "{} | {}°C | {}km/h | {} | {}% | {}%",
            time,
            cell(record, "temperature"),
            cell(record, "wind_speed"),
            cell(record, "uv_index"),
            cell(record, "precipitation_probability"),
            cell(record, "cloud_cover"),
        );
    }

    out
}

fn list(records: &[AlignedRecord], name: &str) -> String {
    let items: Vec<String> = records.iter().map(|r| cell(r, name)).collect();
    format!("[{}]", items.join(", "))
}

fn cell(record: &AlignedRecord, name: &str) -> String {
    record
        .get(name)
        .map(Value::to_string)
        .unwrap_or_else(|| "n/a".to_string())
}

/// Sunrise and sunset of the first day in the daily outlook.
fn daylight(document: &ForecastDocument) -> Option<(&str, &str)> {
    let day = document.daily.as_ref()?.data.first()?;

    Some((day.get("sunrise")?.as_str()?, day.get("sunset")?.as_str()?))
}

fn weather_codes(records: &[AlignedRecord]) -> BTreeSet<i64> {
    records
        .iter()
        .filter_map(|r| r.number("weather_code"))
        .map(|code| code as i64)
        .collect()
}

// -- Tests -------------------------------------------------------------------
