//! Handles serialising and saving artifacts to disk as JSON.
//!
//! Every save writes a timestamped archive copy plus a `latest_` file that
//! is overwritten each cycle. Processed artifacts additionally get a
//! `processed_` copy and, when configured, a copy in the mirror directory.

pub mod document;

use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::config::Config;

pub use document::{Analysis, ForecastDocument, Metadata};

#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    mirror_dir: Option<PathBuf>,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>, mirror_dir: Option<PathBuf>) -> Self {
        Store {
            data_dir: data_dir.into(),
            mirror_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone(), config.mirror_dir.clone())
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.data_dir.join("archive")
    }

    pub fn latest_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("latest_{}", name))
    }

    pub fn processed_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("processed_{}", name))
    }

    pub fn archive_path(&self, name: &str, now: DateTime<Local>) -> PathBuf {
        self.archive_dir()
            .join(format!("{}_{}", now.format("%Y%m%d_%H%M"), name))
    }

    /// Writes the archive copy and the latest file. Returns the latest path.
    pub fn save_raw<T: Serialize>(
        &self,
        name: &str,
        value: &T,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        write_json(&self.archive_path(name, now), value)?;

        let latest = self.latest_path(name);
        write_json(&latest, value)?;

        Ok(latest)
    }

    /// As [`Store::save_raw`], plus the processed and mirror copies.
    /// Returns the processed path.
    pub fn save_processed<T: Serialize>(
        &self,
        name: &str,
        value: &T,
        now: DateTime<Local>,
    ) -> Result<PathBuf> {
        self.save_raw(name, value, now)?;

        let processed = self.processed_path(name);
        write_json(&processed, value)?;

        if let Some(mirror_dir) = &self.mirror_dir {
            let mirrored = mirror_dir.join(name);
            write_json(&mirrored, value)?;
            log::debug!("Mirrored {} to {}", name, mirrored.display());
        }

        Ok(processed)
    }
}

/// Pretty-prints `value` to `path` through a temporary file in the same
/// directory, so readers never see a half-written file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(value)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 9, 5, 0).unwrap()
    }

    #[test]
    fn should_save_raw_as_latest_and_archive() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path(), None);

        let latest = store
            .save_raw("open_meteo.json", &json!({"a": 1}), fixed_now())
            .unwrap();

        assert_eq!(latest, dir.path().join("latest_open_meteo.json"));
        assert!(latest.exists());
        assert!(dir
            .path()
            .join("archive/20250601_0905_open_meteo.json")
            .exists());
        assert!(!store.processed_path("open_meteo.json").exists());
    }

    #[test]
    fn should_save_processed_and_mirror() {
        let dir = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        let store = Store::new(dir.path(), Some(mirror.path().join("frontend")));

        let processed = store
            .save_processed("weather.json", &json!({"b": 2}), fixed_now())
            .unwrap();

        assert_eq!(processed, dir.path().join("processed_weather.json"));
        assert!(dir.path().join("latest_weather.json").exists());
        assert!(dir.path().join("archive/20250601_0905_weather.json").exists());

        let mirrored: serde_json::Value =
            read_json(&mirror.path().join("frontend/weather.json")).unwrap();
        assert_eq!(mirrored, json!({"b": 2}));
    }

    #[test]
    fn should_overwrite_latest() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path(), None);

        store.save_raw("m.json", &json!({"n": 1}), fixed_now()).unwrap();
        store.save_raw("m.json", &json!({"n": 2}), fixed_now()).unwrap();

        let latest: serde_json::Value = read_json(&store.latest_path("m.json")).unwrap();
        assert_eq!(latest, json!({"n": 2}));
    }

    #[test]
    fn should_fail_to_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result: Result<serde_json::Value> = read_json(&dir.path().join("nope.json"));

        assert!(result.is_err());
    }
}
