pub mod fetch;
pub mod report;
pub mod summary;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat};

use crate::payload::{Payload, Sections};

pub use fetch::fetch;
pub use report::{analyze, report};
pub use summary::summary;

/// Decodes a raw provider payload into its sections.
pub fn decode<P: Payload>(raw: serde_json::Value) -> Result<Sections> {
    let payload: P = serde_json::from_value(raw).context("Malformed provider payload")?;

    Ok(payload.into_sections())
}

pub fn timestamp(now: DateTime<Local>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;
    use crate::payload::NowcastPayload;
    use serde_json::json;

    #[test]
    fn should_decode_payload_with_missing_sections() {
        let sections = decode::<NowcastPayload>(json!({"type": "FeatureCollection"})).unwrap();
        assert!(sections.primary.timestamps.is_empty());
    }

    #[test]
    fn should_reject_mistyped_payload() {
        let result = decode::<NowcastPayload>(json!({"timestamps": "not a list"}));
        assert!(result.is_err());
    }
}
