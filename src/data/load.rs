use std::fs;

use anyhow::{Context, Result, anyhow};

use super::model::Country;

/// Single-shot acquisition of the country list. Either the whole payload
/// parses or the call fails; there is no partial result and no retry here.
pub fn load_countries(path: &str) -> Result<Vec<Country>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read country data from {path}"))?;
    parse_countries(&raw).with_context(|| format!("failed to parse country data from {path}"))
}

fn parse_countries(raw: &str) -> Result<Vec<Country>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("invalid JSON")?;

    // Accept either a bare array or the envelope { "countries": [...] }
    // some exports wrap the payload in.
    let list = if value.is_array() {
        value
    } else if let Some(inner) = value.get("countries").cloned() {
        inner
    } else {
        return Err(anyhow!("expected a JSON array of country records"));
    };

    serde_json::from_value(list).context("invalid country record in payload")
}
