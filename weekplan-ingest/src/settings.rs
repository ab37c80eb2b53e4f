//! Settings file loader. `.toml` files are read as TOML, everything else as
//! JSON. Both hold a flat table; scalar values are kept as strings.

use anyhow::{Context, Result, bail};
use std::path::Path;

use weekplan_core::Settings;

pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_toml(&raw).with_context(|| format!("parsing {}", path.display()))
    } else {
        parse_json(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

pub fn parse_json(raw: &str) -> Result<Settings> {
    let table: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
    let mut settings = Settings::new();
    for (key, value) in table {
        let value = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => continue,
            other => bail!("setting '{key}' must be a scalar, got {other}"),
        };
        settings.set(key, value);
    }
    Ok(settings)
}

pub fn parse_toml(raw: &str) -> Result<Settings> {
    let table: toml::Table = raw.parse()?;
    let mut settings = Settings::new();
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
            other => bail!("setting '{key}' must be a scalar, got {}", other.type_str()),
        };
        settings.set(key, value);
    }
    Ok(settings)
}
