use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use shared::{domain::PanelSpec, error::ConfigError};

pub const DEFAULT_BASE_PATH: &str = "things/";

/// Feed paths the engine listens on. Channel names are appended to
/// `base_path` as-is, so the base normally ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncParams {
    pub base_path: String,
    pub prev_channel: String,
    pub next_channel: String,
    pub value_channel: String,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.into(),
            prev_channel: "prev".into(),
            next_channel: "next".into(),
            value_channel: "dial".into(),
        }
    }
}

impl SyncParams {
    pub fn prev_path(&self) -> String {
        format!("{}{}", self.base_path, self.prev_channel)
    }

    pub fn next_path(&self) -> String {
        format!("{}{}", self.base_path, self.next_channel)
    }

    pub fn value_path(&self) -> String {
        format!("{}{}", self.base_path, self.value_channel)
    }

    pub fn control_path(&self, property: &str) -> String {
        format!("{}{property}", self.base_path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParamOverrides {
    pub base_path: Option<String>,
    pub prev_channel: Option<String>,
    pub next_channel: Option<String>,
    pub value_channel: Option<String>,
}

impl ParamOverrides {
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_prev_channel(mut self, channel: impl Into<String>) -> Self {
        self.prev_channel = Some(channel.into());
        self
    }

    pub fn with_next_channel(mut self, channel: impl Into<String>) -> Self {
        self.next_channel = Some(channel.into());
        self
    }

    pub fn with_value_channel(mut self, channel: impl Into<String>) -> Self {
        self.value_channel = Some(channel.into());
        self
    }
}

/// Fields set in `overrides` replace the matching fields of `base`.
pub fn merge_defaults(base: SyncParams, overrides: ParamOverrides) -> SyncParams {
    SyncParams {
        base_path: overrides.base_path.unwrap_or(base.base_path),
        prev_channel: overrides.prev_channel.unwrap_or(base.prev_channel),
        next_channel: overrides.next_channel.unwrap_or(base.next_channel),
        value_channel: overrides.value_channel.unwrap_or(base.value_channel),
    }
}

/// Reads overrides from an optional TOML file, then applies environment
/// variables on top.
pub fn load_overrides(path: Option<&Path>) -> Result<ParamOverrides, ConfigError> {
    let overrides = match path {
        Some(path) => read_toml::<ParamOverrides>(path)?,
        None => ParamOverrides::default(),
    };
    Ok(apply_env_overrides(overrides, |name| std::env::var(name).ok()))
}

/// `DIALSYNC_*` variables override the file; `APP__*` variables override both.
pub fn apply_env_overrides(
    mut overrides: ParamOverrides,
    lookup: impl Fn(&str) -> Option<String>,
) -> ParamOverrides {
    let fields: [(&str, &mut Option<String>); 4] = [
        ("BASE_PATH", &mut overrides.base_path),
        ("PREV_CHANNEL", &mut overrides.prev_channel),
        ("NEXT_CHANNEL", &mut overrides.next_channel),
        ("VALUE_CHANNEL", &mut overrides.value_channel),
    ];

    for (suffix, field) in fields {
        if let Some(v) = lookup(&format!("DIALSYNC_{suffix}")) {
            *field = Some(v);
        }
        if let Some(v) = lookup(&format!("APP__{suffix}")) {
            *field = Some(v);
        }
    }

    overrides
}

pub fn load_panel_spec(path: &Path) -> Result<PanelSpec, ConfigError> {
    read_toml(path)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
