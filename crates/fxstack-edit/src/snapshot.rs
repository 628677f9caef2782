//! Effect value snapshots: saving one filter's values and applying them to
//! another filter of the same type.
//!
//! Uses JSON with a schema version field for forward-compatible persistence.

use std::path::Path;

use fxstack_core::fs::atomic_write;
use fxstack_core::{Filter, FilterInfo, FxStackError, PropertyMap, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Extension used for saved effect values.
pub const FILE_EXTENSION: &str = "data";

/// Detached copy of one filter's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectValues {
    /// Descriptor of the filter the values came from, used for compatibility checks.
    pub info: FilterInfo,
    pub multipart_filter: bool,
    pub properties: PropertyMap,
    /// Absent in files written before UI-only properties were saved.
    #[serde(default)]
    pub non_mlt_properties: PropertyMap,
    #[serde(default)]
    pub value: Option<String>,
}

impl EffectValues {
    /// Copy the current values of `filter`.
    pub fn capture(filter: &Filter) -> Self {
        let multipart_filter = filter.info.multipart_filter;
        Self {
            info: (*filter.info).clone(),
            multipart_filter,
            properties: filter.properties.clone(),
            non_mlt_properties: filter.non_mlt_properties.clone(),
            value: if multipart_filter {
                filter.value.clone()
            } else {
                None
            },
        }
    }

    /// Values only apply to a filter whose descriptor is equal field for field.
    pub fn is_applicable(&self, filter: &Filter) -> bool {
        self.info == *filter.info
    }

    /// Copy these values onto `filter` and push them to the renderer.
    ///
    /// An incompatible target is left unchanged.
    pub fn apply_to(&self, filter: &mut Filter) -> Result<()> {
        if !self.is_applicable(filter) {
            return Err(FxStackError::Incompatible {
                saved: self.info.name.clone(),
                current: filter.name().to_string(),
            });
        }
        filter.properties = self.properties.clone();
        filter.non_mlt_properties = self.non_mlt_properties.clone();
        if self.multipart_filter {
            filter.value = self.value.clone();
        }
        filter.update_all_properties();
        Ok(())
    }

    /// Suggested file name when saving values of `filter`.
    pub fn default_file_name(filter: &Filter) -> String {
        format!("{}_effect_values.{}", filter.name(), FILE_EXTENSION)
    }

    /// Write to `path`, replacing any existing file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = EffectValuesFile::new(self.clone()).to_json()?;
        atomic_write(path, &data)?;
        info!(filter = %self.info.name, path = %path.display(), "effect values saved");
        Ok(())
    }

    /// Read from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let file = EffectValuesFile::from_json(&data).map_err(|e| {
            warn!(path = %path.display(), error = %e, "unreadable effect values file");
            e
        })?;
        info!(filter = %file.effect.info.name, path = %path.display(), "effect values loaded");
        Ok(file.effect)
    }
}

/// Versioned effect values file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct EffectValuesFile {
    /// Schema version for migration.
    pub version: u32,
    /// The saved values.
    pub effect: EffectValues,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl EffectValuesFile {
    pub fn new(effect: EffectValues) -> Self {
        Self {
            version: CURRENT_VERSION,
            effect,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            FxStackError::Serialization(format!("Failed to serialize effect values: {}", e))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| FxStackError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

        if version > CURRENT_VERSION {
            return Err(FxStackError::Serialization(format!(
                "Effect values file version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;

        serde_json::from_value(migrated).map_err(|e| {
            FxStackError::Serialization(format!("Failed to parse effect values: {}", e))
        })
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 files are a bare snapshot
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "effect": data,
                        "app_version": "0.0.0",
                    });
                }
                version = 1;
            }
            _ => {
                return Err(FxStackError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}
