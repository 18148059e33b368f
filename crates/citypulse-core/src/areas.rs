//! The monitored-area list and its name → search-keyword table.
//!
//! Several official area names (tourist-district designations and the
//! like) are not directly geocodable; each maps to a representative
//! landmark keyword that is. The table is static domain data kept in
//! `config/areas.yaml`, loaded once at startup and never recomputed.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One monitored area: the provider's official name and the keyword the
/// geocoder resolves it by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct AreasFile {
    pub areas: Vec<AreaConfig>,
}

impl AreasFile {
    /// Looks up the geocoding keyword for an official area name.
    #[must_use]
    pub fn keyword_for(&self, area_name: &str) -> Option<&str> {
        self.areas
            .iter()
            .find(|a| a.name == area_name)
            .map(|a| a.keyword.as_str())
    }

    /// The official area names, in file order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.areas.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Load and validate the area table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_areas(path: &Path) -> Result<AreasFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let areas_file: AreasFile = serde_yaml::from_str(&content)?;
    validate_areas(&areas_file)?;

    Ok(areas_file)
}

fn validate_areas(areas_file: &AreasFile) -> Result<(), ConfigError> {
    if areas_file.areas.is_empty() {
        return Err(ConfigError::Validation(
            "area table must contain at least one area".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    for area in &areas_file.areas {
        if area.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "area name must be non-empty".to_string(),
            ));
        }
        if area.keyword.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "area '{}' has an empty search keyword",
                area.name
            )));
        }
        if !seen_names.insert(area.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate area name: '{}'",
                area.name
            )));
        }
    }

    Ok(())
}
