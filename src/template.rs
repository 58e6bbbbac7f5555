//! Template configuration export and import.
//!
//! A template configuration is the region layout in the shape downstream
//! grading consumes: an identifier, a display name, and every region's id,
//! type, normalized coordinates and (for multiple choice) options. Styling and
//! editor-only flags are not part of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{self, Coordinates};
use crate::model::{Region, RegionType};

/// Errors that can occur when reading or writing a template configuration.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A region entry breaks the configuration rules
    #[error("Invalid region '{id}': {message}")]
    InvalidRegion {
        /// Id of the offending region
        id: String,
        /// Description of the problem
        message: String,
    },

    /// Two regions share an id
    #[error("Duplicate region id: {id}")]
    DuplicateId { id: String },
}

/// One region in a template configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRegion {
    pub id: String,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    /// `[x_min, y_min, x_max, y_max]`
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<&Region> for TemplateRegion {
    fn from(region: &Region) -> Self {
        Self {
            id: region.id.clone(),
            region_type: region.region_type,
            coordinates: region.bounds(),
            options: region.options.clone(),
        }
    }
}

/// A saved answer-sheet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub template_id: String,
    pub template_name: String,
    pub regions: Vec<TemplateRegion>,
}

impl TemplateConfig {
    /// Build the configuration for `regions` under the display name `name`.
    pub fn from_regions(name: &str, regions: &[Region]) -> Self {
        Self {
            template_id: template_id(name),
            template_name: name.to_string(),
            regions: regions.iter().map(TemplateRegion::from).collect(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a configuration.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn write_to(&self, path: &std::path::Path) -> Result<(), TemplateError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!(
            "Wrote template '{}' ({} regions) to {:?}",
            self.template_id,
            self.regions.len(),
            path
        );
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_from(path: &std::path::Path) -> Result<Self, TemplateError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Check ids are unique, coordinates are finite and options appear
    /// exactly on multiple choice regions.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut seen = std::collections::HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.id.as_str()) {
                return Err(TemplateError::DuplicateId {
                    id: region.id.clone(),
                });
            }
            let invalid = |message: &str| TemplateError::InvalidRegion {
                id: region.id.clone(),
                message: message.to_string(),
            };
            if region.coordinates.iter().any(|c| !c.is_finite()) {
                return Err(invalid("coordinates must be finite numbers"));
            }
            match (region.region_type.has_options(), &region.options) {
                (true, None) => return Err(invalid("multiple choice region has no options")),
                (false, Some(_)) => return Err(invalid("options are only allowed on multiple choice")),
                _ => {}
            }
        }
        Ok(())
    }

    /// Rebuild editor regions, styled and named for their types.
    pub fn to_regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::with_capacity(self.regions.len());
        for entry in &self.regions {
            let name = crate::model::auto_name(entry.region_type, &regions);
            let mut region = Region::new(
                entry.id.clone(),
                name,
                entry.region_type,
                geometry::normalize(entry.coordinates),
                "",
            );
            region.options = entry.options.clone();
            regions.push(region);
        }
        regions
    }
}

/// Lowercased name with every whitespace run replaced by `_`.
pub fn template_id(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
