//! Region data model.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::constants::region::DEFAULT_STROKE_WIDTH;
use crate::geometry::{self, Coordinates, Point};

use super::RegionType;

/// A labelled rectangle on the template image.
///
/// Coordinates are stored as `[x1, y1, x2, y2]` in image pixels and are *not*
/// normalized: a region dragged up-left keeps `x2 < x1`. Use [`Region::bounds`]
/// for min/max geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Unique identifier within the editing session.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    #[serde(rename = "type")]
    pub region_type: RegionType,
    pub coordinates: Coordinates,
    /// Choice labels, present iff the type is multiple choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub color: Color,
    pub fill_color: Color,
    pub opacity: f32,
    pub stroke_width: f32,
    pub visible: bool,
    pub locked: bool,
}

impl Region {
    /// Create a region styled for its type.
    ///
    /// `options_input` is the comma-separated options string; it is only used
    /// when `region_type` is multiple choice.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        region_type: RegionType,
        coordinates: Coordinates,
        options_input: &str,
    ) -> Self {
        let style = region_type.style();
        Self {
            id: id.into(),
            name: name.into(),
            region_type,
            coordinates,
            options: region_type
                .has_options()
                .then(|| parse_options(options_input)),
            color: style.color,
            fill_color: style.fill_color,
            opacity: style.opacity,
            stroke_width: DEFAULT_STROKE_WIDTH,
            visible: true,
            locked: false,
        }
    }

    /// Change the type, restyling the region and enforcing the options invariant.
    ///
    /// Switching to multiple choice keeps existing options, otherwise parses
    /// `default_options`. Switching away clears them. Stroke width is kept.
    pub fn set_type(&mut self, region_type: RegionType, default_options: &str) {
        let style = region_type.style();
        self.region_type = region_type;
        self.color = style.color;
        self.fill_color = style.fill_color;
        self.opacity = style.opacity;
        self.options = if region_type.has_options() {
            Some(
                self.options
                    .take()
                    .unwrap_or_else(|| parse_options(default_options)),
            )
        } else {
            None
        };
    }

    /// Min/max normalized bounds.
    pub fn bounds(&self) -> Coordinates {
        geometry::normalize(self.coordinates)
    }

    /// Check if an image-space point lies inside the region.
    pub fn contains(&self, point: Point) -> bool {
        geometry::contains(self.coordinates, point)
    }

    /// Text drawn above the region: the name, plus bracketed options if any.
    pub fn label(&self) -> String {
        match &self.options {
            Some(options) => format!("{} [{}]", self.name, options.join(", ")),
            None => self.name.clone(),
        }
    }
}

/// Parse a comma-separated options string, trimming entries and dropping empties.
pub fn parse_options(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|opt| !opt.is_empty())
        .map(str::to_string)
        .collect()
}

/// Auto-generated name for a new region of `region_type`.
///
/// The counter is the number of regions of that type already in `regions`,
/// plus one. Deleting and re-adding can therefore repeat a name.
pub fn auto_name(region_type: RegionType, regions: &[Region]) -> String {
    let count = regions
        .iter()
        .filter(|r| r.region_type == region_type)
        .count();
    format!("{}{}", region_type.name_prefix(), count + 1)
}
