//! Global constants for the region editor.

/// Zoom constants.
pub mod zoom {
    /// Zoom increment/decrement factor
    pub const FACTOR: f32 = 1.2;
    /// Maximum zoom level
    pub const MAX: f32 = 5.0;
    /// Minimum zoom level
    pub const MIN: f32 = 0.1;
    /// Minimum zoom change to trigger update
    pub const CHANGE_THRESHOLD: f32 = 0.001;
}

/// Canvas layout constants.
pub mod canvas {
    /// Extra canvas space added to each image axis (room for the rulers)
    pub const MARGIN: u32 = 200;
    /// Grid line spacing in image units
    pub const GRID_SPACING: f32 = 20.0;
    /// Ruler label spacing in screen pixels
    pub const RULER_SPACING: f32 = 50.0;
    /// Distance of ruler labels from the canvas edge
    pub const RULER_OFFSET: f32 = 15.0;
    /// Ruler label font size (screen pixels)
    pub const RULER_FONT_SIZE: f32 = 10.0;
}

/// Region drawing constants. Sizes are in screen pixels and get divided by zoom
/// before being drawn into image space.
pub mod region {
    /// Side length of a resize handle, also the handle hit threshold
    pub const HANDLE_SIZE: f32 = 8.0;
    /// Stroke width of resize handles
    pub const HANDLE_STROKE: f32 = 2.0;
    /// Default region stroke width
    pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
    /// Label font size
    pub const LABEL_FONT_SIZE: f32 = 12.0;
    /// Gap between a label baseline and the region's top edge
    pub const LABEL_OFFSET: f32 = 5.0;
    /// Dash and gap length of the in-progress outline
    pub const PREVIEW_DASH: f32 = 5.0;
    /// Stroke width of the in-progress outline
    pub const PREVIEW_STROKE: f32 = 2.0;
    /// Default comma-separated options for multiple choice regions
    pub const DEFAULT_OPTIONS: &str = "A, B, C, D";
}

/// Default maximum number of history snapshots.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
