//! sheetmark - answer-sheet template region editor
//!
//! A headless editor core for marking rectangular regions (student info,
//! question areas, multiple choice blocks, ...) on a scanned answer-sheet
//! image. The host feeds pointer and keyboard events in, replays the returned
//! draw commands onto its canvas, and receives the finished region list on save.

pub mod color;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod host;
pub mod input;
pub mod keybindings;
pub mod model;
pub mod render;
pub mod source_image;
pub mod template;
pub mod view;

pub use config::EditorConfig;
pub use editor::{EditorSettings, ImageState, RegionEditor};
pub use error::EditorError;
pub use host::{EditorHost, KeyboardHub, KeyboardSubscription, MountedEditor};
pub use model::{Region, RegionType, Tool};
pub use render::{DrawCommand, Scene};
pub use template::TemplateConfig;
