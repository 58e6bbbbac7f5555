//! Data models for the region editor.

mod region;
mod region_type;
mod tool;

pub use region::{Region, auto_name, parse_options};
pub use region_type::{RegionStyle, RegionType, UnknownRegionType};
pub use tool::Tool;
