//! Editor tools.

use serde::{Deserialize, Serialize};

/// Tools that govern how pointer input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Select regions, and move/resize the selected one
    Select,
    /// Draw new rectangular regions
    #[default]
    Rectangle,
    /// Same pointer behavior as Select
    Move,
    /// Pan the view
    Hand,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Rectangle => "Rectangle",
            Tool::Move => "Move",
            Tool::Hand => "Hand Tool",
        }
    }
}
