//! Input events and the pointer interaction state machine.

use serde::{Deserialize, Serialize};

use crate::geometry::{Coordinates, Handle, Point};
use crate::model::Tool;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A pointer event in device (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    #[serde(default)]
    pub button: PointerButton,
}

impl PointerEvent {
    /// Primary-button event at `(x, y)`.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
        }
    }
}

/// Keyboard keys (simplified set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Delete,
    Escape,
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const COMMAND: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Unmodified character key.
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE)
    }

    /// Ctrl/Cmd + character.
    pub fn command(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::COMMAND)
    }

    /// Lowercased character, if this is a character key.
    pub fn char_lowercase(&self) -> Option<char> {
        match self.key {
            Key::Char(c) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// Editor operations reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    DeleteSelected,
    Undo,
    Redo,
    Save,
    /// Deselect and return to the select tool.
    Cancel,
    SetTool(Tool),
    ToggleGrid,
    ToggleRuler,
    ZoomIn,
    ZoomOut,
}

/// The pointer interaction in progress. At most one is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    /// No button held.
    #[default]
    Idle,
    /// Hand tool drag; `last` is the previous device position.
    Panning { last: Point },
    /// Dragging a handle of region `id`.
    Resizing {
        id: String,
        handle: Handle,
        original: Coordinates,
    },
    /// Dragging region `id` as a whole.
    Moving {
        id: String,
        start: Point,
        original: Coordinates,
    },
    /// Rectangle tool drag, in image coordinates.
    Drawing { start: Point, current: Point },
}

impl Interaction {
    /// Check if a drag is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, Interaction::Idle)
    }

    /// Get the display name of the interaction, for logging and cursors.
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Panning { .. } => "panning",
            Interaction::Resizing { .. } => "resizing",
            Interaction::Moving { .. } => "moving",
            Interaction::Drawing { .. } => "drawing",
        }
    }
}

/// Cursor the host should show for the current tool and interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Grab,
    Pointer,
    Move,
    Crosshair,
}

/// Pick the cursor for `tool` while `interaction` is active.
pub fn cursor_style(tool: Tool, interaction: &Interaction) -> CursorStyle {
    match interaction {
        Interaction::Panning { .. } => CursorStyle::Grab,
        Interaction::Resizing { .. } => CursorStyle::Pointer,
        Interaction::Moving { .. } => CursorStyle::Move,
        _ => match tool {
            Tool::Hand => CursorStyle::Grab,
            Tool::Select | Tool::Move => CursorStyle::Pointer,
            Tool::Rectangle => CursorStyle::Crosshair,
        },
    }
}
