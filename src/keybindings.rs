//! Keyboard shortcuts for the region editor.
//!
//! The editing shortcuts (Delete, Ctrl/Cmd+Z, Ctrl/Cmd+Y, Ctrl/Cmd+Shift+Z,
//! Ctrl/Cmd+S, Escape) are fixed. Tool, grid/ruler and zoom hotkeys are
//! single unmodified characters and can be customized.

use serde::{Deserialize, Serialize};

use crate::input::{EditorAction, Key, KeyEvent};
use crate::model::Tool;

/// Customizable single-key hotkeys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Hotkey for Select tool
    pub tool_select: char,
    /// Hotkey for Rectangle tool
    pub tool_rectangle: char,
    /// Hotkey for Move tool
    pub tool_move: char,
    /// Hotkey for Hand tool
    pub tool_hand: char,
    pub toggle_grid: char,
    pub toggle_ruler: char,
    pub zoom_in: char,
    pub zoom_out: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_select: 'v',
            tool_rectangle: 'r',
            tool_move: 'm',
            tool_hand: 'h',
            toggle_grid: 'g',
            toggle_ruler: 'u',
            zoom_in: '=',
            zoom_out: '-',
        }
    }
}

impl KeyBindings {
    /// Map a key press to an editor action, if any.
    pub fn action_for(&self, event: &KeyEvent) -> Option<EditorAction> {
        let modifiers = event.modifiers;
        match event.key {
            Key::Delete => return Some(EditorAction::DeleteSelected),
            Key::Escape => return Some(EditorAction::Cancel),
            _ => {}
        }

        let c = event.char_lowercase()?;
        if modifiers.command() {
            return match c {
                'z' if modifiers.shift => Some(EditorAction::Redo),
                'z' => Some(EditorAction::Undo),
                'y' => Some(EditorAction::Redo),
                's' => Some(EditorAction::Save),
                _ => None,
            };
        }
        if modifiers.alt {
            return None;
        }
        self.bound_action(c)
    }

    fn bound_action(&self, c: char) -> Option<EditorAction> {
        self.entries()
            .into_iter()
            .find(|(key, _)| key.to_ascii_lowercase() == c)
            .map(|(_, action)| action)
    }

    fn entries(&self) -> [(char, EditorAction); 8] {
        [
            (self.tool_select, EditorAction::SetTool(Tool::Select)),
            (self.tool_rectangle, EditorAction::SetTool(Tool::Rectangle)),
            (self.tool_move, EditorAction::SetTool(Tool::Move)),
            (self.tool_hand, EditorAction::SetTool(Tool::Hand)),
            (self.toggle_grid, EditorAction::ToggleGrid),
            (self.toggle_ruler, EditorAction::ToggleRuler),
            (self.zoom_in, EditorAction::ZoomIn),
            (self.zoom_out, EditorAction::ZoomOut),
        ]
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: Tool) -> char {
        match tool {
            Tool::Select => self.tool_select,
            Tool::Rectangle => self.tool_rectangle,
            Tool::Move => self.tool_move,
            Tool::Hand => self.tool_hand,
        }
    }

    /// Set the hotkey for a tool.
    pub fn set_tool_key(&mut self, tool: Tool, key: char) {
        match tool {
            Tool::Select => self.tool_select = key,
            Tool::Rectangle => self.tool_rectangle = key,
            Tool::Move => self.tool_move = key,
            Tool::Hand => self.tool_hand = key,
        }
    }

    /// Check if a key is already used by a binding other than `exclude`.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: char, exclude: Option<EditorAction>) -> Option<String> {
        let key = key.to_ascii_lowercase();
        self.entries()
            .into_iter()
            .filter(|(_, action)| Some(*action) != exclude)
            .find(|(bound, _)| bound.to_ascii_lowercase() == key)
            .map(|(_, action)| describe(action))
    }
}

fn describe(action: EditorAction) -> String {
    match action {
        EditorAction::SetTool(tool) => format!("{} tool", tool.name()),
        EditorAction::ToggleGrid => "Toggle grid".to_string(),
        EditorAction::ToggleRuler => "Toggle ruler".to_string(),
        EditorAction::ZoomIn => "Zoom in".to_string(),
        EditorAction::ZoomOut => "Zoom out".to_string(),
        other => format!("{:?}", other),
    }
}
