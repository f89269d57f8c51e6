//! Customizable keybindings for the editor.
//!
//! Tool and label hotkeys are configurable; the editing keys (Escape, Enter,
//! Delete, undo/redo and zoom) are fixed.

use serde::{Deserialize, Serialize};

use crate::tools::ToolKind;

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Escape,
    Enter,
    Delete,
    Backspace,
    Space,
    Tab,
    Minus,
    Equal,
    Plus,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };

    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        shift: true,
        alt: false,
    };
}

/// What a key press asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    SelectTool(ToolKind),
    /// Select the label at this position in the palette.
    SelectLabel(usize),
    /// Drop the current draft or drag, or clear the selection.
    Cancel,
    /// Finish the current multi-step gesture.
    Finish,
    DeleteSelected,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// Maximum number of labels that can have hotkeys (1-9 keys).
pub const MAX_LABEL_HOTKEYS: usize = 9;

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub tool_move: KeyCode,
    pub tool_rectangle: KeyCode,
    pub tool_line: KeyCode,
    pub tool_brush: KeyCode,
    pub tool_path: KeyCode,
    pub tool_pen: KeyCode,
    pub tool_text: KeyCode,
    pub tool_point: KeyCode,
    pub tool_skeleton: KeyCode,

    /// Hotkeys for label selection (indices 0-8 map to labels 1-9)
    /// None means no hotkey assigned for that slot
    pub label_hotkeys: [Option<KeyCode>; MAX_LABEL_HOTKEYS],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_move: KeyCode::V,
            tool_rectangle: KeyCode::R,
            tool_line: KeyCode::L,
            tool_brush: KeyCode::B,
            tool_path: KeyCode::F,
            tool_pen: KeyCode::P,
            tool_text: KeyCode::T,
            tool_point: KeyCode::K,
            tool_skeleton: KeyCode::S,

            label_hotkeys: [
                Some(KeyCode::Key1),
                Some(KeyCode::Key2),
                Some(KeyCode::Key3),
                Some(KeyCode::Key4),
                Some(KeyCode::Key5),
                Some(KeyCode::Key6),
                Some(KeyCode::Key7),
                Some(KeyCode::Key8),
                Some(KeyCode::Key9),
            ],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a key press to an action, if it is bound to one.
    pub fn action_for(&self, key: KeyCode, modifiers: Modifiers) -> Option<EditorAction> {
        if modifiers.ctrl {
            return match key {
                KeyCode::Z if modifiers.shift => Some(EditorAction::Redo),
                KeyCode::Z => Some(EditorAction::Undo),
                KeyCode::Y => Some(EditorAction::Redo),
                _ => None,
            };
        }
        if modifiers.alt {
            return None;
        }

        match key {
            KeyCode::Escape => return Some(EditorAction::Cancel),
            KeyCode::Enter => return Some(EditorAction::Finish),
            KeyCode::Delete | KeyCode::Backspace => return Some(EditorAction::DeleteSelected),
            KeyCode::Plus | KeyCode::Equal => return Some(EditorAction::ZoomIn),
            KeyCode::Minus => return Some(EditorAction::ZoomOut),
            KeyCode::Key0 => return Some(EditorAction::ZoomReset),
            _ => {}
        }

        self.tool_for_key(key)
            .map(EditorAction::SelectTool)
            .or_else(|| self.label_index_for_key(key).map(EditorAction::SelectLabel))
    }

    /// Get the tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, key: KeyCode) -> Option<ToolKind> {
        ToolKind::all()
            .iter()
            .copied()
            .find(|tool| self.key_for_tool(*tool) == key)
    }

    /// Get the label index (0-based) that corresponds to a key press, if any.
    pub fn label_index_for_key(&self, key: KeyCode) -> Option<usize> {
        self.label_hotkeys
            .iter()
            .position(|hotkey| *hotkey == Some(key))
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: ToolKind) -> KeyCode {
        match tool {
            ToolKind::Move => self.tool_move,
            ToolKind::Rectangle => self.tool_rectangle,
            ToolKind::Line => self.tool_line,
            ToolKind::Brush => self.tool_brush,
            ToolKind::Path => self.tool_path,
            ToolKind::Pen => self.tool_pen,
            ToolKind::Text => self.tool_text,
            ToolKind::Point => self.tool_point,
            ToolKind::Skeleton => self.tool_skeleton,
        }
    }

    /// Set the hotkey for a tool.
    pub fn set_tool_key(&mut self, tool: ToolKind, key: KeyCode) {
        let slot = match tool {
            ToolKind::Move => &mut self.tool_move,
            ToolKind::Rectangle => &mut self.tool_rectangle,
            ToolKind::Line => &mut self.tool_line,
            ToolKind::Brush => &mut self.tool_brush,
            ToolKind::Path => &mut self.tool_path,
            ToolKind::Pen => &mut self.tool_pen,
            ToolKind::Text => &mut self.tool_text,
            ToolKind::Point => &mut self.tool_point,
            ToolKind::Skeleton => &mut self.tool_skeleton,
        };
        *slot = key;
    }

    /// Set the hotkey for a label index.
    pub fn set_label_key(&mut self, index: usize, key: Option<KeyCode>) {
        if index < MAX_LABEL_HOTKEYS {
            self.label_hotkeys[index] = key;
        }
    }

    /// Check if a key is already used by any binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: KeyCode, exclude_tool: Option<ToolKind>) -> Option<String> {
        if is_reserved(key) {
            return Some(format!("{} (reserved)", key_to_string(key)));
        }
        if let Some(tool) = ToolKind::all()
            .iter()
            .copied()
            .filter(|tool| Some(*tool) != exclude_tool)
            .find(|tool| self.key_for_tool(*tool) == key)
        {
            return Some(format!("{} tool", tool.name()));
        }
        self.label_index_for_key(key)
            .map(|i| format!("Label {}", i + 1))
    }
}

/// Keys with a fixed meaning that cannot be rebound.
fn is_reserved(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::Escape
            | KeyCode::Enter
            | KeyCode::Delete
            | KeyCode::Backspace
            | KeyCode::Plus
            | KeyCode::Equal
            | KeyCode::Minus
            | KeyCode::Key0
    )
}

/// Convert a KeyCode to a display string.
pub fn key_to_string(key: KeyCode) -> &'static str {
    match key {
        KeyCode::A => "A",
        KeyCode::B => "B",
        KeyCode::C => "C",
        KeyCode::D => "D",
        KeyCode::E => "E",
        KeyCode::F => "F",
        KeyCode::G => "G",
        KeyCode::H => "H",
        KeyCode::I => "I",
        KeyCode::J => "J",
        KeyCode::K => "K",
        KeyCode::L => "L",
        KeyCode::M => "M",
        KeyCode::N => "N",
        KeyCode::O => "O",
        KeyCode::P => "P",
        KeyCode::Q => "Q",
        KeyCode::R => "R",
        KeyCode::S => "S",
        KeyCode::T => "T",
        KeyCode::U => "U",
        KeyCode::V => "V",
        KeyCode::W => "W",
        KeyCode::X => "X",
        KeyCode::Y => "Y",
        KeyCode::Z => "Z",
        KeyCode::Key0 => "0",
        KeyCode::Key1 => "1",
        KeyCode::Key2 => "2",
        KeyCode::Key3 => "3",
        KeyCode::Key4 => "4",
        KeyCode::Key5 => "5",
        KeyCode::Key6 => "6",
        KeyCode::Key7 => "7",
        KeyCode::Key8 => "8",
        KeyCode::Key9 => "9",
        KeyCode::Escape => "Esc",
        KeyCode::Enter => "Enter",
        KeyCode::Delete => "Del",
        KeyCode::Backspace => "Backspace",
        KeyCode::Space => "Space",
        KeyCode::Tab => "Tab",
        KeyCode::Minus => "-",
        KeyCode::Equal => "=",
        KeyCode::Plus => "+",
    }
}

/// Convert an optional KeyCode to a display string.
pub fn optional_key_to_string(key: Option<KeyCode>) -> &'static str {
    match key {
        Some(k) => key_to_string(k),
        None => "-",
    }
}
