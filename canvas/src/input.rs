//! Input model: the keys and buttons the canvas reacts to.
//!
//! Pointer clicks pick a preview cell; Enter places the preview and Escape
//! drops it. Everything else is ignored by the engine.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` index.
    #[must_use]
    pub fn from_dom(index: i16) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A keyboard key relevant to placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    /// Any other key, by its browser name.
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(name: &str) -> Self {
        match name {
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            other => Self::Other(other.to_owned()),
        }
    }
}
