#![forbid(unsafe_code)]

//! Minimal key event model.
//!
//! The stack only cares about Escape presses, but the event carries the
//! usual code/modifiers/kind triple so hosts can forward their native key
//! events without lossy mapping.

use bitflags::bitflags;

/// Key code of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Backspace,
    /// A printable character.
    Char(char),
    /// Function key `F1`..`F24`.
    F(u8),
}

/// Press/repeat/release phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT = 0b0010;
        const CTRL = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A single key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain key press with no modifiers.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// Shorthand for an Escape press.
    pub const fn escape() -> Self {
        Self::new(KeyCode::Escape)
    }

    /// Set the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is an Escape press (releases and repeats don't count).
    pub fn is_escape_press(&self) -> bool {
        self.code == KeyCode::Escape && self.kind == KeyEventKind::Press
    }
}
