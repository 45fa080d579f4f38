#![forbid(unsafe_code)]

//! Render snapshots handed to the view layer.

use modalkit_core::ModalId;

use crate::instance::InstancePhase;

/// Backdrop element of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackdropFrame {
    /// Fade state; follows the dialog's shown flag.
    pub shown: bool,
    /// Clicks shake instead of closing.
    pub is_static: bool,
}

/// Everything the view layer needs to draw one modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalFrame<V> {
    /// Reconciliation key.
    pub id: ModalId,
    /// Stacking index; strictly increasing with open order.
    pub z_index: u32,
    pub phase: InstancePhase,
    /// Apply the "shown" transition state.
    pub shown: bool,
    /// Apply the static-backdrop shake feedback.
    pub shaking: bool,
    /// `None` when the backdrop is disabled.
    pub backdrop: Option<BackdropFrame>,
    /// Space-separated size/layout variant classes.
    pub dialog_classes: String,
    /// Autofocus hint.
    pub autofocus: bool,
    pub content: V,
}

impl<V> ModalFrame<V> {
    /// Whether this frame is rendering its exit transition.
    pub fn is_closing(&self) -> bool {
        self.phase == InstancePhase::Closing
    }
}
