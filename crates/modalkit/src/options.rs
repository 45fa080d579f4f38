#![forbid(unsafe_code)]

//! Per-modal configuration captured at open time.
//!
//! A [`ModalOptions`] value is snapshotted into the modal entry by
//! [`ModalStack::open`](crate::ModalStack::open) and never changes afterwards.
//!
//! With the `serde` feature the options (de)serialize with camelCase keys and
//! the backdrop accepts `true`, `false` or `"static"`:
//!
//! ```json
//! { "backdrop": "static", "keyboard": true, "size": "lg", "modalClassName": "wide" }
//! ```

/// Backdrop behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backdrop {
    /// Backdrop is rendered; clicking it closes the modal.
    #[default]
    Dismiss,
    /// Backdrop is rendered; clicking it shakes the dialog and never closes.
    Static,
    /// No backdrop is rendered, so there is no backdrop-click path at all.
    Disabled,
}

impl Backdrop {
    /// Whether a backdrop element is rendered.
    pub const fn is_rendered(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// Size variant of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ModalSize {
    Sm,
    Lg,
    Xl,
    Fullscreen,
}

impl ModalSize {
    /// Visual class for this size variant.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Sm => "modal-sm",
            Self::Lg => "modal-lg",
            Self::Xl => "modal-xl",
            Self::Fullscreen => "modal-fullscreen",
        }
    }
}

/// Modal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct ModalOptions {
    pub backdrop: Backdrop,
    /// Escape closes the modal.
    pub keyboard: bool,
    /// Autofocus hint forwarded to the view layer.
    pub focus: bool,
    pub size: Option<ModalSize>,
    pub centered: bool,
    pub scrollable: bool,
    pub fullscreen: bool,
    pub modal_class_name: Option<String>,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            backdrop: Backdrop::Dismiss,
            keyboard: false,
            focus: true,
            size: None,
            centered: false,
            scrollable: false,
            fullscreen: false,
            modal_class_name: None,
        }
    }
}

impl ModalOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn backdrop(mut self, backdrop: Backdrop) -> Self {
        self.backdrop = backdrop;
        self
    }

    #[must_use]
    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    #[must_use]
    pub fn focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    #[must_use]
    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    #[must_use]
    pub fn scrollable(mut self, scrollable: bool) -> Self {
        self.scrollable = scrollable;
        self
    }

    #[must_use]
    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    #[must_use]
    pub fn modal_class_name(mut self, class: impl Into<String>) -> Self {
        self.modal_class_name = Some(class.into());
        self
    }

    /// Space-separated visual variant classes for the dialog element.
    ///
    /// Order: caller class, centering, size, scrolling, fullscreen. Empty
    /// and duplicate entries are skipped.
    pub fn dialog_classes(&self) -> String {
        let mut classes: Vec<&str> = Vec::with_capacity(5);
        if let Some(class) = self.modal_class_name.as_deref()
            && !class.trim().is_empty()
        {
            classes.push(class.trim());
        }
        if self.centered {
            classes.push("modal-dialog-centered");
        }
        if let Some(size) = self.size {
            classes.push(size.class_name());
        }
        if self.scrollable {
            classes.push("modal-dialog-scrollable");
        }
        if self.fullscreen && self.size != Some(ModalSize::Fullscreen) {
            classes.push(ModalSize::Fullscreen.class_name());
        }
        classes.join(" ")
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::Backdrop;
    use serde::de::{self, Deserializer, Unexpected};
    use serde::{Deserialize, Serialize, Serializer};

    impl Serialize for Backdrop {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Dismiss => serializer.serialize_bool(true),
                Self::Disabled => serializer.serialize_bool(false),
                Self::Static => serializer.serialize_str("static"),
            }
        }
    }

    impl<'de> Deserialize<'de> for Backdrop {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Repr {
                Flag(bool),
                Mode(String),
            }

            match Repr::deserialize(deserializer)? {
                Repr::Flag(true) => Ok(Self::Dismiss),
                Repr::Flag(false) => Ok(Self::Disabled),
                Repr::Mode(mode) if mode == "static" => Ok(Self::Static),
                Repr::Mode(other) => Err(de::Error::invalid_value(
                    Unexpected::Str(&other),
                    &r#"true, false or "static""#,
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ModalOptions::default();
        assert_eq!(opts.backdrop, Backdrop::Dismiss);
        assert!(!opts.keyboard);
        assert!(opts.focus);
        assert_eq!(opts.size, None);
        assert_eq!(opts.dialog_classes(), "");
    }

    #[test]
    fn builder_sets_every_field() {
        let opts = ModalOptions::new()
            .backdrop(Backdrop::Static)
            .keyboard(true)
            .focus(false)
            .fullscreen(true);
        assert_eq!(
            opts,
            ModalOptions {
                backdrop: Backdrop::Static,
                keyboard: true,
                focus: false,
                fullscreen: true,
                ..ModalOptions::default()
            }
        );
    }

    #[test]
    fn dialog_classes_order() {
        let opts = ModalOptions::new()
            .modal_class_name("confirm")
            .centered(true)
            .size(ModalSize::Lg)
            .scrollable(true);
        assert_eq!(
            opts.dialog_classes(),
            "confirm modal-dialog-centered modal-lg modal-dialog-scrollable"
        );
    }

    #[test]
    fn fullscreen_flag_not_duplicated() {
        let both = ModalOptions::new()
            .size(ModalSize::Fullscreen)
            .fullscreen(true);
        assert_eq!(both.dialog_classes(), "modal-fullscreen");

        let flag_only = ModalOptions::new().size(ModalSize::Sm).fullscreen(true);
        assert_eq!(flag_only.dialog_classes(), "modal-sm modal-fullscreen");
    }

    #[test]
    fn blank_class_name_skipped() {
        let opts = ModalOptions::new().modal_class_name("  ").centered(true);
        assert_eq!(opts.dialog_classes(), "modal-dialog-centered");
    }

    #[test]
    fn backdrop_rendering() {
        assert!(Backdrop::Dismiss.is_rendered());
        assert!(Backdrop::Static.is_rendered());
        assert!(!Backdrop::Disabled.is_rendered());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_backdrop_forms() {
        let opts: ModalOptions = serde_json::from_str(
            r#"{"backdrop":"static","keyboard":true,"size":"xl","modalClassName":"wide"}"#,
        )
        .unwrap();
        assert_eq!(opts.backdrop, Backdrop::Static);
        assert!(opts.keyboard);
        assert_eq!(opts.size, Some(ModalSize::Xl));
        assert_eq!(opts.modal_class_name.as_deref(), Some("wide"));

        let off: ModalOptions = serde_json::from_str(r#"{"backdrop":false}"#).unwrap();
        assert_eq!(off.backdrop, Backdrop::Disabled);

        let json = serde_json::to_value(ModalOptions::default()).unwrap();
        assert_eq!(json["backdrop"], serde_json::json!(true));

        assert!(serde_json::from_str::<ModalOptions>(r#"{"backdrop":"sticky"}"#).is_err());
    }
}
