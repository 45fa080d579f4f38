#![forbid(unsafe_code)]

//! Presentation timing policy for modal transitions.
//!
//! Three delays drive every modal:
//!
//! | field | default | purpose |
//! |-------|---------|---------|
//! | `reveal_delay` | 10 ms | hidden → shown after mount, so the fade-in runs |
//! | `shake_duration` | 300 ms | length of the static-backdrop shake pulse |
//! | `close_grace` | 200 ms | logical close → removal, for the exit transition |
//!
//! These are tuning values, not correctness contracts. With the
//! `policy-config` feature they can be loaded from TOML or JSON:
//!
//! ```toml
//! reveal_delay_ms = 10
//! shake_duration_ms = 300
//! close_grace_ms = 200
//! ```
//!
//! Missing keys keep their defaults; unknown keys are rejected.

use web_time::Duration;

/// Default delay between mount and the shown state.
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(10);
/// Default static-backdrop shake pulse length.
pub const DEFAULT_SHAKE_DURATION: Duration = Duration::from_millis(300);
/// Default grace period between close and removal.
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_millis(200);

/// Modal transition timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalTimings {
    pub reveal_delay: Duration,
    pub shake_duration: Duration,
    pub close_grace: Duration,
}

impl Default for ModalTimings {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            shake_duration: DEFAULT_SHAKE_DURATION,
            close_grace: DEFAULT_CLOSE_GRACE,
        }
    }
}

impl ModalTimings {
    /// Default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// All delays zero: transitions complete on the next tick.
    ///
    /// Suitable for reduced-motion preferences and headless hosts.
    pub const fn instant() -> Self {
        Self {
            reveal_delay: Duration::ZERO,
            shake_duration: Duration::ZERO,
            close_grace: Duration::ZERO,
        }
    }

    /// Set the reveal delay.
    #[must_use]
    pub fn reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Set the shake pulse duration.
    #[must_use]
    pub fn shake_duration(mut self, duration: Duration) -> Self {
        self.shake_duration = duration;
        self
    }

    /// Set the close grace period.
    #[must_use]
    pub fn close_grace(mut self, grace: Duration) -> Self {
        self.close_grace = grace;
        self
    }
}

#[cfg(feature = "policy-config")]
mod policy {
    use super::ModalTimings;
    use serde::Deserialize;
    use std::fmt;
    use std::path::{Path, PathBuf};
    use web_time::Duration;

    /// Error loading a timing policy file.
    #[derive(Debug)]
    pub enum ConfigError {
        /// The file could not be read.
        Io(std::io::Error),
        /// The TOML document was malformed or had unknown keys.
        Toml(toml::de::Error),
        /// The JSON document was malformed or had unknown keys.
        Json(serde_json::Error),
        /// The file extension was neither `.toml` nor `.json`.
        UnknownFormat(PathBuf),
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Io(err) => write!(f, "failed to read timing policy: {err}"),
                Self::Toml(err) => write!(f, "invalid TOML timing policy: {err}"),
                Self::Json(err) => write!(f, "invalid JSON timing policy: {err}"),
                Self::UnknownFormat(path) => {
                    write!(f, "unsupported timing policy format: {}", path.display())
                }
            }
        }
    }

    impl std::error::Error for ConfigError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Io(err) => Some(err),
                Self::Toml(err) => Some(err),
                Self::Json(err) => Some(err),
                Self::UnknownFormat(_) => None,
            }
        }
    }

    /// On-disk shape of [`ModalTimings`].
    #[derive(Debug, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct TimingsFile {
        reveal_delay_ms: u64,
        shake_duration_ms: u64,
        close_grace_ms: u64,
    }

    impl Default for TimingsFile {
        fn default() -> Self {
            let defaults = ModalTimings::default();
            Self {
                reveal_delay_ms: millis(defaults.reveal_delay),
                shake_duration_ms: millis(defaults.shake_duration),
                close_grace_ms: millis(defaults.close_grace),
            }
        }
    }

    fn millis(d: Duration) -> u64 {
        u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
    }

    impl From<TimingsFile> for ModalTimings {
        fn from(file: TimingsFile) -> Self {
            Self {
                reveal_delay: Duration::from_millis(file.reveal_delay_ms),
                shake_duration: Duration::from_millis(file.shake_duration_ms),
                close_grace: Duration::from_millis(file.close_grace_ms),
            }
        }
    }

    impl ModalTimings {
        /// Parse a TOML timing policy.
        pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
            let file: TimingsFile = toml::from_str(src).map_err(ConfigError::Toml)?;
            Ok(file.into())
        }

        /// Parse a JSON timing policy.
        pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
            let file: TimingsFile = serde_json::from_str(src).map_err(ConfigError::Json)?;
            Ok(file.into())
        }

        /// Load a policy file, choosing the format by extension.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let src = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
            let timings = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => Self::from_toml_str(&src)?,
                Some("json") => Self::from_json_str(&src)?,
                _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
            };
            tracing::debug!(path = %path.display(), ?timings, "loaded modal timing policy");
            Ok(timings)
        }
    }
}

#[cfg(feature = "policy-config")]
pub use policy::ConfigError;
