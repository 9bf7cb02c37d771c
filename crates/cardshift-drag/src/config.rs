#![forbid(unsafe_code)]

//! Drag tuning.
//!
//! [`DragConfig`] gathers every threshold, interval, and animation choice the
//! controller uses. All fields have defaults, so a config file only needs the
//! keys it changes. Durations are written as integer milliseconds.
//!
//! # Example
//!
//! ```toml
//! drag_threshold = 6.0
//! swap_cooldown = 150
//! link_modifiers = "CTRL"
//!
//! [shift_easing]
//! kind = "spring"
//! stiffness = 260.0
//! damping = 20.0
//!
//! [layout]
//! full_width_ratio = 0.8
//! ```

use std::time::Duration;

use cardshift_core::animation::Easing;
use cardshift_core::event::Modifiers;
use cardshift_layout::LayoutConfig;
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use std::path::Path;

/// How placement is recomputed while reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderStrategy {
    /// Swap past neighbor centers in single-column layouts; grids always
    /// use nearest-slot insertion.
    #[default]
    CenterSwap,
    /// Nearest-slot insertion everywhere.
    Insertion,
}

/// Tunables for [`DragController`](crate::DragController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer travel (Euclidean) before a press becomes a drag.
    pub drag_threshold: f64,
    /// Minimum time between two accepted swaps.
    #[serde(with = "duration_ms")]
    pub swap_cooldown: Duration,
    /// Placement is recomputed at most this often.
    #[serde(with = "duration_ms")]
    pub swap_check_interval: Duration,
    /// Start delay between consecutive displaced neighbors.
    #[serde(with = "duration_ms")]
    pub stagger_step: Duration,
    /// Duration of a neighbor's slide into its new slot.
    #[serde(with = "duration_ms")]
    pub shift_duration: Duration,
    /// Duration of the dragged card's settle or snap back.
    #[serde(with = "duration_ms")]
    pub snap_back_duration: Duration,
    /// Wait after release before per-card transforms are cleared.
    #[serde(with = "duration_ms")]
    pub settle_delay: Duration,
    pub shift_easing: Easing,
    pub snap_easing: Easing,
    /// When false, drops snap back instead of committing.
    pub reorder_enabled: bool,
    /// Freeze the layout width for the duration of a drag.
    pub lock_layout_width: bool,
    pub reorder_strategy: ReorderStrategy,
    /// Any of these held at drag start (or toggled mid-drag) selects link mode.
    pub link_modifiers: Modifiers,
    pub layout: LayoutConfig,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            swap_cooldown: Duration::from_millis(120),
            swap_check_interval: Duration::from_millis(16),
            stagger_step: Duration::from_millis(12),
            shift_duration: Duration::from_millis(220),
            snap_back_duration: Duration::from_millis(200),
            settle_delay: Duration::from_millis(150),
            shift_easing: Easing::EaseOutBack,
            snap_easing: Easing::EaseOutCubic,
            reorder_enabled: true,
            lock_layout_width: true,
            reorder_strategy: ReorderStrategy::CenterSwap,
            link_modifiers: Modifiers::CTRL | Modifiers::SUPER,
            layout: LayoutConfig::default(),
        }
    }
}

impl DragConfig {
    #[must_use]
    pub fn drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold;
        self
    }

    #[must_use]
    pub fn swap_cooldown(mut self, cooldown: Duration) -> Self {
        self.swap_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn swap_check_interval(mut self, interval: Duration) -> Self {
        self.swap_check_interval = interval;
        self
    }

    #[must_use]
    pub fn stagger_step(mut self, step: Duration) -> Self {
        self.stagger_step = step;
        self
    }

    #[must_use]
    pub fn shift_duration(mut self, duration: Duration) -> Self {
        self.shift_duration = duration;
        self
    }

    #[must_use]
    pub fn snap_back_duration(mut self, duration: Duration) -> Self {
        self.snap_back_duration = duration;
        self
    }

    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn shift_easing(mut self, easing: Easing) -> Self {
        self.shift_easing = easing;
        self
    }

    #[must_use]
    pub fn snap_easing(mut self, easing: Easing) -> Self {
        self.snap_easing = easing;
        self
    }

    #[must_use]
    pub fn reorder_enabled(mut self, enabled: bool) -> Self {
        self.reorder_enabled = enabled;
        self
    }

    #[must_use]
    pub fn lock_layout_width(mut self, lock: bool) -> Self {
        self.lock_layout_width = lock;
        self
    }

    #[must_use]
    pub fn reorder_strategy(mut self, strategy: ReorderStrategy) -> Self {
        self.reorder_strategy = strategy;
        self
    }

    #[must_use]
    pub fn link_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.link_modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.drag_threshold.is_finite() && self.drag_threshold > 0.0) {
            errors.push(format!(
                "drag_threshold must be > 0 (got {})",
                self.drag_threshold
            ));
        }
        if self.swap_cooldown.is_zero() {
            errors.push("swap_cooldown must be > 0 ms".to_string());
        }
        if self.link_modifiers.is_empty() {
            errors.push("link_modifiers must name at least one modifier".to_string());
        }
        for (name, easing) in [
            ("shift_easing", self.shift_easing),
            ("snap_easing", self.snap_easing),
        ] {
            if let Easing::Spring { stiffness, damping } = easing
                && !(stiffness > 0.0 && damping >= 0.0)
            {
                errors.push(format!(
                    "{name} spring needs stiffness > 0 and damping >= 0 (got {stiffness}, {damping})"
                ));
            }
        }
        errors.extend(self.layout.validate());

        errors
    }

    /// `self` if valid, otherwise every validation error.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a drag configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
