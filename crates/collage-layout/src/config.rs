//! Layout tunables as data.
//!
//! Every ceiling, the grid step, and the size floor live in one
//! [`LayoutConfig`]. `LayoutConfig::default()` reproduces the stock
//! behavior, so callers only override what they need.
//!
//! ```toml
//! # collage.toml
//! grid_step = 20
//! snap_enabled = true
//! min_size = 30
//!
//! [canvas]
//! width = 1200
//! height = 800
//! ```
//!
//! ```rust,ignore
//! let config = LayoutConfig::from_toml_file("collage.toml")?;
//! let config = LayoutConfig::from_json_str(json)?;
//! ```

use std::fmt;
#[cfg(feature = "layout-config")]
use std::path::Path;

use collage_core::grid::{DEFAULT_GRID_STEP, GridSnap};
use serde::{Deserialize, Serialize};

/// Smallest width or height a resize may leave behind.
pub const DEFAULT_MIN_SIZE: u32 = 30;
/// Step ceiling for the downward placement search.
pub const DEFAULT_PLACEMENT_MAX_STEPS: u32 = 500;
/// Step ceiling for a single nudge.
pub const DEFAULT_NUDGE_MAX_STEPS: u32 = 200;
/// Pass ceiling for one resolve run.
pub const DEFAULT_RESOLVE_MAX_PASSES: u32 = 500;
/// Seed for provisional spawn positions.
pub const DEFAULT_SPAWN_SEED: u64 = 0x5EED;

/// Container size. Only a rendering bound: the layout algorithms never clamp
/// to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn square() -> Self {
        Self::new(1000, 1000)
    }

    #[must_use]
    pub const fn landscape() -> Self {
        Self::new(1200, 800)
    }

    #[must_use]
    pub const fn portrait() -> Self {
        Self::new(800, 1200)
    }

    /// Look up a named preset.
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "square" => Some(Self::square()),
            "landscape" => Some(Self::landscape()),
            "portrait" => Some(Self::portrait()),
            _ => None,
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::landscape()
    }
}

/// Top-level layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Quantization unit and placement/nudge increment.
    pub grid_step: u32,
    /// Global snapping toggle.
    pub snap_enabled: bool,
    /// Width/height floor for resize sessions.
    pub min_size: u32,
    pub placement_max_steps: u32,
    pub nudge_max_steps: u32,
    pub resolve_max_passes: u32,
    pub canvas: CanvasSize,
    /// Seed for the provisional spawn position stream.
    pub spawn_seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            snap_enabled: true,
            min_size: DEFAULT_MIN_SIZE,
            placement_max_steps: DEFAULT_PLACEMENT_MAX_STEPS,
            nudge_max_steps: DEFAULT_NUDGE_MAX_STEPS,
            resolve_max_passes: DEFAULT_RESOLVE_MAX_PASSES,
            canvas: CanvasSize::default(),
            spawn_seed: DEFAULT_SPAWN_SEED,
        }
    }
}

impl LayoutConfig {
    /// Load from a TOML string.
    #[cfg(feature = "layout-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, LayoutConfigError> {
        let config: Self = toml::from_str(s).map_err(LayoutConfigError::Toml)?;
        config.into_validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "layout-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LayoutConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LayoutConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "layout-config")]
    pub fn from_json_str(s: &str) -> Result<Self, LayoutConfigError> {
        let config: Self = serde_json::from_str(s).map_err(LayoutConfigError::Json)?;
        config.into_validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "layout-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LayoutConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(LayoutConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.grid_step == 0 {
            errors.push("grid_step must be > 0".into());
        }
        if self.min_size == 0 {
            errors.push("min_size must be > 0".into());
        }
        if self.placement_max_steps == 0 {
            errors.push("placement_max_steps must be > 0".into());
        }
        if self.nudge_max_steps == 0 {
            errors.push("nudge_max_steps must be > 0".into());
        }
        if self.resolve_max_passes == 0 {
            errors.push("resolve_max_passes must be > 0".into());
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            errors.push(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            ));
        }

        errors
    }

    /// Return `self` if valid, otherwise every validation message.
    pub fn into_validated(self) -> Result<Self, LayoutConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(LayoutConfigError::Validation(errors))
        }
    }

    /// The snap function these settings select.
    #[must_use]
    pub fn grid(&self) -> GridSnap {
        GridSnap::new(self.grid_step, self.snap_enabled)
    }

    /// Algorithm parameters derived from this config.
    #[must_use]
    pub fn rules(&self) -> LayoutRules {
        LayoutRules {
            grid: self.grid(),
            min_size: self.min_size.max(1),
            placement_max_steps: self.placement_max_steps,
            nudge_max_steps: self.nudge_max_steps,
            resolve_max_passes: self.resolve_max_passes,
        }
    }
}

/// Parameters threaded through placement, nudging, resolving, and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRules {
    pub grid: GridSnap,
    pub min_size: u32,
    pub placement_max_steps: u32,
    pub nudge_max_steps: u32,
    pub resolve_max_passes: u32,
}

impl Default for LayoutRules {
    fn default() -> Self {
        LayoutConfig::default().rules()
    }
}

impl LayoutRules {
    /// Same rules with snapping toggled.
    #[must_use]
    pub fn with_snap_enabled(self, enabled: bool) -> Self {
        Self {
            grid: self.grid.with_enabled(enabled),
            ..self
        }
    }
}

/// Errors from loading a layout configuration.
#[derive(Debug)]
pub enum LayoutConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "layout-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "layout-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for LayoutConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "layout config I/O error: {error}"),
            #[cfg(feature = "layout-config")]
            Self::Toml(error) => write!(f, "layout config TOML error: {error}"),
            #[cfg(feature = "layout-config")]
            Self::Json(error) => write!(f, "layout config JSON error: {error}"),
            Self::Validation(errors) => {
                write!(f, "layout config validation failed: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for LayoutConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            #[cfg(feature = "layout-config")]
            Self::Toml(error) => Some(error),
            #[cfg(feature = "layout-config")]
            Self::Json(error) => Some(error),
            Self::Validation(_) => None,
        }
    }
}
