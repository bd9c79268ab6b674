#![forbid(unsafe_code)]

//! Grid quantization for positions and extents.

/// Default grid step in canvas units.
pub const DEFAULT_GRID_STEP: u32 = 20;

/// Active snap function.
///
/// When disabled, [`GridSnap::snap`] is the identity. The step is still
/// reported by [`GridSnap::step`] because probing and nudging advance by one
/// step regardless of whether values are quantized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSnap {
    step: u32,
    enabled: bool,
}

impl Default for GridSnap {
    fn default() -> Self {
        Self {
            step: DEFAULT_GRID_STEP,
            enabled: true,
        }
    }
}

impl GridSnap {
    /// Snap with the given step. A zero step behaves as disabled snapping
    /// with a step of one.
    #[must_use]
    pub const fn new(step: u32, enabled: bool) -> Self {
        if step == 0 {
            Self {
                step: 1,
                enabled: false,
            }
        } else {
            Self { step, enabled }
        }
    }

    /// Identity snapping that still advances placement by `step`.
    #[must_use]
    pub const fn disabled(step: u32) -> Self {
        Self::new(step, false)
    }

    #[must_use]
    pub const fn step(self) -> u32 {
        self.step
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Same step, snapping toggled.
    #[must_use]
    pub const fn with_enabled(self, enabled: bool) -> Self {
        Self {
            step: self.step,
            enabled,
        }
    }

    /// Round to the nearest multiple of the step (halves round up).
    #[must_use]
    pub fn snap(self, value: u32) -> u32 {
        if !self.enabled {
            return value;
        }
        let step = u64::from(self.step);
        let rounded = (u64::from(value) + step / 2) / step * step;
        u32::try_from(rounded).unwrap_or(self.max_multiple())
    }

    /// Snap a signed coordinate, clamping negatives to zero first.
    #[must_use]
    pub fn snap_signed(self, value: i64) -> u32 {
        let clamped = value.clamp(0, i64::from(u32::MAX));
        self.snap(u32::try_from(clamped).unwrap_or(u32::MAX))
    }

    /// Snap an extent while keeping it at or above `min`.
    ///
    /// If rounding would land below `min`, the next multiple at or above
    /// `min` is used instead, so the result is both aligned and floored.
    #[must_use]
    pub fn snap_extent(self, value: u32, min: u32) -> u32 {
        let floored = value.max(min);
        if !self.enabled {
            return floored;
        }
        let snapped = self.snap(floored);
        if snapped >= min {
            return snapped;
        }
        let step = u64::from(self.step);
        let ceiled = u64::from(min).div_ceil(step) * step;
        u32::try_from(ceiled).unwrap_or(self.max_multiple())
    }

    /// Whether `value` is already a multiple of the step.
    #[must_use]
    pub const fn is_aligned(self, value: u32) -> bool {
        value % self.step == 0
    }

    fn max_multiple(self) -> u32 {
        u32::MAX / self.step * self.step
    }
}
