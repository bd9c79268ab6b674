#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle on the collage canvas.
///
/// Uses canvas coordinates (origin at the container's top-left). The covered
/// area is the half-open box `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in canvas units.
    pub width: u32,
    /// Height in canvas units.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Area in square canvas units.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the open interiors of `self` and `other` intersect.
    ///
    /// Rectangles that only share an edge or a corner do not overlap. A
    /// rectangle with positive extent always overlaps itself.
    #[inline]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Return a copy moved to `(x, y)`, keeping the size.
    #[inline]
    #[must_use]
    pub const fn with_position(self, x: u32, y: u32) -> Self {
        Self::new(x, y, self.width, self.height)
    }
}

/// Free-function form of [`Rect::overlaps`].
#[inline]
pub const fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.overlaps(b)
}
