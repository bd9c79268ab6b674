#![forbid(unsafe_code)]

//! Core geometry for the collage layout engine.
//!
//! - [`geometry`]: axis-aligned rectangles and the strict overlap test.
//! - [`grid`]: quantization of coordinates and extents to a fixed step.

pub mod geometry;
pub mod grid;

pub use geometry::{Rect, overlaps};
pub use grid::{DEFAULT_GRID_STEP, GridSnap};
