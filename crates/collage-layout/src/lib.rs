#![forbid(unsafe_code)]

//! Layout engine for collage pieces.
//!
//! Pieces are axis-aligned rectangles kept pairwise non-overlapping on a
//! best-effort basis:
//!
//! - [`placement`] steps a new piece downward until it is clear.
//! - [`nudge`] pushes one piece along one axis until it is clear.
//! - [`resolve`] repeatedly scans every pair and nudges offenders until a
//!   pass finds nothing, within a fixed pass ceiling.
//! - [`session`] turns pointer input into drag/resize proposals and
//!   re-resolves after each step.
//! - [`board`] owns the ordered piece sequence and funnels every write
//!   through the pipeline above.
//!
//! All iteration is bounded by the ceilings in [`LayoutConfig`]. Hitting a
//! ceiling is never an error: the best geometry found so far is committed.

pub mod board;
pub mod config;
pub mod nudge;
pub mod piece;
pub mod placement;
pub mod resolve;
pub mod session;
pub mod trace;
pub mod upload;

pub use board::{Board, BoardObserver, Insertion};
pub use collage_core::geometry::{Rect, overlaps};
pub use collage_core::grid::{DEFAULT_GRID_STEP, GridSnap};
pub use config::{
    CanvasSize, DEFAULT_MIN_SIZE, DEFAULT_NUDGE_MAX_STEPS, DEFAULT_PLACEMENT_MAX_STEPS,
    DEFAULT_RESOLVE_MAX_PASSES, LayoutConfig, LayoutConfigError, LayoutRules,
};
pub use nudge::{NudgeDirection, NudgeOutcome, nudge};
pub use piece::{ColorValue, ImageRef, Piece, PieceContent, PieceId, PieceIdError, PieceKind};
pub use placement::{PlacementOutcome, place};
pub use resolve::{ResolveReport, is_overlap_free, overlapping_pairs, resolve_all, resolve_in_place};
pub use session::{
    CancelReason, InteractionEvent, InteractionSession, PointerOffset, PointerPosition,
    ResizeEdge, SessionEffect, SessionNoopReason, SessionState, SessionTransition, drag_position,
    resize_rect,
};
pub use trace::{
    BoardCommand, CommandOutcome, INTERACTION_TRACE_SCHEMA_VERSION, InteractionTrace,
    ReplayOutcome, TraceEntry, TraceError, TraceMetadata,
};
pub use upload::{ImageFormat, UploadError, image_ref_from_bytes, read_image_file, upload_mime_type};
