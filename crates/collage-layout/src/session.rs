//! Drag/resize interaction sessions.
//!
//! ```text
//! Idle -> Dragging -> Idle
//!    \--> Resizing -> Idle
//! ```
//!
//! A pointer press on a piece body starts a drag, a press on one of the eight
//! resize handles starts a resize. Either press brings the piece to the front.
//! Every pointer move proposes new geometry for the active piece, snaps it,
//! and re-stabilizes the whole set with the resolver before returning.
//! Release always ends the session. Cancel ends it and restores the geometry
//! every surviving piece had when the session began.
//!
//! Only one session can be active; a second press while active is reported
//! as a no-op and otherwise ignored.

use collage_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::config::LayoutRules;
use crate::piece::{Piece, PieceId, bring_to_front, index_of};
use crate::resolve::{ResolveReport, resolve_in_place};

/// Pointer position in canvas coordinates. May lie outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Offset from a piece's top-left corner to the pointer that grabbed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerOffset {
    pub dx: i64,
    pub dy: i64,
}

/// Resize handle: four edges and four corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    /// `Some(true)` for a right-side handle, `Some(false)` for left, `None`
    /// when the handle does not touch the horizontal extent.
    #[must_use]
    const fn horizontal_edge(self) -> Option<bool> {
        match self {
            Self::Left | Self::TopLeft | Self::BottomLeft => Some(false),
            Self::Right | Self::TopRight | Self::BottomRight => Some(true),
            Self::Top | Self::Bottom => None,
        }
    }

    #[must_use]
    const fn vertical_edge(self) -> Option<bool> {
        match self {
            Self::Top | Self::TopLeft | Self::TopRight => Some(false),
            Self::Bottom | Self::BottomLeft | Self::BottomRight => Some(true),
            Self::Left | Self::Right => None,
        }
    }
}

/// Why a session ended without a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    EscapeKey,
    PointerCancel,
    FocusLost,
    Programmatic,
}

/// Pointer-level input consumed by the session machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractionEvent {
    PointerDown {
        piece: PieceId,
        #[serde(default)]
        edge: Option<ResizeEdge>,
        position: PointerPosition,
    },
    PointerMove {
        position: PointerPosition,
    },
    PointerUp {
        position: PointerPosition,
    },
    Cancel {
        reason: CancelReason,
    },
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Dragging {
        piece: PieceId,
        offset: PointerOffset,
    },
    Resizing {
        piece: PieceId,
        edge: ResizeEdge,
        initial: Rect,
        initial_pointer: PointerPosition,
    },
}

impl SessionState {
    /// Piece targeted by the active session.
    #[must_use]
    pub const fn piece(&self) -> Option<PieceId> {
        match self {
            Self::Idle => None,
            Self::Dragging { piece, .. } | Self::Resizing { piece, .. } => Some(*piece),
        }
    }
}

/// Explicit no-op diagnostics for events that are safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionNoopReason {
    IdleWithoutActiveSession,
    SessionAlreadyActive,
    MissingPiece,
}

/// Effect emitted by one session step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SessionEffect {
    DragStarted {
        piece: PieceId,
        offset: PointerOffset,
    },
    ResizeStarted {
        piece: PieceId,
        edge: ResizeEdge,
    },
    Moved {
        piece: PieceId,
        rect: Rect,
        resolve: ResolveReport,
    },
    Resized {
        piece: PieceId,
        rect: Rect,
        resolve: ResolveReport,
    },
    Released {
        piece: PieceId,
    },
    Canceled {
        piece: PieceId,
        reason: CancelReason,
    },
    Noop {
        reason: SessionNoopReason,
    },
}

impl SessionEffect {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DragStarted { .. } => "drag_started",
            Self::ResizeStarted { .. } => "resize_started",
            Self::Moved { .. } => "moved",
            Self::Resized { .. } => "resized",
            Self::Released { .. } => "released",
            Self::Canceled { .. } => "canceled",
            Self::Noop { .. } => "noop",
        }
    }

    /// Whether piece geometry was committed by this step.
    #[must_use]
    pub const fn commits_geometry(&self) -> bool {
        matches!(
            self,
            Self::Moved { .. } | Self::Resized { .. } | Self::Canceled { .. }
        )
    }
}

/// One session step with deterministic bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransition {
    pub transition_id: u64,
    pub from: SessionState,
    pub to: SessionState,
    pub effect: SessionEffect,
    /// The piece sequence was reordered (bring-to-front on press).
    pub order_changed: bool,
}

/// Runtime session machine.
///
/// Holds the session state plus the geometry snapshot used to undo a
/// canceled session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionSession {
    state: SessionState,
    baseline: Vec<(PieceId, Rect)>,
    transition_counter: u64,
}

impl InteractionSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    /// Apply one pointer event to `pieces`.
    pub fn apply(
        &mut self,
        rules: &LayoutRules,
        pieces: &mut Vec<Piece>,
        event: &InteractionEvent,
    ) -> SessionTransition {
        let from = self.state;
        let mut order_changed = false;

        let effect = match (self.state, *event) {
            (
                SessionState::Idle,
                InteractionEvent::PointerDown {
                    piece,
                    edge,
                    position,
                },
            ) => match index_of(pieces, piece) {
                None => SessionEffect::Noop {
                    reason: SessionNoopReason::MissingPiece,
                },
                Some(index) => {
                    order_changed = index + 1 != pieces.len();
                    bring_to_front(pieces, piece);
                    let rect = pieces[pieces.len() - 1].rect;
                    self.baseline = pieces.iter().map(|p| (p.id, p.rect)).collect();
                    match edge {
                        Some(edge) => {
                            self.state = SessionState::Resizing {
                                piece,
                                edge,
                                initial: rect,
                                initial_pointer: position,
                            };
                            SessionEffect::ResizeStarted { piece, edge }
                        }
                        None => {
                            let offset = PointerOffset {
                                dx: i64::from(position.x) - i64::from(rect.x),
                                dy: i64::from(position.y) - i64::from(rect.y),
                            };
                            self.state = SessionState::Dragging { piece, offset };
                            SessionEffect::DragStarted { piece, offset }
                        }
                    }
                }
            },
            (SessionState::Idle, _) => SessionEffect::Noop {
                reason: SessionNoopReason::IdleWithoutActiveSession,
            },
            (_, InteractionEvent::PointerDown { .. }) => SessionEffect::Noop {
                reason: SessionNoopReason::SessionAlreadyActive,
            },
            (SessionState::Dragging { piece, offset }, InteractionEvent::PointerMove { position }) => {
                match index_of(pieces, piece) {
                    None => SessionEffect::Noop {
                        reason: SessionNoopReason::MissingPiece,
                    },
                    Some(index) => {
                        let (x, y) = drag_position(rules, offset, position);
                        pieces[index].rect = pieces[index].rect.with_position(x, y);
                        let resolve = resolve_in_place(rules, pieces);
                        SessionEffect::Moved {
                            piece,
                            rect: pieces[index].rect,
                            resolve,
                        }
                    }
                }
            }
            (
                SessionState::Resizing {
                    piece,
                    edge,
                    initial,
                    initial_pointer,
                },
                InteractionEvent::PointerMove { position },
            ) => match index_of(pieces, piece) {
                None => SessionEffect::Noop {
                    reason: SessionNoopReason::MissingPiece,
                },
                Some(index) => {
                    pieces[index].rect = resize_rect(
                        rules,
                        pieces[index].rect,
                        initial,
                        initial_pointer,
                        position,
                        edge,
                    );
                    let resolve = resolve_in_place(rules, pieces);
                    SessionEffect::Resized {
                        piece,
                        rect: pieces[index].rect,
                        resolve,
                    }
                }
            },
            (
                SessionState::Dragging { piece, .. } | SessionState::Resizing { piece, .. },
                InteractionEvent::PointerUp { .. },
            ) => {
                self.state = SessionState::Idle;
                self.baseline.clear();
                SessionEffect::Released { piece }
            }
            (
                SessionState::Dragging { piece, .. } | SessionState::Resizing { piece, .. },
                InteractionEvent::Cancel { reason },
            ) => {
                self.restore_baseline(pieces);
                self.state = SessionState::Idle;
                SessionEffect::Canceled { piece, reason }
            }
        };

        self.transition_counter = self.transition_counter.saturating_add(1);
        tracing::trace!(
            target: "collage.layout",
            transition_id = self.transition_counter,
            effect = effect.name(),
            "session transition"
        );
        SessionTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
            order_changed,
        }
    }

    /// Drop the active session without touching geometry.
    ///
    /// Used when the session's piece is deleted out from under it.
    pub fn abandon(&mut self) -> Option<PieceId> {
        let piece = self.state.piece();
        self.state = SessionState::Idle;
        self.baseline.clear();
        piece
    }

    fn restore_baseline(&mut self, pieces: &mut [Piece]) {
        for (id, rect) in self.baseline.drain(..) {
            if let Some(index) = index_of(pieces, id) {
                pieces[index].rect = rect;
            }
        }
    }
}

/// Snapped top-left for a drag step: pointer minus the grab offset.
#[must_use]
pub fn drag_position(
    rules: &LayoutRules,
    offset: PointerOffset,
    pointer: PointerPosition,
) -> (u32, u32) {
    (
        rules.grid.snap_signed(i64::from(pointer.x) - offset.dx),
        rules.grid.snap_signed(i64::from(pointer.y) - offset.dy),
    )
}

/// Proposed geometry for one resize step.
///
/// The pointer delta is measured from the press position and applied to the
/// geometry captured at press. Right/bottom handles floor the extent at
/// `rules.min_size`. Left/top handles move the origin with the pointer and
/// are rejected for this step (that axis keeps `current`) when the result
/// would fall below the floor, and the origin never moves past zero. Both
/// extents and the origin are snapped before returning.
#[must_use]
pub fn resize_rect(
    rules: &LayoutRules,
    current: Rect,
    initial: Rect,
    initial_pointer: PointerPosition,
    pointer: PointerPosition,
    edge: ResizeEdge,
) -> Rect {
    let dx = i64::from(pointer.x) - i64::from(initial_pointer.x);
    let dy = i64::from(pointer.y) - i64::from(initial_pointer.y);
    let min = i64::from(rules.min_size);
    let mut next = current;

    match edge.horizontal_edge() {
        Some(true) => {
            next.width = clamp_u32((i64::from(initial.width) + dx).max(min));
        }
        Some(false) => {
            let dx = dx.max(-i64::from(initial.x));
            let width = i64::from(initial.width) - dx;
            if width >= min {
                next.width = clamp_u32(width);
                next.x = clamp_u32(i64::from(initial.x) + dx);
            }
        }
        None => {}
    }

    match edge.vertical_edge() {
        Some(true) => {
            next.height = clamp_u32((i64::from(initial.height) + dy).max(min));
        }
        Some(false) => {
            let dy = dy.max(-i64::from(initial.y));
            let height = i64::from(initial.height) - dy;
            if height >= min {
                next.height = clamp_u32(height);
                next.y = clamp_u32(i64::from(initial.y) + dy);
            }
        }
        None => {}
    }

    Rect::new(
        rules.grid.snap(next.x),
        rules.grid.snap(next.y),
        rules.grid.snap_extent(next.width, rules.min_size),
        rules.grid.snap_extent(next.height, rules.min_size),
    )
}

fn clamp_u32(value: i64) -> u32 {
    u32::try_from(value.clamp(0, i64::from(u32::MAX))).unwrap_or(u32::MAX)
}
