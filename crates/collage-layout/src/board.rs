//! The board: sole owner of the ordered piece sequence.
//!
//! All writes go through the board. Readers get a slice snapshot via
//! [`Board::pieces`]; sequence order is draw order (later pieces on top).

use std::fmt;

use collage_core::geometry::Rect;

use crate::config::{LayoutConfig, LayoutRules};
use crate::piece::{self, Piece, PieceContent, PieceId};
use crate::placement::place;
use crate::resolve::{ResolveReport, resolve_in_place};
use crate::session::{InteractionEvent, InteractionSession, SessionState, SessionTransition};

/// Rendering hooks invoked by the board.
pub trait BoardObserver {
    /// The sequence order changed (insertion, deletion, bring-to-front).
    fn order_changed(&mut self, _pieces: &[Piece]) {}

    /// Piece geometry was committed.
    fn layout_committed(&mut self, _pieces: &[Piece]) {}

    /// A piece's content was swapped in place; geometry is unchanged.
    fn content_replaced(&mut self, _pieces: &[Piece]) {}
}

/// Outcome of inserting a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub id: PieceId,
    /// The placement search hit its step ceiling.
    pub placement_exhausted: bool,
    pub resolve: ResolveReport,
}

/// Piece collection plus the interaction session that mutates it.
pub struct Board {
    config: LayoutConfig,
    rules: LayoutRules,
    pieces: Vec<Piece>,
    next_id: Option<PieceId>,
    session: InteractionSession,
    spawn: SpawnStream,
    observer: Option<Box<dyn BoardObserver>>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("config", &self.config)
            .field("pieces", &self.pieces)
            .field("next_id", &self.next_id)
            .field("session", &self.session.state())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl Board {
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        let rules = config.rules();
        let spawn = SpawnStream::new(config.spawn_seed);
        Self {
            config,
            rules,
            pieces: Vec::new(),
            next_id: Some(PieceId::MIN),
            session: InteractionSession::new(),
            spawn,
            observer: None,
        }
    }

    /// Attach a rendering observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn BoardObserver>) {
        self.observer = Some(observer);
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn rules(&self) -> LayoutRules {
        self.rules
    }

    /// Read-only snapshot in draw order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Toggle grid snapping for all subsequent mutations.
    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.config.snap_enabled = enabled;
        self.rules = self.rules.with_snap_enabled(enabled);
    }

    /// Add a piece at a provisional spawn position inside the canvas.
    ///
    /// Returns `None` only if the id space is exhausted.
    pub fn add_piece(&mut self, content: PieceContent, width: u32, height: u32) -> Option<Insertion> {
        let canvas = self.config.canvas;
        let x = self.spawn.next_below(canvas.width.saturating_sub(width));
        let y = self.spawn.next_below(canvas.height.saturating_sub(height));
        self.add_piece_at(content, Rect::new(x, y, width, height))
    }

    /// Add a piece with explicit provisional geometry.
    ///
    /// The candidate is snapped and floored at the minimum size, placed clear
    /// of existing pieces, appended on top, and the whole set is resolved.
    /// Returns `None` only if the id space is exhausted.
    pub fn add_piece_at(&mut self, content: PieceContent, rect: Rect) -> Option<Insertion> {
        let id = self.allocate_id()?;
        let grid = self.rules.grid;
        let rect = Rect::new(
            grid.snap(rect.x),
            grid.snap(rect.y),
            grid.snap_extent(rect.width, self.rules.min_size),
            grid.snap_extent(rect.height, self.rules.min_size),
        );
        let outcome = place(
            &self.rules,
            rect,
            self.pieces.iter().map(|piece| &piece.rect),
        );
        self.pieces.push(Piece::new(id, content, outcome.rect));
        let resolve = resolve_in_place(&self.rules, &mut self.pieces);
        tracing::debug!(
            target: "collage.layout",
            piece = id.get(),
            steps = outcome.steps,
            exhausted = outcome.exhausted,
            "piece inserted"
        );
        self.notify_order_changed();
        self.notify_layout_committed();
        Some(Insertion {
            id,
            placement_exhausted: outcome.exhausted,
            resolve,
        })
    }

    /// Remove exactly the piece with `id`. No resolve pass runs.
    ///
    /// An active session targeting the piece is abandoned.
    pub fn delete(&mut self, id: PieceId) -> bool {
        let Some(index) = piece::index_of(&self.pieces, id) else {
            return false;
        };
        self.pieces.remove(index);
        if self.session.state().piece() == Some(id) {
            self.session.abandon();
        }
        self.notify_order_changed();
        true
    }

    /// Swap a piece's content. Geometry is untouched, so no resolve pass.
    pub fn replace_content(&mut self, id: PieceId, content: PieceContent) -> bool {
        let Some(piece) = self.pieces.iter_mut().find(|piece| piece.id == id) else {
            return false;
        };
        piece.content = content;
        if let Some(observer) = self.observer.as_mut() {
            observer.content_replaced(&self.pieces);
        }
        true
    }

    /// Move a piece to the top of the draw order.
    pub fn bring_to_front(&mut self, id: PieceId) -> bool {
        let was_last = self.pieces.last().is_some_and(|piece| piece.id == id);
        if !piece::bring_to_front(&mut self.pieces, id) {
            return false;
        }
        if !was_last {
            self.notify_order_changed();
        }
        true
    }

    /// Re-stabilize the current set.
    pub fn resolve(&mut self) -> ResolveReport {
        let report = resolve_in_place(&self.rules, &mut self.pieces);
        self.notify_layout_committed();
        report
    }

    /// Feed one pointer event through the session machine.
    pub fn apply(&mut self, event: &InteractionEvent) -> SessionTransition {
        let transition = self.session.apply(&self.rules, &mut self.pieces, event);
        if transition.order_changed {
            self.notify_order_changed();
        }
        if transition.effect.commits_geometry() {
            self.notify_layout_committed();
        }
        transition
    }

    fn allocate_id(&mut self) -> Option<PieceId> {
        let id = self.next_id?;
        self.next_id = id.checked_next().ok();
        Some(id)
    }

    fn notify_order_changed(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.order_changed(&self.pieces);
        }
    }

    fn notify_layout_committed(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.layout_committed(&self.pieces);
        }
    }
}

/// Deterministic splitmix64 stream for provisional spawn positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpawnStream {
    state: u64,
}

impl SpawnStream {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform-ish value in `0..=bound`.
    fn next_below(&mut self, bound: u32) -> u32 {
        let span = u64::from(bound) + 1;
        u32::try_from(self.next_u64() % span).unwrap_or(bound)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::resolve::is_overlap_free;
    use crate::session::{PointerPosition, ResizeEdge};

    #[derive(Default)]
    struct Recorder {
        order_changes: usize,
        commits: usize,
        content_swaps: usize,
    }

    struct SharedRecorder(Rc<RefCell<Recorder>>);

    impl BoardObserver for SharedRecorder {
        fn order_changed(&mut self, _pieces: &[Piece]) {
            self.0.borrow_mut().order_changes += 1;
        }

        fn layout_committed(&mut self, _pieces: &[Piece]) {
            self.0.borrow_mut().commits += 1;
        }

        fn content_replaced(&mut self, _pieces: &[Piece]) {
            self.0.borrow_mut().content_swaps += 1;
        }
    }

    fn block() -> PieceContent {
        PieceContent::color("#222222")
    }

    #[test]
    fn ids_are_sequential_and_unique() {
        let mut board = Board::default();
        let a = board.add_piece(block(), 100, 100).expect("insert");
        let b = board.add_piece(block(), 100, 100).expect("insert");
        assert_eq!(a.id.get(), 1);
        assert_eq!(b.id.get(), 2);
        assert!(board.delete(a.id));
        let c = board.add_piece(block(), 100, 100).expect("insert");
        assert_eq!(c.id.get(), 3);
    }

    #[test]
    fn spawned_pieces_do_not_overlap() {
        let mut board = Board::default();
        for _ in 0..12 {
            let insertion = board.add_piece(block(), 120, 80).expect("insert");
            assert!(insertion.resolve.converged);
        }
        assert_eq!(board.len(), 12);
        assert!(is_overlap_free(board.pieces()));
    }

    #[test]
    fn spawn_positions_are_deterministic() {
        let mut first = Board::default();
        let mut second = Board::default();
        for _ in 0..5 {
            first.add_piece(block(), 60, 60);
            second.add_piece(block(), 60, 60);
        }
        assert_eq!(first.pieces(), second.pieces());
    }

    #[test]
    fn spawned_positions_are_snapped() {
        let mut board = Board::default();
        for _ in 0..6 {
            board.add_piece(block(), 40, 40);
        }
        let grid = board.rules().grid;
        assert!(
            board
                .pieces()
                .iter()
                .all(|p| grid.is_aligned(p.left()) && grid.is_aligned(p.top()))
        );
    }

    #[test]
    fn replace_content_leaves_geometry() {
        let mut board = Board::default();
        let id = board
            .add_piece_at(block(), Rect::new(0, 0, 100, 100))
            .expect("insert")
            .id;
        assert!(board.replace_content(id, PieceContent::color("#ffffff")));
        let piece = board.get(id).expect("present");
        assert_eq!(piece.content, PieceContent::color("#ffffff"));
        assert_eq!(piece.rect, Rect::new(0, 0, 100, 100));
        assert!(!board.replace_content(PieceId::new(99).expect("id"), block()));
    }

    #[test]
    fn deleting_session_target_abandons_session() {
        let mut board = Board::default();
        let id = board
            .add_piece_at(block(), Rect::new(0, 0, 100, 100))
            .expect("insert")
            .id;
        board.apply(&InteractionEvent::PointerDown {
            piece: id,
            edge: Some(ResizeEdge::Right),
            position: PointerPosition::new(100, 50),
        });
        assert!(board.delete(id));
        assert_eq!(board.session_state(), SessionState::Idle);
        assert!(!board.delete(id));
    }

    #[test]
    fn observer_sees_order_and_commits() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut board = Board::default();
        board.set_observer(Box::new(SharedRecorder(Rc::clone(&recorder))));

        let a = board
            .add_piece_at(block(), Rect::new(0, 0, 100, 100))
            .expect("insert")
            .id;
        board
            .add_piece_at(block(), Rect::new(200, 0, 100, 100))
            .expect("insert");
        assert_eq!(recorder.borrow().order_changes, 2);
        assert_eq!(recorder.borrow().commits, 2);

        board.apply(&InteractionEvent::PointerDown {
            piece: a,
            edge: None,
            position: PointerPosition::new(10, 10),
        });
        assert_eq!(recorder.borrow().order_changes, 3);
        board.apply(&InteractionEvent::PointerMove {
            position: PointerPosition::new(30, 30),
        });
        assert_eq!(recorder.borrow().commits, 3);

        assert!(board.bring_to_front(a));
        assert_eq!(recorder.borrow().order_changes, 3);

        assert!(board.replace_content(a, PieceContent::color("#ffffff")));
        assert!(!board.replace_content(PieceId::new(99).expect("id"), block()));
        let seen = recorder.borrow();
        assert_eq!(seen.content_swaps, 1);
        assert_eq!((seen.order_changes, seen.commits), (3, 3));
    }

    #[test]
    fn snap_toggle_updates_rules() {
        let mut board = Board::default();
        board.set_snap_enabled(false);
        assert!(!board.rules().grid.is_enabled());
        assert!(!board.config().snap_enabled);
        let id = board
            .add_piece_at(block(), Rect::new(7, 13, 55, 55))
            .expect("insert")
            .id;
        assert_eq!(board.get(id).expect("present").rect, Rect::new(7, 13, 55, 55));
    }
}
