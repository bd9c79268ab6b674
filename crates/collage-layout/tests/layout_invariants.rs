//! Property-style invariants for placement, resolution, and interaction.
//!
//! Random operation streams run against the public board API and check
//! bounded termination, minimum size, grid alignment, and front-order rules
//! after each mutation.

use collage_layout::{
    Board, CancelReason, InteractionEvent, LayoutConfig, LayoutRules, Piece, PieceContent,
    PieceId, PointerPosition, Rect, ResizeEdge, is_overlap_free, place, resolve_in_place,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        debug_assert!(min <= max);
        if min == max {
            return min;
        }
        let span = u64::from(max - min + 1);
        min + (self.next_u64() % span) as u32
    }

    fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        let span = (i64::from(max) - i64::from(min) + 1) as u64;
        (i64::from(min) + (self.next_u64() % span) as i64) as i32
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }
}

const EDGES: [ResizeEdge; 8] = [
    ResizeEdge::Left,
    ResizeEdge::Right,
    ResizeEdge::Top,
    ResizeEdge::Bottom,
    ResizeEdge::TopLeft,
    ResizeEdge::TopRight,
    ResizeEdge::BottomLeft,
    ResizeEdge::BottomRight,
];

fn id(raw: u64) -> PieceId {
    PieceId::new(raw).expect("non-zero id")
}

fn random_pieces(rng: &mut Lcg, count: usize) -> Vec<Piece> {
    (0..count)
        .map(|index| {
            Piece::new(
                id(index as u64 + 1),
                PieceContent::color("#808080"),
                Rect::new(
                    rng.next_u32_range(0, 30) * 20,
                    rng.next_u32_range(0, 30) * 20,
                    rng.next_u32_range(2, 10) * 20,
                    rng.next_u32_range(2, 10) * 20,
                ),
            )
        })
        .collect()
}

fn seeded_board(rng: &mut Lcg, config: LayoutConfig, count: usize) -> Board {
    let mut board = Board::new(config);
    for _ in 0..count {
        let width = rng.next_u32_range(10, 160);
        let height = rng.next_u32_range(10, 160);
        board
            .add_piece(PieceContent::color("#123456"), width, height)
            .expect("id space available");
    }
    board
}

fn random_event(rng: &mut Lcg, board: &Board) -> InteractionEvent {
    let position = PointerPosition::new(rng.next_i32_range(-200, 1400), rng.next_i32_range(-200, 1000));
    match rng.next_u32_range(0, 9) {
        0..=2 => {
            let target = &board.pieces()[rng.choose_index(board.len())];
            let edge = if rng.choose_bool() {
                Some(EDGES[rng.choose_index(EDGES.len())])
            } else {
                None
            };
            InteractionEvent::PointerDown {
                piece: target.id,
                edge,
                position,
            }
        }
        3..=7 => InteractionEvent::PointerMove { position },
        8 => InteractionEvent::PointerUp { position },
        _ => InteractionEvent::Cancel {
            reason: CancelReason::PointerCancel,
        },
    }
}

fn assert_min_size(board: &Board) {
    let min = board.rules().min_size;
    for piece in board.pieces() {
        assert!(
            piece.width() >= min && piece.height() >= min,
            "{} fell below the size floor: {:?}",
            piece.id,
            piece.rect
        );
    }
}

fn assert_grid_aligned(board: &Board) {
    let grid = board.rules().grid;
    for piece in board.pieces() {
        let rect = piece.rect;
        assert!(
            grid.is_aligned(rect.x)
                && grid.is_aligned(rect.y)
                && grid.is_aligned(rect.width)
                && grid.is_aligned(rect.height),
            "{} is off-grid: {rect:?}",
            piece.id
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn converged_resolve_is_idempotent(seed in any::<u64>(), count in 0usize..8) {
        let mut rng = Lcg::new(seed);
        let rules = LayoutRules::default();
        let mut pieces = random_pieces(&mut rng, count);
        let first = resolve_in_place(&rules, &mut pieces);
        prop_assume!(first.converged);
        prop_assert!(is_overlap_free(&pieces));

        let snapshot = pieces.clone();
        let second = resolve_in_place(&rules, &mut pieces);
        prop_assert_eq!(second.passes, 1);
        prop_assert_eq!(second.corrections, 0);
        prop_assert_eq!(pieces, snapshot);
    }

    #[test]
    fn resolve_never_exceeds_pass_ceiling(count in 1usize..16, max_passes in 1u32..12) {
        let rules = LayoutConfig {
            resolve_max_passes: max_passes,
            ..LayoutConfig::default()
        }
        .rules();
        let mut pieces: Vec<Piece> = (0..count)
            .map(|index| Piece::new(id(index as u64 + 1), PieceContent::color("#000000"), Rect::new(0, 0, 120, 120)))
            .collect();
        let report = resolve_in_place(&rules, &mut pieces);
        prop_assert!(report.passes <= max_passes);
        prop_assert!(report.passes >= 1);
        prop_assert_eq!(pieces.len(), count);
    }

    #[test]
    fn placement_only_moves_downward(seed in any::<u64>(), count in 0usize..10) {
        let mut rng = Lcg::new(seed);
        let rules = LayoutRules::default();
        let existing = random_pieces(&mut rng, count);
        let candidate = Rect::new(
            rng.next_u32_range(0, 30) * 20,
            rng.next_u32_range(0, 30) * 20,
            rng.next_u32_range(2, 10) * 20,
            rng.next_u32_range(2, 10) * 20,
        );
        let outcome = place(&rules, candidate, existing.iter().map(|p| &p.rect));

        prop_assert_eq!(outcome.rect.x, candidate.x);
        prop_assert_eq!(outcome.rect.width, candidate.width);
        prop_assert_eq!(outcome.rect.height, candidate.height);
        prop_assert!(outcome.rect.y >= candidate.y);
        if !outcome.exhausted {
            prop_assert!(existing.iter().all(|p| !p.rect.overlaps(&outcome.rect)));
        }
    }

    #[test]
    fn interaction_streams_keep_size_floor_and_grid(seed in any::<u64>(), count in 1usize..6) {
        let mut rng = Lcg::new(seed);
        let mut board = seeded_board(&mut rng, LayoutConfig::default(), count);
        assert_min_size(&board);
        assert_grid_aligned(&board);

        for _ in 0..40 {
            let event = random_event(&mut rng, &board);
            let transition = board.apply(&event);
            if let Some(report) = match transition.effect {
                collage_layout::SessionEffect::Moved { resolve, .. }
                | collage_layout::SessionEffect::Resized { resolve, .. } => Some(resolve),
                _ => None,
            } {
                prop_assert!(report.passes <= board.rules().resolve_max_passes);
            }
            assert_min_size(&board);
            assert_grid_aligned(&board);
        }
    }

    #[test]
    fn size_floor_holds_without_snapping(seed in any::<u64>(), count in 1usize..6) {
        let mut rng = Lcg::new(seed);
        let config = LayoutConfig {
            snap_enabled: false,
            ..LayoutConfig::default()
        };
        let mut board = seeded_board(&mut rng, config, count);
        for _ in 0..40 {
            let event = random_event(&mut rng, &board);
            board.apply(&event);
            assert_min_size(&board);
        }
    }

    #[test]
    fn bring_to_front_preserves_relative_order(count in 1usize..12, pick in any::<prop::sample::Index>()) {
        let mut board = Board::default();
        for index in 0..count {
            board
                .add_piece_at(PieceContent::color("#ffffff"), Rect::new(index as u32 * 120, 0, 100, 100))
                .expect("insert");
        }
        let before: Vec<PieceId> = board.pieces().iter().map(|p| p.id).collect();
        let target = before[pick.index(count)];

        prop_assert!(board.bring_to_front(target));

        let after: Vec<PieceId> = board.pieces().iter().map(|p| p.id).collect();
        prop_assert_eq!(after.last().copied(), Some(target));
        let expected: Vec<PieceId> = before.iter().copied().filter(|&p| p != target).collect();
        prop_assert_eq!(&after[..count - 1], expected.as_slice());
    }
}

#[test]
fn dense_column_exhausts_placement_search() {
    let rules = LayoutConfig {
        placement_max_steps: 50,
        ..LayoutConfig::default()
    }
    .rules();
    let wall = Rect::new(0, 0, 100, 20 * 200);
    let outcome = place(&rules, Rect::new(0, 0, 100, 100), [&wall]);

    assert!(outcome.exhausted);
    assert_eq!(outcome.steps, 50);
    assert_eq!(outcome.rect.y, 50 * 20);
    assert!(outcome.rect.overlaps(&wall));
}
