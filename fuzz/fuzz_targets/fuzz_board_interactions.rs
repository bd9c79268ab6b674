#![no_main]

use arbitrary::Arbitrary;
use collage_layout::{
    Board, CancelReason, InteractionEvent, LayoutConfig, PieceContent, PointerPosition, Rect,
    ResizeEdge, SessionEffect,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Add { x: u16, y: u16, w: u8, h: u8 },
    Delete { pick: u8 },
    Front { pick: u8 },
    ToggleSnap,
    Down { pick: u8, edge: Option<u8>, x: i16, y: i16 },
    Move { x: i16, y: i16 },
    Up,
    Cancel,
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

fn pick(board: &Board, raw: u8) -> Option<collage_layout::PieceId> {
    (!board.is_empty()).then(|| board.pieces()[usize::from(raw) % board.len()].id)
}

fuzz_target!(|ops: Vec<Op>| {
    // Resolve cost grows with piece count; keep runs short.
    if ops.len() > 64 {
        return;
    }
    let mut board = Board::new(LayoutConfig {
        resolve_max_passes: 40,
        ..LayoutConfig::default()
    });
    let max_passes = board.rules().resolve_max_passes;

    for op in ops {
        let effect = match op {
            Op::Add { x, y, w, h } => {
                if board.len() >= 12 {
                    continue;
                }
                let rect = Rect::new(u32::from(x), u32::from(y), u32::from(w), u32::from(h));
                if let Some(insertion) = board.add_piece_at(PieceContent::color("#000000"), rect) {
                    assert!(insertion.resolve.passes <= max_passes);
                }
                None
            }
            Op::Delete { pick: raw } => {
                if let Some(id) = pick(&board, raw) {
                    assert!(board.delete(id));
                    assert!(board.get(id).is_none());
                }
                None
            }
            Op::Front { pick: raw } => {
                if let Some(id) = pick(&board, raw) {
                    assert!(board.bring_to_front(id));
                    assert_eq!(board.pieces().last().map(|p| p.id), Some(id));
                }
                None
            }
            Op::ToggleSnap => {
                let enabled = board.rules().grid.is_enabled();
                board.set_snap_enabled(!enabled);
                None
            }
            Op::Down { pick: raw, edge, x, y } => pick(&board, raw).map(|piece| {
                board
                    .apply(&InteractionEvent::PointerDown {
                        piece,
                        edge: edge.map(|e| EDGES[usize::from(e) % EDGES.len()]),
                        position: PointerPosition::new(i32::from(x), i32::from(y)),
                    })
                    .effect
            }),
            Op::Move { x, y } => Some(
                board
                    .apply(&InteractionEvent::PointerMove {
                        position: PointerPosition::new(i32::from(x), i32::from(y)),
                    })
                    .effect,
            ),
            Op::Up => Some(
                board
                    .apply(&InteractionEvent::PointerUp {
                        position: PointerPosition::new(0, 0),
                    })
                    .effect,
            ),
            Op::Cancel => Some(
                board
                    .apply(&InteractionEvent::Cancel {
                        reason: CancelReason::Programmatic,
                    })
                    .effect,
            ),
        };

        if let Some(SessionEffect::Moved { resolve, .. } | SessionEffect::Resized { resolve, .. }) =
            effect
        {
            assert!(resolve.passes <= max_passes);
        }

        let min = board.rules().min_size;
        for piece in board.pieces() {
            assert!(piece.width() >= min, "width floor broken: {:?}", piece.rect);
            assert!(piece.height() >= min, "height floor broken: {:?}", piece.rect);
        }
    }
});
