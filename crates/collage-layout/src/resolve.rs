//! Global collision resolution.
//!
//! A resolve run repeatedly scans every unordered pair `(i, j)` with `i < j`
//! in sequence order. Each overlapping pair nudges the later piece `j`:
//! rightward when the earlier piece has the strictly smaller area, downward
//! otherwise. Nudges are checked against the in-progress state of every
//! other piece, so one pass can cascade. The run stops at the first pass that
//! finds no collision, or after `resolve_max_passes` passes, and whatever
//! state exists then is returned.

use serde::{Deserialize, Serialize};

use crate::config::LayoutRules;
use crate::nudge::{NudgeDirection, nudge};
use crate::piece::{Piece, PieceId};

/// Diagnostics for one resolve run. Never an error: an unconverged run is
/// still committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    /// Passes executed, including the final collision-free pass.
    pub passes: u32,
    /// Overlapping pairs corrected across all passes.
    pub corrections: u32,
    /// A full pass found no collisions.
    pub converged: bool,
}

/// Nudge direction for the later piece of an overlapping pair.
#[must_use]
pub fn nudge_direction(earlier: &Piece, later: &Piece) -> NudgeDirection {
    if earlier.rect.area() < later.rect.area() {
        NudgeDirection::Right
    } else {
        NudgeDirection::Down
    }
}

/// Resolve `pieces` and return the stabilized set.
#[must_use]
pub fn resolve_all(rules: &LayoutRules, mut pieces: Vec<Piece>) -> Vec<Piece> {
    resolve_in_place(rules, &mut pieces);
    pieces
}

/// Resolve `pieces` in place.
pub fn resolve_in_place(rules: &LayoutRules, pieces: &mut [Piece]) -> ResolveReport {
    let _span = tracing::debug_span!("collage.resolve", pieces = pieces.len()).entered();
    let mut report = ResolveReport::default();

    while report.passes < rules.resolve_max_passes {
        report.passes += 1;
        let mut collision = false;

        for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                if !pieces[i].rect.overlaps(&pieces[j].rect) {
                    continue;
                }
                collision = true;
                let direction = nudge_direction(&pieces[i], &pieces[j]);
                let others = pieces
                    .iter()
                    .enumerate()
                    .filter(move |(index, _)| *index != j)
                    .map(|(_, piece)| &piece.rect);
                let outcome = nudge(rules, pieces[j].rect, others, direction);
                pieces[j].rect = outcome.rect;
                report.corrections += 1;
            }
        }

        if !collision {
            report.converged = true;
            break;
        }
    }

    if report.converged {
        tracing::debug!(
            target: "collage.layout",
            passes = report.passes,
            corrections = report.corrections,
            "resolve converged"
        );
    } else {
        tracing::debug!(
            target: "collage.layout",
            passes = report.passes,
            corrections = report.corrections,
            "resolve pass ceiling reached"
        );
    }

    report
}

/// Every overlapping pair, in scan order.
#[must_use]
pub fn overlapping_pairs(pieces: &[Piece]) -> Vec<(PieceId, PieceId)> {
    let mut pairs = Vec::new();
    for (i, first) in pieces.iter().enumerate() {
        for second in &pieces[i + 1..] {
            if first.rect.overlaps(&second.rect) {
                pairs.push((first.id, second.id));
            }
        }
    }
    pairs
}

/// Whether no two pieces overlap.
#[must_use]
pub fn is_overlap_free(pieces: &[Piece]) -> bool {
    pieces.iter().enumerate().all(|(i, first)| {
        pieces[i + 1..]
            .iter()
            .all(|second| !first.rect.overlaps(&second.rect))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::piece::PieceContent;
    use collage_core::geometry::Rect;

    fn piece(raw: u64, rect: Rect) -> Piece {
        Piece::new(
            PieceId::new(raw).expect("non-zero id"),
            PieceContent::color("#336699"),
            rect,
        )
    }

    #[test]
    fn stable_set_is_unchanged_in_one_pass() {
        let pieces = vec![
            piece(1, Rect::new(0, 0, 100, 100)),
            piece(2, Rect::new(100, 0, 100, 100)),
        ];
        let mut resolved = pieces.clone();
        let report = resolve_in_place(&LayoutRules::default(), &mut resolved);
        assert_eq!(resolved, pieces);
        assert_eq!(report.passes, 1);
        assert_eq!(report.corrections, 0);
        assert!(report.converged);
    }

    #[test]
    fn equal_area_pushes_later_piece_down() {
        let resolved = resolve_all(
            &LayoutRules::default(),
            vec![
                piece(1, Rect::new(0, 0, 100, 100)),
                piece(2, Rect::new(40, 40, 100, 100)),
            ],
        );
        assert_eq!(resolved[0].rect, Rect::new(0, 0, 100, 100));
        assert_eq!(resolved[1].rect, Rect::new(40, 100, 100, 100));
    }

    #[test]
    fn larger_later_piece_is_pushed_right() {
        let resolved = resolve_all(
            &LayoutRules::default(),
            vec![
                piece(1, Rect::new(0, 0, 60, 60)),
                piece(2, Rect::new(20, 0, 100, 100)),
            ],
        );
        assert_eq!(resolved[1].rect, Rect::new(60, 0, 100, 100));
    }

    #[test]
    fn smaller_later_piece_is_pushed_down() {
        let resolved = resolve_all(
            &LayoutRules::default(),
            vec![
                piece(1, Rect::new(0, 0, 100, 100)),
                piece(2, Rect::new(20, 20, 40, 40)),
            ],
        );
        assert_eq!(resolved[1].rect, Rect::new(20, 100, 40, 40));
    }

    #[test]
    fn cascade_is_resolved_within_passes() {
        let pieces = vec![
            piece(1, Rect::new(0, 0, 100, 100)),
            piece(2, Rect::new(0, 0, 100, 100)),
            piece(3, Rect::new(0, 0, 100, 100)),
            piece(4, Rect::new(0, 0, 100, 100)),
        ];
        let mut resolved = pieces;
        let report = resolve_in_place(&LayoutRules::default(), &mut resolved);
        assert!(report.converged);
        assert!(is_overlap_free(&resolved));
        let tops: Vec<u32> = resolved.iter().map(|p| p.rect.y).collect();
        assert_eq!(tops, vec![0, 100, 200, 300]);
    }

    #[test]
    fn pass_ceiling_is_respected() {
        let rules = LayoutConfig {
            resolve_max_passes: 1,
            nudge_max_steps: 1,
            ..LayoutConfig::default()
        }
        .rules();
        let mut pieces = vec![
            piece(1, Rect::new(0, 0, 200, 200)),
            piece(2, Rect::new(0, 0, 200, 200)),
        ];
        let report = resolve_in_place(&rules, &mut pieces);
        assert_eq!(report.passes, 1);
        assert!(!report.converged);
        assert_eq!(overlapping_pairs(&pieces).len(), 1);
    }

    #[test]
    fn empty_and_single_sets_converge() {
        let rules = LayoutRules::default();
        assert!(resolve_in_place(&rules, &mut []).converged);
        let mut one = vec![piece(1, Rect::new(5, 5, 30, 30))];
        assert!(resolve_in_place(&rules, &mut one).converged);
        assert_eq!(one[0].rect, Rect::new(5, 5, 30, 30));
    }
}
