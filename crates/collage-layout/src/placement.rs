//! Downward linear probing for a new piece.

use collage_core::geometry::Rect;

use crate::config::LayoutRules;

/// Result of one placement search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub rect: Rect,
    /// Steps taken (0 when the candidate was already clear).
    pub steps: u32,
    /// The step ceiling was reached while still overlapping.
    pub exhausted: bool,
}

/// Find a slot for `candidate` that overlaps none of `existing`.
///
/// Only the vertical position changes: while the candidate overlaps any
/// existing rectangle it moves down one grid step (snapped) and retries.
/// After `rules.placement_max_steps` steps the last candidate is returned
/// even if it still overlaps; the resolver that runs after insertion is
/// responsible for the final arrangement.
#[must_use]
pub fn place<'a, I>(rules: &LayoutRules, candidate: Rect, existing: I) -> PlacementOutcome
where
    I: IntoIterator<Item = &'a Rect> + Clone,
{
    let step = rules.grid.step();
    let mut rect = candidate;
    let mut steps = 0;

    while collides(&rect, existing.clone()) {
        if steps >= rules.placement_max_steps {
            tracing::debug!(
                target: "collage.layout",
                steps,
                x = rect.x,
                y = rect.y,
                "placement search exhausted"
            );
            return PlacementOutcome {
                rect,
                steps,
                exhausted: true,
            };
        }
        rect.y = rules.grid.snap(rect.y.saturating_add(step));
        steps += 1;
    }

    PlacementOutcome {
        rect,
        steps,
        exhausted: false,
    }
}

/// Whether `rect` overlaps any member of `others`.
pub(crate) fn collides<'a, I>(rect: &Rect, others: I) -> bool
where
    I: IntoIterator<Item = &'a Rect>,
{
    others.into_iter().any(|other| rect.overlaps(other))
}
