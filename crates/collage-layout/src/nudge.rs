//! Single-axis "push until clear" displacement.

use collage_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::config::LayoutRules;
use crate::placement::collides;

/// Axis direction for a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeDirection {
    Right,
    Down,
    Left,
    Up,
}

impl NudgeDirection {
    /// Unit vector `(dx, dy)` for this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
        }
    }
}

/// Result of one nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NudgeOutcome {
    pub rect: Rect,
    pub steps: u32,
    /// `rect` overlaps none of the `others` it was pushed against.
    pub cleared: bool,
}

/// Push `rect` one grid step at a time along `direction` until it overlaps
/// none of `others`, or `rules.nudge_max_steps` steps have been taken.
///
/// Coordinates saturate at zero when pushing left or up.
#[must_use]
pub fn nudge<'a, I>(
    rules: &LayoutRules,
    rect: Rect,
    others: I,
    direction: NudgeDirection,
) -> NudgeOutcome
where
    I: IntoIterator<Item = &'a Rect> + Clone,
{
    let (dx, dy) = direction.delta();
    let step = i64::from(rules.grid.step());
    let mut current = rect;
    let mut steps = 0;

    loop {
        if !collides(&current, others.clone()) {
            return NudgeOutcome {
                rect: current,
                steps,
                cleared: true,
            };
        }
        if steps >= rules.nudge_max_steps {
            return NudgeOutcome {
                rect: current,
                steps,
                cleared: false,
            };
        }
        current.x = rules.grid.snap_signed(i64::from(current.x) + dx * step);
        current.y = rules.grid.snap_signed(i64::from(current.y) + dy * step);
        steps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    #[test]
    fn clear_rect_does_not_move() {
        let rules = LayoutRules::default();
        let outcome = nudge(
            &rules,
            Rect::new(200, 0, 40, 40),
            &[Rect::new(0, 0, 100, 100)],
            NudgeDirection::Right,
        );
        assert_eq!(outcome.steps, 0);
        assert!(outcome.cleared);
        assert_eq!(outcome.rect, Rect::new(200, 0, 40, 40));
    }

    #[test]
    fn pushes_right_until_touching() {
        let rules = LayoutRules::default();
        let outcome = nudge(
            &rules,
            Rect::new(40, 0, 40, 40),
            &[Rect::new(0, 0, 100, 100)],
            NudgeDirection::Right,
        );
        assert!(outcome.cleared);
        assert_eq!(outcome.rect, Rect::new(100, 0, 40, 40));
        assert_eq!(outcome.steps, 3);
    }

    #[test]
    fn pushes_down_past_several_obstacles() {
        let rules = LayoutRules::default();
        let others = [Rect::new(0, 0, 100, 100), Rect::new(0, 100, 100, 60)];
        let outcome = nudge(&rules, Rect::new(0, 20, 60, 60), &others, NudgeDirection::Down);
        assert!(outcome.cleared);
        assert_eq!(outcome.rect.y, 160);
    }

    #[test]
    fn left_and_up_saturate_at_origin() {
        let rules = LayoutConfig {
            nudge_max_steps: 4,
            ..LayoutConfig::default()
        }
        .rules();
        let outcome = nudge(
            &rules,
            Rect::new(20, 0, 40, 40),
            &[Rect::new(0, 0, 100, 100)],
            NudgeDirection::Left,
        );
        assert!(!outcome.cleared);
        assert_eq!(outcome.rect.x, 0);
        assert_eq!(outcome.steps, 4);

        let up = nudge(
            &rules,
            Rect::new(0, 200, 40, 40),
            &[Rect::new(0, 180, 40, 40)],
            NudgeDirection::Up,
        );
        assert!(up.cleared);
        assert_eq!(up.rect.y, 140);
    }

    #[test]
    fn ceiling_bounds_work() {
        let rules = LayoutRules::default();
        let wall = [Rect::new(0, 0, 1_000_000, 40)];
        let outcome = nudge(&rules, Rect::new(0, 0, 40, 40), &wall, NudgeDirection::Right);
        assert!(!outcome.cleared);
        assert_eq!(outcome.steps, rules.nudge_max_steps);
        assert_eq!(outcome.rect.x, 20 * 200);
    }
}
