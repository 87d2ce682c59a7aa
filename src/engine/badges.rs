use std::collections::BTreeSet;

use crate::catalog::BadgeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    Streak,
    Level,
}

#[derive(Clone, Copy, Debug)]
pub struct Milestone {
    pub measure: Measure,
    pub threshold: u32,
    pub badge: BadgeId,
}

/// Sorted by threshold within each measure. A milestone counts as reached once
/// the measure is at or past its threshold, so a jump over a threshold still
/// unlocks the badge.
pub const MILESTONES: &[Milestone] = &[
    Milestone {
        measure: Measure::Streak,
        threshold: 5,
        badge: BadgeId::Streak5,
    },
    Milestone {
        measure: Measure::Streak,
        threshold: 10,
        badge: BadgeId::Streak10,
    },
    Milestone {
        measure: Measure::Streak,
        threshold: 20,
        badge: BadgeId::Streak20,
    },
    Milestone {
        measure: Measure::Level,
        threshold: 10,
        badge: BadgeId::DailyChallenge,
    },
];

/// Badges reached by the current streak and level that are not yet earned.
/// Never removes anything; callers union the result into their earned set.
pub fn newly_unlocked(streak: u32, level: u32, earned: &BTreeSet<BadgeId>) -> Vec<BadgeId> {
    MILESTONES
        .iter()
        .filter(|m| {
            let value = match m.measure {
                Measure::Streak => streak,
                Measure::Level => level,
            };
            value >= m.threshold && !earned.contains(&m.badge)
        })
        .map(|m| m.badge)
        .collect()
}
