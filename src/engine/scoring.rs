pub const BASE_POINTS: u32 = 10;
pub const SPEED_BONUS: u32 = 5;
pub const BONUS_WINDOW_SECS: u32 = 5;
/// Levels needed to fill the session progress bar.
pub const LEVELS_PER_BAR: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Award {
    /// Total points, bonus included.
    pub points: u32,
    pub bonus_points: u32,
}

/// The bonus applies while more than `time_limit - BONUS_WINDOW_SECS` seconds
/// remain, i.e. within the first five seconds of the answer window.
pub fn earns_speed_bonus(time_remaining: u32, time_limit: u32) -> bool {
    time_remaining > time_limit.saturating_sub(BONUS_WINDOW_SECS)
}

pub fn award(is_correct: bool, time_remaining: u32, time_limit: u32) -> Award {
    if !is_correct {
        return Award::default();
    }
    let bonus_points = if earns_speed_bonus(time_remaining, time_limit) {
        SPEED_BONUS
    } else {
        0
    };
    Award {
        points: BASE_POINTS + bonus_points,
        bonus_points,
    }
}

/// Fraction of the level progress bar filled, capped at `levels_per_bar`.
pub fn level_progress(level: u32, levels_per_bar: u32) -> f64 {
    if levels_per_bar == 0 {
        return 0.0;
    }
    (level as f64 / levels_per_bar as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_answer_gets_bonus() {
        let award = award(true, 30, 30);
        assert_eq!(award.points, 15);
        assert_eq!(award.bonus_points, 5);
    }

    #[test]
    fn bonus_window_edge() {
        assert_eq!(award(true, 26, 30).points, 15);
        assert_eq!(award(true, 25, 30).points, 10);
        assert_eq!(award(true, 24, 30).points, 10);
    }

    #[test]
    fn slow_answer_gets_base_only() {
        let award = award(true, 24, 30);
        assert_eq!(award.points, 10);
        assert_eq!(award.bonus_points, 0);
    }

    #[test]
    fn wrong_answer_scores_nothing() {
        assert_eq!(award(false, 30, 30), Award::default());
    }

    #[test]
    fn short_time_limit_does_not_underflow() {
        assert!(earns_speed_bonus(1, 3));
        assert!(!earns_speed_bonus(0, 3));
    }

    #[test]
    fn level_progress_caps_at_one() {
        assert_eq!(level_progress(0, 20), 0.0);
        assert_eq!(level_progress(10, 20), 0.5);
        assert_eq!(level_progress(40, 20), 1.0);
        assert_eq!(level_progress(3, 0), 0.0);
    }
}
