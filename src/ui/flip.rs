use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::animation::{Channel, Ease, Timeline};

pub const ROWS: usize = 6;
pub const COLS: usize = 6;
pub const TILE_COUNT: usize = ROWS * COLS;

/// Minimum interval between accepted hover flips on the same tile.
pub const HOVER_COOLDOWN: Duration = Duration::from_millis(1000);

const HOVER_PHASE_SECS: f64 = 0.5;
const HOVER_OVERLAP_SECS: f64 = 0.25;
const FLIP_ALL_SECS: f64 = 1.0;
pub const FLIP_ALL_STAGGER_SECS: f64 = 0.5;

/// Sideways tilt applied mid-flip, keyed on the tile's column.
pub fn tilt_for_index(index: usize) -> f64 {
    match index % COLS {
        0 => -40.0,
        1 => -20.0,
        2 => -10.0,
        4 => 20.0,
        5 => 40.0,
        _ => 10.0,
    }
}

/// Background offset of a tile face in percent of the board sprite, so the
/// 6x6 faces assemble one image across the grid.
pub fn face_background_offset(row: usize, col: usize) -> (f64, f64) {
    (col as f64 * 20.0, row as f64 * 20.0)
}

/// Per-tile hover debounce. A hover is accepted only when at least
/// `HOVER_COOLDOWN` has passed since the last accepted one; rejected hovers
/// leave the stamp untouched.
#[derive(Debug, Default)]
pub struct HoverGate {
    last_accepted: Option<Instant>,
}

impl HoverGate {
    pub fn accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted
            && now.duration_since(last) < HOVER_COOLDOWN
        {
            return false;
        }
        self.last_accepted = Some(now);
        true
    }
}

/// One-shot hover flip: snap to the board's resting orientation, rotate a
/// full turn with a transient sideways tilt, and settle back level. The
/// settle step overlaps the tail of the main turn.
pub fn hover_timeline(board_flipped: bool, tilt: f64) -> Timeline {
    let (start, overshoot, rest) = if board_flipped {
        (180.0, 450.0, 540.0)
    } else {
        (0.0, 270.0, 360.0)
    };

    let mut timeline = Timeline::new();
    timeline.set(Channel::RotateX, start);
    timeline.set(Channel::RotateY, 0.0);
    timeline.to(
        &[(Channel::RotateX, overshoot), (Channel::RotateY, tilt)],
        HOVER_PHASE_SECS,
        Ease::CubicOut,
    );
    timeline.to_offset(
        &[(Channel::RotateX, rest), (Channel::RotateY, 0.0)],
        HOVER_PHASE_SECS,
        Ease::CubicOut,
        -HOVER_OVERLAP_SECS,
    );
    timeline
}

/// Board-wide flip for one tile: ease from wherever the tile currently rests
/// to the new orientation, after a stagger delay. The tilt channel is left
/// alone.
pub fn flip_all_timeline(flipped: bool, rotate_x: f64, rotate_y: f64, delay: f64) -> Timeline {
    let target = if flipped { 180.0 } else { 0.0 };
    let mut timeline = Timeline::with_initial(&[
        (Channel::RotateX, rotate_x),
        (Channel::RotateY, rotate_y),
    ]);
    timeline.delay(delay);
    timeline.to(&[(Channel::RotateX, target)], FLIP_ALL_SECS, Ease::CubicInOut);
    timeline
}

/// Start delays for a board-wide flip: evenly spaced across `window` seconds,
/// handed out to tiles in shuffled order so the wave looks non-uniform while
/// the whole effect still finishes inside the window plus one tween.
pub fn stagger_delays<R: Rng>(count: usize, window: f64, rng: &mut R) -> Vec<f64> {
    let mut order: Vec<usize> = (0..count).collect();
    order.shuffle(rng);

    let step = if count > 1 {
        window / (count - 1) as f64
    } else {
        0.0
    };
    let mut delays = vec![0.0; count];
    for (rank, index) in order.into_iter().enumerate() {
        delays[index] = rank as f64 * step;
    }
    delays
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilt_follows_the_column_table() {
        assert_eq!(tilt_for_index(0), -40.0);
        assert_eq!(tilt_for_index(1), -20.0);
        assert_eq!(tilt_for_index(2), -10.0);
        assert_eq!(tilt_for_index(3), 10.0);
        assert_eq!(tilt_for_index(4), 20.0);
        assert_eq!(tilt_for_index(5), 40.0);
        // wraps by column across the whole board
        assert_eq!(tilt_for_index(35), 40.0);
        for index in 0..TILE_COUNT {
            assert_eq!(tilt_for_index(index), tilt_for_index(index % COLS));
        }
    }

    #[test]
    fn face_offsets_step_by_twenty_percent() {
        assert_eq!(face_background_offset(0, 0), (0.0, 0.0));
        assert_eq!(face_background_offset(2, 3), (60.0, 40.0));
        assert_eq!(face_background_offset(5, 5), (100.0, 100.0));
    }

    #[test]
    fn first_hover_is_always_accepted() {
        let mut gate = HoverGate::default();
        assert!(gate.accept(Instant::now()));
    }

    #[test]
    fn hover_inside_cooldown_is_rejected() {
        let mut gate = HoverGate::default();
        let t0 = Instant::now();
        assert!(gate.accept(t0));
        assert!(!gate.accept(t0 + Duration::from_millis(999)));
        assert!(gate.accept(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn rejected_hover_does_not_refresh_the_stamp() {
        let mut gate = HoverGate::default();
        let t0 = Instant::now();
        assert!(gate.accept(t0));
        assert!(!gate.accept(t0 + Duration::from_millis(999)));
        // still measured from t0, not from the rejected attempt
        assert!(gate.accept(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn hover_rests_at_a_full_turn() {
        let mut timeline = hover_timeline(false, 20.0);
        let end = timeline.duration();
        assert!((end - 0.75).abs() < 1e-9);
        timeline.advance(end);
        assert!((timeline.value(Channel::RotateX) - 360.0).abs() < 1e-9);
        assert!(timeline.value(Channel::RotateY).abs() < 1e-9);
    }

    #[test]
    fn hover_on_a_flipped_board_rests_at_the_flipped_turn() {
        let mut timeline = hover_timeline(true, -40.0);
        let end = timeline.duration();
        timeline.advance(0.0);
        assert!((timeline.value(Channel::RotateX) - 180.0).abs() < 1e-9);
        timeline.advance(end);
        assert!((timeline.value(Channel::RotateX) - 540.0).abs() < 1e-9);
    }

    #[test]
    fn flip_all_targets_follow_the_new_orientation() {
        let mut to_back = flip_all_timeline(true, 360.0, 0.0, 0.0);
        let end = to_back.duration();
        to_back.advance(end);
        assert!((to_back.value(Channel::RotateX) - 180.0).abs() < 1e-9);

        let mut to_front = flip_all_timeline(false, 180.0, 0.0, 0.0);
        let end = to_front.duration();
        to_front.advance(end);
        assert!(to_front.value(Channel::RotateX).abs() < 1e-9);
    }

    #[test]
    fn flip_all_waits_out_its_stagger_delay() {
        let mut timeline = flip_all_timeline(true, 0.0, 0.0, 0.4);
        assert!((timeline.duration() - 1.4).abs() < 1e-9);
        timeline.advance(0.3);
        assert!(timeline.value(Channel::RotateX).abs() < 1e-9);
    }

    #[test]
    fn stagger_covers_the_window_in_even_steps() {
        let mut rng = rand::rng();
        let delays = stagger_delays(TILE_COUNT, FLIP_ALL_STAGGER_SECS, &mut rng);
        assert_eq!(delays.len(), TILE_COUNT);

        let mut sorted = delays.clone();
        sorted.sort_by(f64::total_cmp);
        let step = FLIP_ALL_STAGGER_SECS / (TILE_COUNT - 1) as f64;
        for (rank, delay) in sorted.iter().enumerate() {
            assert!((delay - rank as f64 * step).abs() < 1e-9);
        }
        assert!(sorted.first().copied() == Some(0.0));
        assert!((sorted.last().copied().unwrap() - FLIP_ALL_STAGGER_SECS).abs() < 1e-9);
    }

    #[test]
    fn stagger_degenerate_counts() {
        let mut rng = rand::rng();
        assert!(stagger_delays(0, FLIP_ALL_STAGGER_SECS, &mut rng).is_empty());
        assert_eq!(stagger_delays(1, FLIP_ALL_STAGGER_SECS, &mut rng), vec![0.0]);
    }
}
