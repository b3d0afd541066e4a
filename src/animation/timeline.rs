use super::ease::Ease;

/// Animatable properties of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    RotateX,
    RotateY,
}

const CHANNEL_COUNT: usize = 2;

impl Channel {
    fn slot(self) -> usize {
        match self {
            Channel::RotateX => 0,
            Channel::RotateY => 1,
        }
    }
}

#[derive(Clone, Debug)]
struct Tween {
    channel: Channel,
    target: f64,
    starts_at: f64,
    duration: f64,
    ease: Ease,
    /// Captured from the live channel value on the first frame the tween is
    /// active, so chained tweens continue from mid-flight values.
    from: Option<f64>,
}

impl Tween {
    fn ends_at(&self) -> f64 {
        self.starts_at + self.duration
    }
}

/// A sequence of keyframe tweens over the tile channels.
///
/// Steps are appended at a moving cursor: `set` places an instantaneous
/// assignment, `to` appends a timed interpolation, `to_offset` shifts the
/// start relative to the cursor (negative offsets overlap the previous step),
/// and `delay` pushes the cursor without animating. When two tweens on the
/// same channel overlap, the later one wins while it is active.
///
/// `advance` must be called with non-decreasing elapsed seconds; the frame
/// clock driving it satisfies that.
#[derive(Clone, Debug)]
pub struct Timeline {
    tweens: Vec<Tween>,
    cursor: f64,
    values: [f64; CHANNEL_COUNT],
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Timeline {
            tweens: Vec::new(),
            cursor: 0.0,
            values: [0.0; CHANNEL_COUNT],
        }
    }

    /// A timeline whose channels start from the given live values instead of
    /// zero. Used when animating a tile already rotated by a previous flip.
    pub fn with_initial(props: &[(Channel, f64)]) -> Self {
        let mut timeline = Timeline::new();
        for &(channel, value) in props {
            timeline.values[channel.slot()] = value;
        }
        timeline
    }

    /// Pushes the append cursor forward without animating anything.
    pub fn delay(&mut self, seconds: f64) {
        self.cursor += seconds.max(0.0);
    }

    /// Instantaneous assignment at the current cursor position.
    pub fn set(&mut self, channel: Channel, value: f64) {
        self.tweens.push(Tween {
            channel,
            target: value,
            starts_at: self.cursor,
            duration: 0.0,
            ease: Ease::Linear,
            from: None,
        });
    }

    /// Timed interpolation starting at the cursor; the cursor moves to its end.
    pub fn to(&mut self, props: &[(Channel, f64)], duration: f64, ease: Ease) {
        self.to_offset(props, duration, ease, 0.0);
    }

    /// Timed interpolation starting at cursor + offset. A negative offset
    /// overlaps the tail of the previous step.
    pub fn to_offset(&mut self, props: &[(Channel, f64)], duration: f64, ease: Ease, offset: f64) {
        let starts_at = (self.cursor + offset).max(0.0);
        for &(channel, target) in props {
            self.tweens.push(Tween {
                channel,
                target,
                starts_at,
                duration,
                ease,
                from: None,
            });
        }
        self.cursor = self.cursor.max(starts_at + duration);
    }

    /// Total running time in seconds.
    pub fn duration(&self) -> f64 {
        self.tweens
            .iter()
            .map(Tween::ends_at)
            .fold(0.0, f64::max)
    }

    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.duration()
    }

    /// Evaluates every active tween at `elapsed` seconds and updates the
    /// channel values. Tweens are applied in insertion order, so an
    /// overlapping later tween overrides an earlier one.
    pub fn advance(&mut self, elapsed: f64) {
        for tween in &mut self.tweens {
            if elapsed < tween.starts_at {
                continue;
            }
            let slot = tween.channel.slot();
            let from = *tween.from.get_or_insert(self.values[slot]);
            let progress = if tween.duration <= 0.0 {
                1.0
            } else {
                ((elapsed - tween.starts_at) / tween.duration).min(1.0)
            };
            self.values[slot] = from + (tween.target - from) * tween.ease.apply(progress);
        }
    }

    pub fn value(&self, channel: Channel) -> f64 {
        self.values[channel.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_timeline_is_finished_immediately() {
        let timeline = Timeline::new();
        assert_eq!(timeline.duration(), 0.0);
        assert!(timeline.is_finished(0.0));
    }

    #[test]
    fn set_applies_instantly() {
        let mut timeline = Timeline::new();
        timeline.set(Channel::RotateX, 180.0);
        timeline.advance(0.0);
        assert_close(timeline.value(Channel::RotateX), 180.0);
        assert!(timeline.is_finished(0.0));
    }

    #[test]
    fn to_interpolates_with_easing() {
        let mut timeline = Timeline::new();
        timeline.to(&[(Channel::RotateX, 270.0)], 0.5, Ease::CubicOut);
        timeline.advance(0.25);
        // half progress through a cubic-out curve covers 87.5% of the motion
        assert_close(timeline.value(Channel::RotateX), 270.0 * 0.875);
        timeline.advance(0.5);
        assert_close(timeline.value(Channel::RotateX), 270.0);
        assert!(timeline.is_finished(0.5));
    }

    #[test]
    fn negative_offset_overlaps_previous_step() {
        let mut timeline = Timeline::new();
        timeline.set(Channel::RotateX, 0.0);
        timeline.set(Channel::RotateY, 0.0);
        timeline.to(
            &[(Channel::RotateX, 270.0), (Channel::RotateY, 20.0)],
            0.5,
            Ease::CubicOut,
        );
        timeline.to_offset(
            &[(Channel::RotateX, 360.0), (Channel::RotateY, 0.0)],
            0.5,
            Ease::CubicOut,
            -0.25,
        );
        assert_close(timeline.duration(), 0.75);

        timeline.advance(0.25);
        let tilt_peak = timeline.value(Channel::RotateY);
        assert!(tilt_peak > 15.0);

        // second step takes over from the mid-flight value and heads back
        timeline.advance(0.5);
        assert!(timeline.value(Channel::RotateY) < tilt_peak);

        timeline.advance(0.75);
        assert_close(timeline.value(Channel::RotateX), 360.0);
        assert_close(timeline.value(Channel::RotateY), 0.0);
        assert!(timeline.is_finished(0.75));
    }

    #[test]
    fn later_tween_wins_while_overlapping() {
        let mut timeline = Timeline::new();
        timeline.to(&[(Channel::RotateX, 100.0)], 1.0, Ease::Linear);
        timeline.to_offset(&[(Channel::RotateX, 0.0)], 0.5, Ease::Linear, -0.5);
        timeline.advance(0.5);
        let handoff = timeline.value(Channel::RotateX);
        timeline.advance(1.0);
        assert_close(timeline.value(Channel::RotateX), 0.0);
        assert!(handoff > 0.0);
    }

    #[test]
    fn delay_holds_value_until_tween_starts() {
        let mut timeline = Timeline::with_initial(&[(Channel::RotateX, 360.0)]);
        timeline.delay(0.3);
        timeline.to(&[(Channel::RotateX, 180.0)], 1.0, Ease::CubicInOut);
        assert_close(timeline.duration(), 1.3);

        timeline.advance(0.2);
        assert_close(timeline.value(Channel::RotateX), 360.0);

        timeline.advance(0.8);
        // midway through a symmetric curve sits exactly between the endpoints
        assert_close(timeline.value(Channel::RotateX), 270.0);

        timeline.advance(1.3);
        assert_close(timeline.value(Channel::RotateX), 180.0);
    }

    #[test]
    fn untouched_channel_keeps_its_initial_value() {
        let mut timeline =
            Timeline::with_initial(&[(Channel::RotateX, 360.0), (Channel::RotateY, 12.0)]);
        timeline.to(&[(Channel::RotateX, 180.0)], 1.0, Ease::CubicInOut);
        timeline.advance(1.0);
        assert_close(timeline.value(Channel::RotateY), 12.0);
    }
}
