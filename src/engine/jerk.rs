use log::info;

use super::{
    config::EngineConfig,
    types::{Axis, Direction, JerkEvent},
};

/// Per-axis change between two acceleration triples and the axis that moved most.
///
/// Ties resolve X before Y before Z.
pub fn accel_delta_peak_axis(
    prev: (f64, f64, f64),
    current: (f64, f64, f64),
) -> ((f64, f64, f64), f64, Axis) {
    let dx = current.0 - prev.0;
    let dy = current.1 - prev.1;
    let dz = current.2 - prev.2;

    let (mx, my, mz) = (dx.abs(), dy.abs(), dz.abs());
    let peak = mx.max(my).max(mz);

    let axis = if mx == peak {
        Axis::X
    } else if my == peak {
        Axis::Y
    } else {
        Axis::Z
    };

    ((dx, dy, dz), peak, axis)
}

#[derive(Clone, Copy, Debug)]
pub struct JerkDetector {
    threshold: f64,
    cooldown_ms: u64,
    prev_accel: (f64, f64, f64),
    last_trigger_at_ms: Option<u64>,
}

impl JerkDetector {
    pub fn new(threshold: f64, cooldown_ms: u64) -> Self {
        Self {
            threshold,
            cooldown_ms,
            prev_accel: (0.0, 0.0, 0.0),
            last_trigger_at_ms: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.jerk_threshold, config.jerk_cooldown_ms())
    }

    fn in_cooldown(&self, now_ms: u64) -> bool {
        self.last_trigger_at_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= self.cooldown_ms)
    }

    /// Feeds one acceleration triple. The previous reading is replaced on every
    /// call, whether or not an event fires.
    pub fn detect(&mut self, accel: (f64, f64, f64), now_ms: u64) -> Option<JerkEvent> {
        let (delta, peak, axis) = accel_delta_peak_axis(self.prev_accel, accel);
        self.prev_accel = accel;

        if peak <= self.threshold || self.in_cooldown(now_ms) {
            return None;
        }
        self.last_trigger_at_ms = Some(now_ms);

        let axis_delta = match axis {
            Axis::X => delta.0,
            Axis::Y => delta.1,
            Axis::Z => delta.2,
        };
        let direction = if axis_delta > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        };

        let event = JerkEvent {
            axis,
            direction,
            magnitude: peak,
            t_ms: now_ms,
        };
        info!(
            "jerk axis={} dx={:.2} dy={:.2} dz={:.2}",
            event.label(),
            delta.0,
            delta.1,
            delta.2
        );
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> JerkDetector {
        JerkDetector::new(0.6, 250)
    }

    #[test]
    fn dominant_positive_x_delta_is_classified() {
        let mut jerk = detector();
        let event = jerk.detect((0.8, 0.1, 0.05), 1_000).expect("jerk expected");
        assert_eq!(event.axis, Axis::X);
        assert_eq!(event.direction, Direction::Positive);
        assert_eq!(event.label(), "X+");
        approx::assert_relative_eq!(event.magnitude, 0.8);
    }

    #[test]
    fn dominant_negative_y_delta_is_classified() {
        let mut jerk = detector();
        let event = jerk.detect((-0.1, -0.9, 0.2), 1_000).expect("jerk expected");
        assert_eq!(event.axis, Axis::Y);
        assert_eq!(event.direction, Direction::Negative);
    }

    #[test]
    fn deltas_are_taken_against_previous_reading() {
        let mut jerk = detector();
        assert!(jerk.detect((0.0, 0.0, 1.0), 0).is_some());
        // Same reading again: zero delta.
        assert!(jerk.detect((0.0, 0.0, 1.0), 1_000).is_none());
        let event = jerk.detect((0.0, 0.0, 0.2), 2_000).expect("drop on z");
        assert_eq!(event.label(), "Z-");
    }

    #[test]
    fn ties_prefer_x_then_y() {
        let (_, peak, axis) = accel_delta_peak_axis((0.0, 0.0, 0.0), (1.0, -1.0, 1.0));
        assert_eq!(peak, 1.0);
        assert_eq!(axis, Axis::X);
        let (_, _, axis) = accel_delta_peak_axis((0.0, 0.0, 0.0), (0.5, -1.0, 1.0));
        assert_eq!(axis, Axis::Y);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut jerk = JerkDetector::new(0.5, 250);
        assert!(jerk.detect((0.5, 0.0, 0.0), 1_000).is_none());
    }

    #[test]
    fn cooldown_suppresses_but_still_tracks_previous_reading() {
        let mut jerk = detector();
        assert!(jerk.detect((1.0, 0.0, 0.0), 1_000).is_some());
        assert!(jerk.detect((0.0, 0.0, 0.0), 1_100).is_none());
        assert!(jerk.detect((1.0, 0.0, 0.0), 1_250).is_none());
        // Previous reading is now (1, 0, 0): a jump back to zero is negative X.
        let event = jerk.detect((0.0, 0.0, 0.0), 1_251).expect("cooldown elapsed");
        assert_eq!(event.label(), "X-");
    }

    #[test]
    fn events_never_closer_than_cooldown() {
        let mut jerk = detector();
        let mut fired = Vec::new();
        for step in 0..200u64 {
            let now_ms = step * 20;
            let accel = if step % 2 == 0 { (1.0, 0.0, 0.0) } else { (-1.0, 0.0, 0.0) };
            if let Some(event) = jerk.detect(accel, now_ms) {
                fired.push(event.t_ms);
            }
        }
        assert!(fired.len() > 1);
        assert!(fired.windows(2).all(|pair| pair[1] - pair[0] > 250));
    }
}
