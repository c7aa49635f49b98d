use super::types::Sample;

/// Six-channel trace resampled to evenly spaced instants between its first and
/// last sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    channels: [Vec<f64>; Sample::CHANNELS],
}

impl Profile {
    pub fn resample(samples: &[Sample], points: usize) -> Self {
        let mut channels: [Vec<f64>; Sample::CHANNELS] =
            std::array::from_fn(|_| Vec::with_capacity(points));

        let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
            return Self { channels };
        };
        let t0 = first.t_ms as f64;
        let span = (last.t_ms - first.t_ms) as f64;
        let steps = points.saturating_sub(1).max(1) as f64;

        let mut cursor = 0usize;
        for idx in 0..points {
            let target = t0 + span * (idx as f64 / steps);
            while cursor + 2 < samples.len() && (samples[cursor + 1].t_ms as f64) < target {
                cursor += 1;
            }
            let values = interpolate(samples, cursor, target);
            for (channel, value) in channels.iter_mut().zip(values) {
                channel.push(value);
            }
        }

        Self { channels }
    }

    pub fn points(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, idx: usize) -> &[f64] {
        &self.channels[idx]
    }

    /// Sum over channels of the mean squared difference, each channel scaled by
    /// the larger of the two variances plus `variance_floor`.
    pub fn distance(&self, other: &Profile, variance_floor: f64) -> f64 {
        debug_assert_eq!(self.points(), other.points());
        let points = self.points().min(other.points());
        if points == 0 {
            return f64::INFINITY;
        }

        self.channels
            .iter()
            .zip(other.channels.iter())
            .map(|(a, b)| {
                let scale = variance(a).max(variance(b)) + variance_floor;
                let sq: f64 = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum();
                sq / (points as f64 * scale)
            })
            .sum()
    }
}

fn interpolate(samples: &[Sample], cursor: usize, target: f64) -> [f64; Sample::CHANNELS] {
    let a = &samples[cursor];
    let Some(b) = samples.get(cursor + 1) else {
        return a.channels();
    };
    let (ta, tb) = (a.t_ms as f64, b.t_ms as f64);
    let frac = ((target - ta) / (tb - ta)).clamp(0.0, 1.0);

    let (ca, cb) = (a.channels(), b.channels());
    std::array::from_fn(|i| ca[i] + (cb[i] - ca[i]) * frac)
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<'a> {
    pub name: &'a str,
    pub distance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchVerdict {
    Accepted,
    TooFar,
    Ambiguous,
}

/// Accepts the best candidate when it is under `threshold` and beats the
/// runner-up by at least `margin`.
pub fn judge(best: f64, second: Option<f64>, threshold: f64, margin: f64) -> MatchVerdict {
    if best.is_nan() || best >= threshold {
        return MatchVerdict::TooFar;
    }
    match second {
        Some(second) if second - best < margin => MatchVerdict::Ambiguous,
        _ => MatchVerdict::Accepted,
    }
}

/// Best and runner-up among scored candidates.
pub fn rank<'a, I>(scored: I) -> (Option<Candidate<'a>>, Option<f64>)
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    let mut best: Option<Candidate<'a>> = None;
    let mut second: Option<f64> = None;
    for candidate in scored {
        match &best {
            Some(current) if candidate.distance >= current.distance => {
                if second.is_none_or(|s| candidate.distance < s) {
                    second = Some(candidate.distance);
                }
            }
            _ => {
                second = best.as_ref().map(|b| b.distance);
                best = Some(candidate);
            }
        }
    }
    (best, second)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn ramp(len: u64, period_ms: u64) -> Vec<Sample> {
        (0..len)
            .map(|i| {
                let v = i as f64;
                Sample::new((v, 0.0, 0.0), (0.0, v * 0.1, 1.0), i * period_ms)
            })
            .collect()
    }

    #[test]
    fn resampling_interpolates_linearly_in_time() {
        let profile = Profile::resample(&ramp(11, 10), 5);
        assert_eq!(profile.points(), 5);
        let angle_x = profile.channel(0);
        for (got, want) in angle_x.iter().zip([0.0, 2.5, 5.0, 7.5, 10.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
        assert!(profile.channel(5).iter().all(|v| *v == 1.0));
    }

    #[test]
    fn resampling_removes_rate_dependence() {
        let slow = Profile::resample(&ramp(21, 10), 16);
        let fast: Vec<Sample> = ramp(11, 20)
            .into_iter()
            .map(|s| Sample::new((s.angle.0 * 2.0, 0.0, 0.0), (0.0, s.accel.1 * 2.0, 1.0), s.t_ms))
            .collect();
        let fast = Profile::resample(&fast, 16);
        assert_relative_eq!(slow.distance(&fast, 0.05), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn single_sample_repeats() {
        let one = [Sample::new((1.0, 2.0, 3.0), (4.0, 5.0, 6.0), 7)];
        let profile = Profile::resample(&one, 4);
        assert_eq!(profile.channel(2), &[3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn flat_trace_is_far_from_moving_trace() {
        let moving = Profile::resample(&ramp(32, 10), 32);
        let flat: Vec<Sample> = (0..32)
            .map(|i| Sample::new((0.0, 0.0, 0.0), (0.0, 0.0, 1.0), i * 10))
            .collect();
        let flat = Profile::resample(&flat, 32);
        assert!(moving.distance(&flat, 0.05) > 1.0);
        assert_relative_eq!(flat.distance(&flat, 0.05), 0.0);
    }

    #[test]
    fn judge_applies_threshold_and_margin() {
        assert_eq!(judge(0.1, None, 0.35, 0.1), MatchVerdict::Accepted);
        assert_eq!(judge(0.1, Some(0.5), 0.35, 0.1), MatchVerdict::Accepted);
        assert_eq!(judge(0.1, Some(0.15), 0.35, 0.1), MatchVerdict::Ambiguous);
        assert_eq!(judge(0.4, None, 0.35, 0.1), MatchVerdict::TooFar);
        assert_eq!(judge(f64::NAN, None, 0.35, 0.1), MatchVerdict::TooFar);
    }

    #[test]
    fn rank_tracks_runner_up() {
        let scored = [
            Candidate { name: "a", distance: 0.7 },
            Candidate { name: "b", distance: 0.2 },
            Candidate { name: "c", distance: 0.4 },
        ];
        let (best, second) = rank(scored);
        assert_eq!(best.map(|b| b.name), Some("b"));
        assert_eq!(second, Some(0.4));
    }
}
