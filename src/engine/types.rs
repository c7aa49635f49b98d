use serde::{Deserialize, Serialize};

/// One sensor reading: orientation angles, acceleration, arrival time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub angle: (f64, f64, f64),
    pub accel: (f64, f64, f64),
    pub t_ms: u64,
}

impl Sample {
    pub const CHANNELS: usize = 6;
    pub const CHANNEL_NAMES: [&'static str; Self::CHANNELS] = [
        "angle_x", "angle_y", "angle_z", "accel_x", "accel_y", "accel_z",
    ];

    pub const fn new(angle: (f64, f64, f64), accel: (f64, f64, f64), t_ms: u64) -> Self {
        Self { angle, accel, t_ms }
    }

    pub const fn channels(&self) -> [f64; Self::CHANNELS] {
        [
            self.angle.0,
            self.angle.1,
            self.angle.2,
            self.accel.0,
            self.accel.1,
            self.accel.2,
        ]
    }

    /// Name of the first non-finite channel, if any.
    pub fn first_non_finite_channel(&self) -> Option<&'static str> {
        self.channels()
            .iter()
            .zip(Self::CHANNEL_NAMES)
            .find(|(value, _)| !value.is_finite())
            .map(|(_, name)| name)
    }

    /// Euclidean norm of the acceleration change from `prev` to `self`.
    pub fn accel_delta_norm(&self, prev: &Sample) -> f64 {
        let dx = self.accel.0 - prev.accel.0;
        let dy = self.accel.1 - prev.accel.1;
        let dz = self.accel.2 - prev.accel.2;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Wire shape of an inbound reading, field-compatible with the sensor's JSON body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleInput {
    pub angle_x: f64,
    pub angle_y: f64,
    pub angle_z: f64,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_ms: Option<u64>,
}

impl SampleInput {
    /// Source timestamp wins; `arrival_ms` stamps readings that carry none.
    pub fn into_sample(self, arrival_ms: u64) -> Sample {
        Sample::new(
            (self.angle_x, self.angle_y, self.angle_z),
            (self.accel_x, self.accel_y, self.accel_z),
            self.t_ms.unwrap_or(arrival_ms),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub const fn sign(self) -> char {
        match self {
            Self::Positive => '+',
            Self::Negative => '-',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JerkEvent {
    pub axis: Axis,
    pub direction: Direction,
    pub magnitude: f64,
    pub t_ms: u64,
}

impl JerkEvent {
    /// Compact form such as `X+` or `Z-`.
    pub fn label(&self) -> String {
        format!("{}{}", self.axis.as_str(), self.direction.sign())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub recording: bool,
    pub active_gesture: String,
    pub packet_count: u64,
}

/// Everything one `ingest` call produced, for the transport to relay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestOutcome {
    pub jerk: Option<JerkEvent>,
    pub gesture: Option<String>,
    /// Name of the template whose recording session completed on this sample.
    pub recorded: Option<String>,
    pub state: EngineState,
}

impl IngestOutcome {
    pub fn payload(&self) -> StatePayload {
        StatePayload::new(&self.state, self.jerk.as_ref())
    }
}

/// Broadcast body; `jerk` is omitted on samples without one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatePayload {
    pub packets: u64,
    pub recording: bool,
    pub last_gesture: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jerk: Option<String>,
}

impl StatePayload {
    pub fn new(state: &EngineState, jerk: Option<&JerkEvent>) -> Self {
        Self {
            packets: state.packet_count,
            recording: state.recording,
            last_gesture: state.active_gesture.clone(),
            jerk: jerk.map(JerkEvent::label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_without_timestamp_uses_arrival_time() {
        let input = SampleInput {
            angle_x: 1.0,
            accel_z: -1.0,
            ..SampleInput::default()
        };
        let sample = input.into_sample(4_200);
        assert_eq!(sample.t_ms, 4_200);
        assert_eq!(sample.angle, (1.0, 0.0, 0.0));
        assert_eq!(sample.accel, (0.0, 0.0, -1.0));

        let stamped = SampleInput {
            t_ms: Some(17),
            ..input
        };
        assert_eq!(stamped.into_sample(4_200).t_ms, 17);
    }

    #[test]
    fn non_finite_channel_is_named() {
        let sample = Sample::new((0.0, 0.0, 0.0), (0.0, f64::NAN, 0.0), 1);
        assert_eq!(sample.first_non_finite_channel(), Some("accel_y"));
        assert_eq!(Sample::default().first_non_finite_channel(), None);
    }

    #[test]
    fn payload_omits_missing_jerk() {
        let state = EngineState {
            recording: false,
            active_gesture: "swipe".into(),
            packet_count: 3,
        };
        let payload = StatePayload::new(&state, None);
        assert_eq!(payload.packets, 3);
        assert_eq!(payload.last_gesture, "swipe");
        assert!(payload.jerk.is_none());

        let jerk = JerkEvent {
            axis: Axis::Z,
            direction: Direction::Negative,
            magnitude: 1.2,
            t_ms: 10,
        };
        assert_eq!(StatePayload::new(&state, Some(&jerk)).jerk.as_deref(), Some("Z-"));
    }
}
