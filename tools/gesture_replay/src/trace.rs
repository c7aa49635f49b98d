use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use gesture_engine::{GestureEngine, Sample};
use log::warn;
use serde::Serialize;

pub const SAMPLE_HEADER: &str = "sample,t_ms,angle_x,angle_y,angle_z,accel_x,accel_y,accel_z";

/// One line of a captured trace.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceLine {
    Sample(Sample),
    Record { t_ms: u64, name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Jerk,
    Recorded,
    Gesture,
    Rejected,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jerk => "jerk",
            Self::Recorded => "recorded",
            Self::Gesture => "gesture",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReplayEvent {
    pub t_ms: u64,
    pub kind: EventKind,
    pub detail: String,
}

impl ReplayEvent {
    /// Token compared against `--expect` files, e.g. `jerk:X+` or `gesture:swipe`.
    pub fn token(&self) -> String {
        match self.kind {
            EventKind::Rejected => self.kind.as_str().to_owned(),
            _ => format!("{}:{}", self.kind.as_str(), self.detail),
        }
    }
}

pub fn parse_trace(path: &Path) -> Result<Vec<TraceLine>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_trace_str(&text).with_context(|| format!("invalid trace {}", path.display()))
}

pub fn parse_trace_str(text: &str) -> Result<Vec<TraceLine>> {
    let mut out = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == SAMPLE_HEADER {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        match parts.as_slice() {
            ["sample", t_ms, channels @ ..] => {
                if channels.len() != Sample::CHANNELS {
                    bail!(
                        "line {line_no}: expected {} channels, found {}",
                        Sample::CHANNELS,
                        channels.len()
                    );
                }
                let mut values = [0.0f64; Sample::CHANNELS];
                for ((slot, raw), field) in values.iter_mut().zip(channels).zip(Sample::CHANNEL_NAMES)
                {
                    *slot = raw
                        .parse::<f64>()
                        .with_context(|| format!("line {line_no}: invalid {field} '{raw}'"))?;
                }
                out.push(TraceLine::Sample(Sample::new(
                    (values[0], values[1], values[2]),
                    (values[3], values[4], values[5]),
                    parse_ms(t_ms, line_no)?,
                )));
            }
            ["record", t_ms, name] => out.push(TraceLine::Record {
                t_ms: parse_ms(t_ms, line_no)?,
                name: (*name).to_owned(),
            }),
            ["record", ..] => bail!("line {line_no}: expected record,t_ms,name"),
            [kind, ..] => bail!("line {line_no}: unknown trace line kind '{kind}'"),
            [] => {}
        }
    }
    Ok(out)
}

fn parse_ms(raw: &str, line_no: usize) -> Result<u64> {
    raw.parse::<u64>()
        .with_context(|| format!("line {line_no}: invalid t_ms '{raw}'"))
}

/// Feeds the trace through `engine` and collects everything it emitted.
///
/// Rejected samples are reported as events rather than aborting the replay.
pub fn replay(engine: &mut GestureEngine, lines: &[TraceLine]) -> Result<Vec<ReplayEvent>> {
    let mut events = Vec::new();
    for line in lines {
        match line {
            TraceLine::Record { t_ms, name } => {
                engine
                    .start_record(name)
                    .with_context(|| format!("record command at {t_ms} ms"))?;
            }
            TraceLine::Sample(sample) => match engine.ingest(*sample) {
                Ok(outcome) => {
                    if let Some(jerk) = outcome.jerk {
                        events.push(ReplayEvent {
                            t_ms: sample.t_ms,
                            kind: EventKind::Jerk,
                            detail: jerk.label(),
                        });
                    }
                    if let Some(name) = outcome.recorded {
                        events.push(ReplayEvent {
                            t_ms: sample.t_ms,
                            kind: EventKind::Recorded,
                            detail: name,
                        });
                    }
                    if let Some(name) = outcome.gesture {
                        events.push(ReplayEvent {
                            t_ms: sample.t_ms,
                            kind: EventKind::Gesture,
                            detail: name,
                        });
                    }
                }
                Err(err) => {
                    warn!("skipping sample at {} ms: {err}", sample.t_ms);
                    events.push(ReplayEvent {
                        t_ms: sample.t_ms,
                        kind: EventKind::Rejected,
                        detail: err.to_string(),
                    });
                }
            },
        }
    }
    Ok(events)
}

pub fn parse_expected(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.starts_with('#'))
        .map(str::to_owned)
        .collect())
}
