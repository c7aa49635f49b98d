//! Motion gesture engine: turns a stream of orientation and acceleration
//! samples into jerk events and recognized, user-trained gestures.
//!
//! The transport (HTTP, sockets, serial) stays outside this crate. It feeds
//! [`Sample`]s into a [`GestureEngine`] and relays each [`IngestOutcome`].

pub mod engine;

pub use engine::{
    Axis, CompletionPolicy, ConfigError, Direction, EngineConfig, EngineError, EngineState,
    GestureEngine, GestureRecognizer, IngestOutcome, JerkEvent, Sample, SampleInput,
    SharedEngine, StatePayload,
};
