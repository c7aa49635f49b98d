pub mod buffer;
pub mod config;
pub mod error;
pub mod facade;
pub mod jerk;
pub mod matching;
pub mod recognizer;
pub mod store;
pub mod types;

pub use config::{CompletionPolicy, EngineConfig};
pub use error::{ConfigError, EngineError};
pub use facade::{GestureEngine, SharedEngine};
pub use jerk::JerkDetector;
pub use recognizer::GestureRecognizer;
pub use store::{GestureStore, GestureTemplate};
pub use types::{
    Axis, Direction, EngineState, IngestOutcome, JerkEvent, Sample, SampleInput, StatePayload,
};
