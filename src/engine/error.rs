use std::path::PathBuf;

use thiserror::Error;

/// Input rejected before it reaches the detectors. Engine state is untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("malformed sample: channel `{channel}` is not finite")]
    MalformedSample { channel: &'static str },

    #[error("out-of-order sample: t_ms {t_ms} does not follow {last_ms}")]
    OutOfOrderSample { t_ms: u64, last_ms: u64 },

    #[error("gesture name must not be empty")]
    EmptyGestureName,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("validation error: {0}")]
    Validation(String),
}
