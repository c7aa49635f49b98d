use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;

use super::{
    config::EngineConfig,
    error::{ConfigError, EngineError},
    jerk::JerkDetector,
    recognizer::GestureRecognizer,
    store::GestureTemplate,
    types::{EngineState, IngestOutcome, Sample, SampleInput},
};

/// Entry point for the transport layer: samples in, jerk and gesture events out.
pub struct GestureEngine {
    jerk: JerkDetector,
    recognizer: GestureRecognizer,
    packet_count: u64,
    last_sample_ms: Option<u64>,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}

impl GestureEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        Self {
            jerk: JerkDetector::from_config(&config),
            recognizer: GestureRecognizer::new(config),
            packet_count: 0,
            last_sample_ms: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.recognizer.config()
    }

    /// Runs one reading through jerk detection and the recognizer.
    ///
    /// Rejected samples leave every counter and buffer untouched.
    pub fn ingest(&mut self, sample: Sample) -> Result<IngestOutcome, EngineError> {
        self.validate(&sample).inspect_err(|err| warn!("sample rejected: {err}"))?;
        self.last_sample_ms = Some(sample.t_ms);

        let jerk = self.jerk.detect(sample.accel, sample.t_ms);
        let recorded = self.recognizer.add_data(sample);
        let gesture = if self.recognizer.is_recording() {
            None
        } else {
            self.recognizer.recognize()
        };
        self.packet_count += 1;

        Ok(IngestOutcome {
            jerk,
            gesture,
            recorded,
            state: self.snapshot(),
        })
    }

    /// Convenience for wire payloads; `arrival_ms` stamps readings without a timestamp.
    pub fn ingest_input(
        &mut self,
        input: SampleInput,
        arrival_ms: u64,
    ) -> Result<IngestOutcome, EngineError> {
        self.ingest(input.into_sample(arrival_ms))
    }

    pub fn start_record(&mut self, name: &str) -> Result<EngineState, EngineError> {
        self.recognizer.start_record(name)?;
        Ok(self.snapshot())
    }

    pub fn snapshot(&self) -> EngineState {
        EngineState {
            recording: self.recognizer.is_recording(),
            active_gesture: self.recognizer.active_gesture().to_owned(),
            packet_count: self.packet_count,
        }
    }

    pub fn template_names(&self) -> Vec<String> {
        self.recognizer.store().names()
    }

    pub fn template(&self, name: &str) -> Option<&GestureTemplate> {
        self.recognizer.store().get(name)
    }

    fn validate(&self, sample: &Sample) -> Result<(), EngineError> {
        if let Some(channel) = sample.first_non_finite_channel() {
            return Err(EngineError::MalformedSample { channel });
        }
        match self.last_sample_ms {
            Some(last_ms) if sample.t_ms <= last_ms => Err(EngineError::OutOfOrderSample {
                t_ms: sample.t_ms,
                last_ms,
            }),
            _ => Ok(()),
        }
    }
}

/// Serializes engine access for multi-threaded transports.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<GestureEngine>>,
}

impl SharedEngine {
    pub fn new(engine: GestureEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn ingest(&self, sample: Sample) -> Result<IngestOutcome, EngineError> {
        self.lock().ingest(sample)
    }

    pub fn start_record(&self, name: &str) -> Result<EngineState, EngineError> {
        self.lock().start_record(name)
    }

    pub fn snapshot(&self) -> EngineState {
        self.lock().snapshot()
    }

    // A panic inside the engine is an invariant failure; the state behind the
    // lock is still the last consistent one.
    fn lock(&self) -> MutexGuard<'_, GestureEngine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
