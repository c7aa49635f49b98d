use log::{debug, info};
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    buffer::GestureBuffer,
    config::EngineConfig,
    error::EngineError,
    matching::{judge, rank, Candidate, MatchVerdict, Profile},
    store::{GestureStore, GestureTemplate},
    types::Sample,
};

#[derive(Clone, Debug)]
enum RecognizerEvent {
    StartRecord(String),
    Data(Sample),
    Recognize,
}

#[derive(Default)]
struct DispatchContext {
    recorded: Option<String>,
    matched: Option<String>,
}

/// Record/recognize state machine. `Idle` keeps a rolling window and matches it
/// against stored templates; `Recording` captures samples into a new template.
pub struct GestureRecognizer {
    machine: statig::blocking::StateMachine<RecognizerHsm>,
}

impl GestureRecognizer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            machine: RecognizerHsm::new(config).state_machine(),
        }
    }

    /// Enters `Recording(name)` from any state, discarding any session in progress.
    pub fn start_record(&mut self, name: &str) -> Result<(), EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::EmptyGestureName);
        }
        self.dispatch(RecognizerEvent::StartRecord(name.to_owned()));
        Ok(())
    }

    /// Appends one sample. Returns the template name when this sample
    /// completed a recording session.
    pub fn add_data(&mut self, sample: Sample) -> Option<String> {
        self.dispatch(RecognizerEvent::Data(sample)).recorded
    }

    /// Matches the rolling window against the store. Always `None` while recording.
    pub fn recognize(&mut self) -> Option<String> {
        self.dispatch(RecognizerEvent::Recognize).matched
    }

    pub fn is_recording(&self) -> bool {
        self.machine.inner().recording
    }

    pub fn active_gesture(&self) -> &str {
        &self.machine.inner().active_gesture
    }

    pub fn store(&self) -> &GestureStore {
        &self.machine.inner().store
    }

    pub fn window(&self) -> &GestureBuffer {
        &self.machine.inner().buffer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.machine.inner().config
    }

    fn dispatch(&mut self, event: RecognizerEvent) -> DispatchContext {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context
    }
}

struct RecognizerHsm {
    config: EngineConfig,
    buffer: GestureBuffer,
    store: GestureStore,
    recording: bool,
    active_gesture: String,
    empty_store_reported: bool,
}

impl RecognizerHsm {
    fn new(config: EngineConfig) -> Self {
        let buffer = GestureBuffer::new(config.max_window_ms(), config.max_window_samples);
        Self {
            config,
            buffer,
            store: GestureStore::new(),
            recording: false,
            active_gesture: String::new(),
            empty_store_reported: false,
        }
    }

    fn begin_session(&mut self, name: &str) {
        if self.recording {
            info!(
                "recording restarted as `{name}`, dropping {} samples",
                self.buffer.len()
            );
        } else {
            info!("recording `{name}`");
        }
        self.buffer.clear();
        self.active_gesture.clear();
        self.recording = true;
    }

    fn session_complete(&self, quiet_since_ms: Option<u64>) -> bool {
        if self.buffer.is_full() {
            return true;
        }
        if !self.config.completion.uses_stillness() {
            return false;
        }
        let Some(last) = self.buffer.last() else {
            return false;
        };
        self.buffer.span_ms() >= self.config.min_window_ms()
            && quiet_since_ms
                .is_some_and(|since| last.t_ms.saturating_sub(since) >= self.config.quiet_ms())
    }

    fn exceeds_window(&self, sample: &Sample) -> bool {
        self.buffer
            .started_at_ms()
            .is_some_and(|start| sample.t_ms.saturating_sub(start) > self.config.max_window_ms())
    }

    fn finish_session(&mut self, name: String) {
        let samples = self.buffer.take();
        let count = samples.len();
        let template = GestureTemplate::new(name, samples, self.config.resample_points);
        info!("recorded `{}` with {count} samples", template.name());
        if let Some(previous) = self.store.insert(template) {
            info!("replaced previous `{}` template", previous.name());
        }
        self.recording = false;
        self.empty_store_reported = false;
    }

    fn recognize_window(&mut self) -> Option<String> {
        if self.store.is_empty() {
            if !self.empty_store_reported {
                debug!("no gesture templates recorded yet");
                self.empty_store_reported = true;
            }
            return None;
        }
        if self.buffer.len() < 2 || self.buffer.span_ms() < self.config.min_window_ms() {
            return None;
        }

        let live = Profile::resample(self.buffer.samples(), self.config.resample_points);
        let floor = self.config.variance_floor;
        let (best, second) = rank(self.store.iter().map(|template| Candidate {
            name: template.name(),
            distance: live.distance(template.profile(), floor),
        }));
        let best = best?;

        let verdict = judge(
            best.distance,
            second,
            self.config.recognition_distance_threshold,
            self.config.recognition_margin,
        );
        if verdict != MatchVerdict::Accepted {
            debug!(
                "best candidate `{}` at {:.3} rejected: {verdict:?}",
                best.name, best.distance
            );
            return None;
        }

        let name = best.name.to_owned();
        info!("gesture detected: {name} (distance {:.3})", best.distance);
        self.active_gesture.clone_from(&name);
        self.buffer.clear();
        Some(name)
    }
}

#[state_machine(initial = "State::idle()")]
impl RecognizerHsm {
    #[state(superstate = "session")]
    fn idle(&mut self, context: &mut DispatchContext, event: &RecognizerEvent) -> Outcome<State> {
        match event {
            RecognizerEvent::Data(sample) => {
                self.buffer.append_rolling(*sample);
                Handled
            }
            RecognizerEvent::Recognize => {
                context.matched = self.recognize_window();
                Handled
            }
            RecognizerEvent::StartRecord(_) => Super,
        }
    }

    #[state(superstate = "session")]
    fn recording(
        &mut self,
        context: &mut DispatchContext,
        name: &mut String,
        quiet_since_ms: &mut Option<u64>,
        event: &RecognizerEvent,
    ) -> Outcome<State> {
        match event {
            RecognizerEvent::Data(sample) => {
                if self.exceeds_window(sample) {
                    // A gap past the window cap ends the session with what is held;
                    // the late sample starts the rolling window instead.
                    let name = std::mem::take(name);
                    self.finish_session(name.clone());
                    self.buffer.append_rolling(*sample);
                    context.recorded = Some(name);
                    return Transition(State::idle());
                }
                if let Some(prev) = self.buffer.last() {
                    if sample.accel_delta_norm(prev) < self.config.quiet_threshold {
                        quiet_since_ms.get_or_insert(prev.t_ms);
                    } else {
                        *quiet_since_ms = None;
                    }
                }
                self.buffer.append(*sample);

                if !self.session_complete(*quiet_since_ms) {
                    return Handled;
                }
                let name = std::mem::take(name);
                self.finish_session(name.clone());
                context.recorded = Some(name);
                Transition(State::idle())
            }
            RecognizerEvent::Recognize => Handled,
            RecognizerEvent::StartRecord(_) => Super,
        }
    }

    #[superstate]
    fn session(&mut self, context: &mut DispatchContext, event: &RecognizerEvent) -> Outcome<State> {
        let _ = context;
        match event {
            RecognizerEvent::StartRecord(name) => {
                self.begin_session(name);
                Transition(State::recording(name.clone(), None))
            }
            _ => Handled,
        }
    }
}
