//! Wake-command detector
//!
//! Owns the wake window, bridges a transcription source to the host event
//! sink, and answers every source event with an explicit directive. The
//! detector never restarts the source itself; the event-loop driver acts on
//! the returned [`SourceDirective`], which keeps the detector free of the
//! engine's lifecycle and re-entrancy quirks.

use crate::state::{DetectionEvent, WakeWindow};
use speech_stream::{ListenConfig, SourceError, SourceEvent, TranscriptionSource};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Detector errors
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Transcription source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Detector configuration
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    /// Recognition session parameters handed to the source
    pub listen: ListenConfig,
}

impl DetectorConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.listen.locale.is_empty() {
            return Err(DetectorError::InvalidConfig(
                "listen locale must not be empty".to_string(),
            ));
        }
        if self.listen.max_alternatives == 0 {
            return Err(DetectorError::InvalidConfig(
                "max_alternatives must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Instruction for the event-loop driver after one source event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDirective {
    /// Keep consuming the current recognition pass
    Continue,

    /// Start a new recognition pass on the source
    Restart,

    /// The detector is stopped; cease driving the source
    Stop,
}

/// Detector state behind the mutex
struct DetectorState {
    window: WakeWindow,
    running: bool,
    session: u64,
    transcripts_seen: u64,
    wakes_detected: u64,
    commands_detected: u64,
}

/// Wake-word/command detector
pub struct WakeCommandDetector {
    config: DetectorConfig,
    source: Arc<dyn TranscriptionSource>,
    state: Mutex<DetectorState>,
    event_tx: mpsc::UnboundedSender<DetectionEvent>,
    event_rx: Mutex<mpsc::UnboundedReceiver<DetectionEvent>>,
}

impl WakeCommandDetector {
    /// Create a new detector over the given transcription source
    pub fn new(
        config: DetectorConfig,
        source: Arc<dyn TranscriptionSource>,
    ) -> Result<Self, DetectorError> {
        config.validate()?;

        info!(locale = %config.listen.locale, "initializing wake-command detector");

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let state = DetectorState {
            window: WakeWindow::new(),
            running: false,
            session: 0,
            transcripts_seen: 0,
            wakes_detected: 0,
            commands_detected: 0,
        };

        Ok(Self {
            config,
            source,
            state: Mutex::new(state),
            event_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    /// Start a listening session.
    ///
    /// Idempotent: an already-running detector is fully stopped first so a
    /// session can never have duplicate listeners. If the source cannot run,
    /// the error is surfaced and no detector state changes.
    pub async fn start(
        &self,
        events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<(), DetectorError> {
        let was_running = { self.state.lock().await.running };
        if was_running {
            warn!("start while running, stopping previous session first");
            self.stop().await;
        }

        self.source.start(&self.config.listen, events).await?;

        let mut state = self.state.lock().await;
        state.running = true;
        state.session += 1;
        state.window.reset();
        info!(session = state.session, "wake-command detector listening");
        Ok(())
    }

    /// Stop listening.
    ///
    /// Always succeeds and is safe to call at any time; the wake window is
    /// left disarmed even when the detector was not running. Source teardown
    /// is best-effort and independent of the state reset.
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock().await;
            state.running = false;
            state.window.reset();
        }
        self.source.stop().await;
        info!("wake-command detector stopped");
    }

    /// Feed one source event through the detector.
    ///
    /// Invoked in delivery order, never concurrently for one detector. Late
    /// events from a source that was already stopped are ignored.
    pub async fn on_source_event(&self, event: SourceEvent) -> SourceDirective {
        let mut state = self.state.lock().await;

        if !state.running {
            debug!("ignoring source event after stop");
            return SourceDirective::Stop;
        }

        match event {
            SourceEvent::Transcript(transcript) => {
                state.transcripts_seen += 1;
                let is_partial = transcript.is_partial;

                let detections = state.window.on_transcript(&transcript);
                for detection in &detections {
                    match detection {
                        DetectionEvent::WakeWordDetected { .. } => state.wakes_detected += 1,
                        DetectionEvent::CommandDetected { .. } => state.commands_detected += 1,
                        DetectionEvent::SpeechHeard { .. } => {}
                    }
                }
                for detection in detections {
                    if self.event_tx.send(detection).is_err() {
                        warn!("detection receiver dropped");
                    }
                }

                if is_partial {
                    SourceDirective::Continue
                } else {
                    // The engine ends its pass after a final result; the
                    // driver starts the next pass to keep listening.
                    SourceDirective::Restart
                }
            }
            SourceEvent::Error { message } => {
                // Transient engine failure: restart the pass. The wake
                // window is deliberately left as-is so an armed window
                // survives the hiccup.
                warn!(%message, "transcription error, requesting restart");
                SourceDirective::Restart
            }
            SourceEvent::EndOfSpeech => SourceDirective::Restart,
        }
    }

    /// Next detection, waiting until one arrives
    pub async fn recv_event(&self) -> Option<DetectionEvent> {
        let mut rx = self.event_rx.lock().await;
        rx.recv().await
    }

    /// Next detection if one is already queued
    pub async fn try_recv_event(&self) -> Option<DetectionEvent> {
        let mut rx = self.event_rx.lock().await;
        rx.try_recv().ok()
    }

    /// Current statistics
    pub async fn stats(&self) -> DetectorStats {
        let state = self.state.lock().await;
        DetectorStats {
            running: state.running,
            armed: state.window.is_armed(),
            session: state.session,
            transcripts_seen: state.transcripts_seen,
            wakes_detected: state.wakes_detected,
            commands_detected: state.commands_detected,
        }
    }
}

/// Detector statistics
#[derive(Debug, Clone)]
pub struct DetectorStats {
    pub running: bool,
    pub armed: bool,
    pub session: u64,
    pub transcripts_seen: u64,
    pub wakes_detected: u64,
    pub commands_detected: u64,
}
