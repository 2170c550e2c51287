//! Scripted transcription source
//!
//! Replays a predefined transcript on a background task in place of a real
//! speech engine. Entry offsets become event timestamps, which keeps
//! time-window behavior deterministic under test.

use crate::source::{ListenConfig, SourceError, SourceEvent, TranscriptEvent, TranscriptionSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// One scripted utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Offset from script start, in milliseconds
    pub at_ms: u64,

    /// Text delivered at the offset
    pub text: String,

    /// Deliver as a partial hypothesis instead of a final result
    #[serde(default)]
    pub partial: bool,
}

/// A replayable transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptScript {
    pub entries: Vec<ScriptEntry>,
}

impl TranscriptScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a final result at `at_ms`
    pub fn say(mut self, at_ms: u64, text: impl Into<String>) -> Self {
        self.entries.push(ScriptEntry {
            at_ms,
            text: text.into(),
            partial: false,
        });
        self
    }

    /// Append a partial hypothesis at `at_ms`
    pub fn hypothesize(mut self, at_ms: u64, text: impl Into<String>) -> Self {
        self.entries.push(ScriptEntry {
            at_ms,
            text: text.into(),
            partial: true,
        });
        self
    }

    /// Load a script from its JSON form
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map_err(|e| SourceError::InvalidScript(e.to_string()))
    }

    /// Export the script as pretty JSON
    pub fn to_json(&self) -> Result<String, SourceError> {
        serde_json::to_string_pretty(self).map_err(|e| SourceError::InvalidScript(e.to_string()))
    }
}

struct Running {
    task: JoinHandle<()>,
}

/// Transcription source backed by a [`TranscriptScript`]
pub struct ScriptedSource {
    script: TranscriptScript,
    /// Pace delivery to the entry offsets instead of delivering immediately
    realtime: bool,
    running: Mutex<Option<Running>>,
}

impl ScriptedSource {
    /// Source that paces entries to their offsets in wall-clock time
    pub fn new(script: TranscriptScript) -> Self {
        Self {
            script,
            realtime: true,
            running: Mutex::new(None),
        }
    }

    /// Source that delivers the whole script as fast as the consumer reads it
    pub fn immediate(script: TranscriptScript) -> Self {
        Self {
            script,
            realtime: false,
            running: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TranscriptionSource for ScriptedSource {
    async fn start(
        &self,
        config: &ListenConfig,
        events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<(), SourceError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(SourceError::AlreadyRunning);
        }

        debug!(
            locale = %config.locale,
            entries = self.script.entries.len(),
            "scripted source starting"
        );

        let entries = self.script.entries.clone();
        let partials_enabled = config.partial_results;
        let realtime = self.realtime;

        let task = tokio::spawn(async move {
            let mut elapsed = 0u64;
            for entry in entries {
                if realtime && entry.at_ms > elapsed {
                    sleep(Duration::from_millis(entry.at_ms - elapsed)).await;
                }
                elapsed = elapsed.max(entry.at_ms);

                if entry.partial && !partials_enabled {
                    continue;
                }

                let transcript = TranscriptEvent {
                    text: entry.text,
                    is_partial: entry.partial,
                    timestamp_ms: entry.at_ms,
                };
                if events.send(SourceEvent::Transcript(transcript)).is_err() {
                    warn!("event receiver dropped, ending script early");
                    return;
                }
            }
            // Script exhausted: report end of speech, then close the channel
            // by dropping the sender.
            let _ = events.send(SourceEvent::EndOfSpeech);
        });

        *running = Some(Running { task });
        Ok(())
    }

    async fn restart(&self) -> Result<(), SourceError> {
        // A new pass on an exhausted script has nothing left to say.
        let running = self.running.lock().await;
        if running.is_none() {
            return Err(SourceError::NotRunning);
        }
        Ok(())
    }

    async fn stop(&self) {
        let mut running = self.running.lock().await;
        if let Some(Running { task }) = running.take() {
            task.abort();
            debug!("scripted source stopped");
        }
    }
}
