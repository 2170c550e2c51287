//! Stdin transcription source
//!
//! Interactive stand-in for a speech engine: each line typed on stdin is
//! delivered as a final result. Prefix a line with `p:` to deliver it as a
//! partial hypothesis, or with `!` to simulate a transient engine error.

use crate::source::{
    now_ms, ListenConfig, SourceError, SourceEvent, TranscriptEvent, TranscriptionSource,
};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Parsed form of one stdin line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line {
    Partial(String),
    Final(String),
    EngineError(String),
    Skip,
}

pub(crate) fn parse_line(line: &str) -> Line {
    let line = line.trim();
    if line.is_empty() {
        return Line::Skip;
    }
    if let Some(rest) = line.strip_prefix("p:") {
        return Line::Partial(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix('!') {
        return Line::EngineError(rest.trim().to_string());
    }
    Line::Final(line.to_string())
}

struct Running {
    task: JoinHandle<()>,
}

/// Transcription source that reads transcript lines from stdin
pub struct StdinSource {
    running: Mutex<Option<Running>>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            running: Mutex::new(None),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionSource for StdinSource {
    async fn start(
        &self,
        config: &ListenConfig,
        events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<(), SourceError> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(SourceError::AlreadyRunning);
        }

        debug!(locale = %config.locale, "stdin source starting");
        let partials_enabled = config.partial_results;

        let task = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let event = match parse_line(&line) {
                            Line::Skip => continue,
                            Line::Partial(_) if !partials_enabled => continue,
                            Line::Partial(text) => {
                                SourceEvent::Transcript(TranscriptEvent::partial(text, now_ms()))
                            }
                            Line::Final(text) => SourceEvent::Transcript(
                                TranscriptEvent::final_result(text, now_ms()),
                            ),
                            Line::EngineError(message) => SourceEvent::Error { message },
                        };
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                    Ok(None) | Err(_) => {
                        // Stdin closed: final EndOfSpeech, then the sender
                        // drops and the channel closes.
                        let _ = events.send(SourceEvent::EndOfSpeech);
                        return;
                    }
                }
            }
        });

        *running = Some(Running { task });
        Ok(())
    }

    async fn restart(&self) -> Result<(), SourceError> {
        // The reader task keeps running across passes; nothing to do.
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
            debug!("stdin source stopped");
        }
    }
}
