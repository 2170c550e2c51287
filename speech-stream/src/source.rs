//! Transcription source abstraction
//!
//! Contract between a speech engine and its consumer: a source is started
//! with a [`ListenConfig`], delivers [`SourceEvent`]s on a channel, and can
//! be asked for a new recognition pass or stopped. The consumer decides when
//! to restart; the source never drives itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::mpsc;

/// Source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Speech recognition not available: {0}")]
    Unavailable(String),

    #[error("Source already running")]
    AlreadyRunning,

    #[error("Source not running")]
    NotRunning,

    #[error("Invalid transcript script: {0}")]
    InvalidScript(String),
}

/// Parameters for a recognition session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// BCP-47 language tag passed to the engine
    pub locale: String,

    /// Deliver in-progress hypotheses in addition to final results
    pub partial_results: bool,

    /// Maximum recognition alternatives requested per result
    pub max_alternatives: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            locale: "en-IN".to_string(),
            partial_results: true,
            max_alternatives: 3,
        }
    }
}

/// A single transcribed text fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Transcribed text exactly as the engine produced it
    pub text: String,

    /// True for an in-progress hypothesis, false for a final result
    pub is_partial: bool,

    /// Millisecond timestamp stamped by the source
    pub timestamp_ms: u64,
}

impl TranscriptEvent {
    /// In-progress hypothesis
    pub fn partial(text: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            text: text.into(),
            is_partial: true,
            timestamp_ms,
        }
    }

    /// Completed recognition result
    pub fn final_result(text: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            text: text.into(),
            is_partial: false,
            timestamp_ms,
        }
    }
}

/// What a running source delivers on its event channel
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A partial or final transcription result
    Transcript(TranscriptEvent),

    /// Transient engine failure mid-session
    Error { message: String },

    /// The engine finished a recognition pass
    EndOfSpeech,
}

/// Abstract continuous speech-to-text engine
///
/// Implementations own their concurrency (recognition runs on a background
/// task) and serialize their event deliveries. A delivery racing `stop()` is
/// the source's problem: send failures are swallowed, never surfaced.
#[async_trait]
pub trait TranscriptionSource: Send + Sync {
    /// Begin producing events on `events`.
    ///
    /// Fails with [`SourceError::Unavailable`] when the engine cannot run;
    /// in that case nothing was started and no events will arrive.
    async fn start(
        &self,
        config: &ListenConfig,
        events: mpsc::UnboundedSender<SourceEvent>,
    ) -> Result<(), SourceError>;

    /// Begin a new recognition pass on the already-started engine.
    async fn restart(&self) -> Result<(), SourceError>;

    /// Cease producing events and release engine resources.
    ///
    /// Infallible and idempotent. Each teardown step is attempted
    /// independently so one failed release cannot block the others.
    async fn stop(&self);
}

/// Wall-clock milliseconds, as stamped on live transcript events
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_config_defaults() {
        let config = ListenConfig::default();
        assert_eq!(config.locale, "en-IN");
        assert!(config.partial_results);
        assert_eq!(config.max_alternatives, 3);
    }

    #[test]
    fn test_transcript_event_constructors() {
        let partial = TranscriptEvent::partial("hey", 10);
        assert!(partial.is_partial);
        assert_eq!(partial.text, "hey");
        assert_eq!(partial.timestamp_ms, 10);

        let fin = TranscriptEvent::final_result("hey sri", 250);
        assert!(!fin.is_partial);
        assert_eq!(fin.timestamp_ms, 250);
    }

    #[test]
    fn test_listen_config_json_roundtrip() {
        let config = ListenConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: ListenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.locale, config.locale);
        assert_eq!(restored.max_alternatives, config.max_alternatives);
    }

    #[test]
    fn test_now_ms_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
