//! Wake-window state machine
//!
//! A pure transition function over transcript events: no clock, no channel,
//! no engine handle. The owning detector feeds events in order and forwards
//! the returned detections, which makes every transition unit-testable with
//! nothing but timestamps.

use crate::phrase;
use device_authority::CommandKind;
use serde::{Deserialize, Serialize};
use speech_stream::TranscriptEvent;

/// Milliseconds a wake phrase keeps the command window open
pub const WAKE_WINDOW_MS: u64 = 6_000;

/// Detection emitted toward the host application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DetectionEvent {
    /// Raw speech stream, partials included. Observational only.
    #[serde(rename_all = "camelCase")]
    SpeechHeard { text: String, partial: bool },

    /// Wake phrase matched; the command window is open
    #[serde(rename_all = "camelCase")]
    WakeWordDetected { wake_word: String },

    /// A qualifying command arrived inside the window
    #[serde(rename_all = "camelCase")]
    CommandDetected {
        text: String,
        #[serde(flatten)]
        command: CommandKind,
    },
}

/// Armed/disarmed command window after a wake phrase
///
/// Invariant: disarmed implies `armed_at_ms == 0`; armed implies the window
/// was opened no more than [`WAKE_WINDOW_MS`] before any command check
/// (enforced lazily at the top of [`WakeWindow::on_transcript`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeWindow {
    armed: bool,
    armed_at_ms: u64,
}

impl WakeWindow {
    pub fn new() -> Self {
        Self {
            armed: false,
            armed_at_ms: 0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Disarm and clear the window start
    pub fn reset(&mut self) {
        self.armed = false;
        self.armed_at_ms = 0;
    }

    fn arm(&mut self, now_ms: u64) {
        self.armed = true;
        self.armed_at_ms = now_ms;
    }

    /// Classify one transcript fragment and advance the window.
    ///
    /// Returns the detections to emit, in order. Empty text produces
    /// nothing; every other fragment produces at least `SpeechHeard`.
    pub fn on_transcript(&mut self, event: &TranscriptEvent) -> Vec<DetectionEvent> {
        if event.text.is_empty() {
            return Vec::new();
        }

        let mut detections = vec![DetectionEvent::SpeechHeard {
            text: event.text.clone(),
            partial: event.is_partial,
        }];

        let now = event.timestamp_ms;

        // Lazy expiry: an armed window older than WAKE_WINDOW_MS is dead.
        if self.armed && now.saturating_sub(self.armed_at_ms) > WAKE_WINDOW_MS {
            self.reset();
        }

        if phrase::contains_wake_phrase(&event.text) {
            // A repeated wake phrase re-arms and restarts the timer.
            self.arm(now);
            detections.push(DetectionEvent::WakeWordDetected {
                wake_word: phrase::WAKE_WORD.to_string(),
            });

            // Wake phrase and command spoken in one breath.
            if let Some(command) = phrase::classify_command(&event.text) {
                detections.push(DetectionEvent::CommandDetected {
                    text: event.text.clone(),
                    command,
                });
                self.reset();
            }
            return detections;
        }

        // Commands are only accepted from final results inside the window;
        // partial hypotheses are too noisy to act on.
        if !event.is_partial && self.armed {
            if let Some(command) = phrase::classify_command(&event.text) {
                detections.push(DetectionEvent::CommandDetected {
                    text: event.text.clone(),
                    command,
                });
                self.reset();
            }
        }

        detections
    }
}

impl Default for WakeWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speech_stream::TranscriptEvent;

    fn wake_count(detections: &[DetectionEvent]) -> usize {
        detections
            .iter()
            .filter(|d| matches!(d, DetectionEvent::WakeWordDetected { .. }))
            .count()
    }

    fn command_of(detections: &[DetectionEvent]) -> Option<&CommandKind> {
        detections.iter().find_map(|d| match d {
            DetectionEvent::CommandDetected { command, .. } => Some(command),
            _ => None,
        })
    }

    #[test]
    fn test_empty_text_is_ignored() {
        let mut window = WakeWindow::new();
        let detections = window.on_transcript(&TranscriptEvent::final_result("", 0));
        assert!(detections.is_empty());
        assert!(!window.is_armed());
    }

    #[test]
    fn test_non_matching_text_emits_only_speech_heard() {
        let mut window = WakeWindow::new();
        let detections =
            window.on_transcript(&TranscriptEvent::final_result("what a nice day", 100));

        assert_eq!(detections.len(), 1);
        assert!(matches!(
            &detections[0],
            DetectionEvent::SpeechHeard { text, partial }
                if text == "what a nice day" && !partial
        ));
        assert!(!window.is_armed());
    }

    #[test]
    fn test_wake_phrase_arms_the_window() {
        let mut window = WakeWindow::new();
        let detections = window.on_transcript(&TranscriptEvent::partial("hey sri", 1_000));

        assert_eq!(wake_count(&detections), 1);
        assert!(window.is_armed());
        assert!(matches!(
            &detections[1],
            DetectionEvent::WakeWordDetected { wake_word } if wake_word == "hey sri"
        ));
    }

    #[test]
    fn test_command_fires_inside_window() {
        let mut window = WakeWindow::new();
        window.on_transcript(&TranscriptEvent::final_result("hey sri", 1_000));

        let detections =
            window.on_transcript(&TranscriptEvent::final_result("lock my phone", 6_999));
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
        assert!(!window.is_armed());
    }

    #[test]
    fn test_command_just_inside_window_boundary() {
        let mut window = WakeWindow::new();
        window.on_transcript(&TranscriptEvent::final_result("hey sri", 0));

        // 5999 ms after arming: still open.
        let detections =
            window.on_transcript(&TranscriptEvent::final_result("lock my phone", 5_999));
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
    }

    #[test]
    fn test_window_expires_after_deadline() {
        let mut window = WakeWindow::new();
        window.on_transcript(&TranscriptEvent::final_result("hey sri", 0));

        // 6001 ms after arming: expired, even for a matching command.
        let detections =
            window.on_transcript(&TranscriptEvent::final_result("lock my phone", 6_001));
        assert_eq!(command_of(&detections), None);
        assert!(!window.is_armed());
    }

    #[test]
    fn test_expiry_check_runs_on_non_matching_text_too() {
        let mut window = WakeWindow::new();
        window.on_transcript(&TranscriptEvent::final_result("hey sri", 0));

        let detections =
            window.on_transcript(&TranscriptEvent::final_result("what time is it", 6_001));
        assert_eq!(detections.len(), 1);
        assert!(!window.is_armed());
    }

    #[test]
    fn test_combined_wake_and_command() {
        let mut window = WakeWindow::new();
        let detections =
            window.on_transcript(&TranscriptEvent::final_result("hey siri lock my phone", 500));

        assert_eq!(wake_count(&detections), 1);
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
        assert!(!window.is_armed());
    }

    #[test]
    fn test_combined_utterance_works_on_partials_too() {
        // Wake matching has no partial gate, and the combined path rides on
        // the wake branch.
        let mut window = WakeWindow::new();
        let detections =
            window.on_transcript(&TranscriptEvent::partial("hey sri lock the screen", 500));

        assert_eq!(wake_count(&detections), 1);
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
        assert!(!window.is_armed());
    }

    #[test]
    fn test_partial_never_triggers_command() {
        let mut window = WakeWindow::new();
        window.on_transcript(&TranscriptEvent::final_result("hey sri", 0));

        let detections = window.on_transcript(&TranscriptEvent::partial("lock my phone", 1_000));
        assert_eq!(command_of(&detections), None);
        // The window stays armed for the final result that follows.
        assert!(window.is_armed());

        let detections =
            window.on_transcript(&TranscriptEvent::final_result("lock my phone", 1_500));
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
    }

    #[test]
    fn test_partial_command_while_disarmed_is_inert() {
        let mut window = WakeWindow::new();
        let detections = window.on_transcript(&TranscriptEvent::partial("lock the phone", 100));
        assert_eq!(detections.len(), 1);
        assert!(!window.is_armed());
    }

    #[test]
    fn test_repeated_wake_restarts_the_timer() {
        let mut window = WakeWindow::new();
        let first = window.on_transcript(&TranscriptEvent::final_result("hey sri", 0));
        let second = window.on_transcript(&TranscriptEvent::final_result("hey sri", 1_000));
        assert_eq!(wake_count(&first), 1);
        assert_eq!(wake_count(&second), 1);

        // 6500 is past the first arming but inside the re-armed window.
        let detections =
            window.on_transcript(&TranscriptEvent::final_result("lock my phone", 6_500));
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
    }

    #[test]
    fn test_case_insensitive_matching_keeps_original_text() {
        let mut window = WakeWindow::new();
        let detections = window
            .on_transcript(&TranscriptEvent::final_result("HEY SRI, LOCK THE SCREEN", 100));

        assert_eq!(wake_count(&detections), 1);
        assert_eq!(command_of(&detections), Some(&CommandKind::Lock));
        assert!(matches!(
            &detections[0],
            DetectionEvent::SpeechHeard { text, .. } if text == "HEY SRI, LOCK THE SCREEN"
        ));
    }

    #[test]
    fn test_reset_disarms() {
        let mut window = WakeWindow::new();
        window.on_transcript(&TranscriptEvent::final_result("hey sri", 0));
        assert!(window.is_armed());

        window.reset();
        assert!(!window.is_armed());

        let detections =
            window.on_transcript(&TranscriptEvent::final_result("lock my phone", 100));
        assert_eq!(command_of(&detections), None);
    }

    #[test]
    fn test_detection_event_wire_format() {
        let event = DetectionEvent::CommandDetected {
            text: "lock my phone".to_string(),
            command: CommandKind::Lock,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "commandDetected");
        assert_eq!(json["text"], "lock my phone");
        assert_eq!(json["type"], "lock");

        let event = DetectionEvent::WakeWordDetected {
            wake_word: "hey sri".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "wakeWordDetected");
        assert_eq!(json["wakeWord"], "hey sri");
    }
}
