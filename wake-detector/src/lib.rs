//! Wake-word and command detection library
//!
//! The core of the Sri voice assistant: a deterministic state machine that
//! consumes a live stream of partial and final transcripts, arms a
//! time-bounded command window when the wake phrase is heard, and emits
//! discrete wake and command events to the host application.

pub mod detector;
pub mod phrase;
pub mod state;

// Re-export main types
pub use detector::{
    DetectorConfig, DetectorError, DetectorStats, SourceDirective, WakeCommandDetector,
};
pub use phrase::{classify_command, contains_wake_phrase, WAKE_WORD};
pub use state::{DetectionEvent, WakeWindow, WAKE_WINDOW_MS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
