//! Speech stream library
//!
//! Transcription-source abstraction for the Sri voice assistant: the
//! [`TranscriptionSource`] trait plus scripted and stdin implementations
//! that stand in for a platform speech engine.

pub mod scripted;
pub mod source;
pub mod stdin;

// Re-export main types
pub use scripted::{ScriptEntry, ScriptedSource, TranscriptScript};
pub use source::{
    now_ms, ListenConfig, SourceError, SourceEvent, TranscriptEvent, TranscriptionSource,
};
pub use stdin::StdinSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
