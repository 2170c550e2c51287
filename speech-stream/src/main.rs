//! Transcript replay tool
//!
//! Plays a transcript script through a `ScriptedSource` and prints the
//! events a consumer would see. Pass a JSON script path, or run with no
//! arguments for a built-in demo.

use anyhow::{Context, Result};
use speech_stream::{
    ListenConfig, ScriptedSource, SourceEvent, TranscriptScript, TranscriptionSource,
};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("speech_stream=debug".parse()?),
        )
        .init();

    let script = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read script {path}"))?;
            TranscriptScript::from_json(&json).context("failed to parse script")?
        }
        None => demo_script(),
    };

    info!(entries = script.entries.len(), "replaying transcript");

    let source = ScriptedSource::new(script);
    let (tx, mut rx) = mpsc::unbounded_channel();
    source.start(&ListenConfig::default(), tx).await?;

    while let Some(event) = rx.recv().await {
        match event {
            SourceEvent::Transcript(t) => {
                let kind = if t.is_partial { "partial" } else { "final" };
                println!("[{:>6} ms] {:<7} {}", t.timestamp_ms, kind, t.text);
            }
            SourceEvent::Error { message } => println!("          error   {message}"),
            SourceEvent::EndOfSpeech => println!("          end of speech"),
        }
    }

    source.stop().await;
    Ok(())
}

fn demo_script() -> TranscriptScript {
    TranscriptScript::new()
        .hypothesize(200, "hey")
        .hypothesize(600, "hey sri")
        .say(900, "hey sri")
        .hypothesize(1600, "lock")
        .say(2400, "lock my phone")
}
