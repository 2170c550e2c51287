//! Wake-word detection service
//!
//! Interactive service wired to stdin: each line is treated as a final
//! transcript (`p:` prefix for partials, `!` prefix to simulate a transient
//! engine error). Detections are printed as they fire, and a recognized
//! lock command is dispatched against the device-lock authority.

use anyhow::{bail, Result};
use device_authority::{
    Capability, CommandDispatcher, GrantTable, PermissionAuthority, SoftLock,
};
use speech_stream::{StdinSource, TranscriptionSource};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use wake_detector::{DetectionEvent, DetectorConfig, SourceDirective, WakeCommandDetector};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wake_detector=debug".parse()?)
                .add_directive("device_authority=info".parse()?)
                .add_directive("speech_stream=info".parse()?),
        )
        .init();

    info!("Starting Sri wake-word detection service");

    // The detector core never touches permissions; the microphone grant is
    // the host's responsibility before listening begins.
    let permissions = GrantTable::permissive();
    if !permissions.request(Capability::Microphone).await.is_granted() {
        bail!("microphone permission denied");
    }

    let source: Arc<dyn TranscriptionSource> = Arc::new(StdinSource::new());
    let detector = WakeCommandDetector::new(DetectorConfig::default(), source.clone())?;

    let lock = Arc::new(SoftLock::new(device_admin_enabled()));
    let dispatcher = CommandDispatcher::new(lock);

    let (tx, mut rx) = mpsc::unbounded_channel();
    detector.start(tx).await?;

    info!("Listening. Say 'hey sri', then 'lock my phone'.");

    loop {
        tokio::select! {
            source_event = rx.recv() => {
                let Some(source_event) = source_event else {
                    // Stdin closed; the session is over.
                    break;
                };
                match detector.on_source_event(source_event).await {
                    SourceDirective::Continue => {}
                    SourceDirective::Restart => {
                        if let Err(e) = source.restart().await {
                            error!("failed to restart source: {e}");
                            break;
                        }
                    }
                    SourceDirective::Stop => break,
                }
            }
            detection = detector.recv_event() => {
                let Some(detection) = detection else { break };
                handle_detection(&dispatcher, detection)?;
            }
        }
    }

    // Drain detections that raced the shutdown.
    while let Some(detection) = detector.try_recv_event().await {
        handle_detection(&dispatcher, detection)?;
    }

    detector.stop().await;

    let stats = detector.stats().await;
    info!(
        transcripts = stats.transcripts_seen,
        wakes = stats.wakes_detected,
        commands = stats.commands_detected,
        "service stopped"
    );
    Ok(())
}

fn handle_detection(dispatcher: &CommandDispatcher, detection: DetectionEvent) -> Result<()> {
    // Events go out in the same JSON shape the host UI consumes.
    let payload = serde_json::to_string(&detection)?;

    match detection {
        DetectionEvent::SpeechHeard { .. } => debug!(%payload, "speech heard"),
        DetectionEvent::WakeWordDetected { .. } => info!(%payload, "wake word detected"),
        DetectionEvent::CommandDetected { ref command, .. } => {
            info!(%payload, "command detected");
            let outcome = dispatcher.dispatch(command);
            if outcome.success {
                info!("{}", outcome.message);
            } else {
                warn!("{}", outcome.message);
            }
        }
    }
    Ok(())
}

/// Device admin defaults to enabled so the demo lock succeeds; set
/// DEVICE_ADMIN=0 to exercise the not-elevated path.
fn device_admin_enabled() -> bool {
    !matches!(
        std::env::var("DEVICE_ADMIN").as_deref(),
        Ok("0") | Ok("false") | Ok("no")
    )
}
