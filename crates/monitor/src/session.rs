//! Detection session loop

use dms::DrowsinessEngine;
use std::future::Future;
use tracing::info;

use crate::reporter::{SessionSummary, StatusReporter};
use crate::source::LandmarkSource;
use crate::MonitorError;

/// Feed frames from `source` through `engine` until the source runs dry or
/// `shutdown` completes.
///
/// Detection is always stopped on the way out (alarm silenced, counters
/// reset), whichever way the loop ends.
pub async fn run_session<S, F>(
    engine: &mut DrowsinessEngine,
    source: &mut S,
    shutdown: F,
) -> Result<SessionSummary, MonitorError>
where
    S: LandmarkSource,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut reporter = StatusReporter::new();

    info!("Monitoring session started");

    let result = loop {
        let frame = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break Ok(());
            }
            frame = source.next_frame() => frame,
        };

        match frame {
            Ok(Some(faces)) => {
                let outcome = engine.process_frame(&faces).await;
                reporter.report(&outcome);
            }
            Ok(None) => {
                info!("Landmark source exhausted");
                break Ok(());
            }
            Err(e) => break Err(e),
        }
    };

    engine.stop_detection().await;

    let summary = reporter.summary().clone();
    info!(
        frames = summary.frames,
        no_face_frames = summary.no_face_frames,
        drowsy_frames = summary.drowsy_frames,
        yawn_frames = summary.yawn_frames,
        blinks = summary.blinks,
        alarm_activations = summary.alarm_activations,
        "Monitoring session finished"
    );

    result.map(|()| summary)
}
