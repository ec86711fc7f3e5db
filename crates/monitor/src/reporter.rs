//! Status reporting for the presentation side

use dms::{DetectionStatus, FrameOutcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Minimum gap between two blinks counted for display
pub const BLINK_DISPLAY_DEBOUNCE: Duration = Duration::from_millis(500);

/// User-facing blink count, debounced on the runtime clock
#[derive(Debug, Clone)]
pub struct BlinkTally {
    min_gap: Duration,
    last_counted: Option<Instant>,
    count: u32,
}

impl BlinkTally {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_counted: None,
            count: 0,
        }
    }

    /// Feed one frame's blink flag, returns the running count
    pub fn record(&mut self, blink_detected: bool, now: Instant) -> u32 {
        if blink_detected {
            let due = self
                .last_counted
                .map_or(true, |last| now.saturating_duration_since(last) > self.min_gap);
            if due {
                self.count += 1;
                self.last_counted = Some(now);
            }
        }
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for BlinkTally {
    fn default() -> Self {
        Self::new(BLINK_DISPLAY_DEBOUNCE)
    }
}

/// Totals for one detection session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub no_face_frames: u64,
    pub drowsy_frames: u64,
    pub yawn_frames: u64,
    pub blinks: u32,
    pub alarm_activations: u64,
}

/// Turns frame outcomes into log lines and session totals
#[derive(Debug, Default)]
pub struct StatusReporter {
    tally: BlinkTally,
    summary: SessionSummary,
    last_headline: Option<&'static str>,
    alarm_on: bool,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, outcome: &FrameOutcome) {
        self.report_at(outcome, Instant::now());
    }

    pub fn report_at(&mut self, outcome: &FrameOutcome, now: Instant) {
        self.summary.frames += 1;

        match outcome {
            FrameOutcome::NoFace { absent_frames } => {
                self.summary.no_face_frames += 1;
                if *absent_frames == 1 {
                    info!("No face detected");
                }
                self.last_headline = None;
            }
            FrameOutcome::Analyzed(status) => self.report_status(status, now),
        }
    }

    fn report_status(&mut self, status: &DetectionStatus, now: Instant) {
        if status.is_drowsy() {
            self.summary.drowsy_frames += 1;
        }
        if status.yawn_detected {
            self.summary.yawn_frames += 1;
        }
        self.summary.blinks = self.tally.record(status.blink_detected, now);

        debug!(
            "Eye Status: {:?} | Yawn Status: {:?} | EAR: {:.3} | MAR: {:.3} | Blink Count: {}",
            status.eye_status,
            status.yawn_status,
            status.ear_value,
            status.mar_value,
            self.tally.count()
        );

        let headline = status.headline();
        if self.last_headline != Some(headline) {
            info!(
                ear = status.ear_value,
                mar = status.mar_value,
                "Driver status: {}",
                headline
            );
            self.last_headline = Some(headline);
        }

        if status.alarm_on != self.alarm_on {
            if status.alarm_on {
                self.summary.alarm_activations += 1;
                warn!("Alarm active");
            } else {
                info!("Alarm cleared");
            }
            self.alarm_on = status.alarm_on;
        }
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::EyeStatus;

    #[test]
    fn test_blink_tally_debounce() {
        let mut tally = BlinkTally::default();
        let t0 = Instant::now();

        assert_eq!(tally.record(true, t0), 1);
        assert_eq!(tally.record(true, t0 + Duration::from_millis(300)), 1);
        assert_eq!(tally.record(false, t0 + Duration::from_millis(700)), 1);
        assert_eq!(tally.record(true, t0 + Duration::from_millis(900)), 2);
    }

    #[test]
    fn test_summary_counts() {
        let mut reporter = StatusReporter::new();
        let t0 = Instant::now();

        let drowsy = DetectionStatus {
            eye_status: EyeStatus::Drowsy,
            drowsiness_level: 1,
            alarm_on: true,
            blink_detected: true,
            ..Default::default()
        };
        let yawning = DetectionStatus {
            yawn_detected: true,
            ..Default::default()
        };

        reporter.report_at(&FrameOutcome::Analyzed(drowsy.clone()), t0);
        reporter.report_at(&FrameOutcome::Analyzed(drowsy), t0);
        reporter.report_at(&FrameOutcome::NoFace { absent_frames: 1 }, t0);
        reporter.report_at(&FrameOutcome::Analyzed(yawning), t0);

        assert_eq!(
            reporter.summary(),
            &SessionSummary {
                frames: 4,
                no_face_frames: 1,
                drowsy_frames: 2,
                yawn_frames: 1,
                blinks: 1,
                alarm_activations: 1,
            }
        );
    }
}
