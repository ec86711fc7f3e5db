//! Driver Monitoring System (DMS)
//!
//! Real-time driver alertness analysis from facial landmarks:
//! - Eye aspect ratio (eye closure)
//! - Mouth aspect ratio (yawning)
//! - Blink edge detection
//! - Debounced drowsiness gate driving the audible alarm

pub mod analysis;
pub mod config;
pub mod events;
pub mod features;
pub mod landmarks;
pub mod state;

pub use analysis::{AlarmRequest, DetectionStatus, EyeStatus, FrameOutcome, YawnStatus};
pub use config::{SharedThresholds, Thresholds};
pub use features::{calculate_ear, calculate_mar, RatioSample};
pub use landmarks::{LandmarkSet, Point, LANDMARK_COUNT};
pub use state::{DrowsinessStateMachine, EngineState};

use alerting::AlarmController;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Drowsiness monitoring engine.
///
/// Owns one state machine and one alarm; every frame runs the state machine
/// and then applies its alarm request. Independent engines share nothing.
pub struct DrowsinessEngine {
    machine: DrowsinessStateMachine,
    alarm: AlarmController,
}

impl DrowsinessEngine {
    /// Create a new engine with fixed starting thresholds
    pub fn new(thresholds: Thresholds, alarm: AlarmController) -> Self {
        Self::with_shared_thresholds(Arc::new(SharedThresholds::new(thresholds)), alarm)
    }

    /// Create an engine whose thresholds are tuned through `thresholds`
    pub fn with_shared_thresholds(thresholds: Arc<SharedThresholds>, alarm: AlarmController) -> Self {
        info!("Detection started with thresholds: {:?}", thresholds.snapshot());
        Self {
            machine: DrowsinessStateMachine::new(thresholds),
            alarm,
        }
    }

    /// Analyze the faces found in one frame.
    ///
    /// Only the first face is analyzed. A frame without faces is skipped:
    /// counters and the alarm are left as they are.
    pub async fn process_frame(&mut self, faces: &[LandmarkSet]) -> FrameOutcome {
        let Some(face) = faces.first() else {
            let absent_frames = self.machine.record_absent_face();
            debug!("No face detected ({} frames)", absent_frames);
            return FrameOutcome::NoFace { absent_frames };
        };

        let sample = RatioSample::from_landmarks(face);
        FrameOutcome::Analyzed(self.process_sample(sample).await)
    }

    /// Run one frame's ratios through the state machine and the alarm gate
    pub async fn process_sample(&mut self, sample: RatioSample) -> DetectionStatus {
        let (mut status, request) = self.machine.update(sample);

        match request {
            AlarmRequest::Start => {
                self.alarm.start();
            }
            AlarmRequest::Stop => self.alarm.stop().await,
        }

        status.alarm_on = self.alarm.is_on();
        status
    }

    /// Stop detection: silence the alarm and reset every counter.
    pub async fn stop_detection(&mut self) {
        self.alarm.stop().await;
        self.machine.reset();
        info!("Detection stopped");
    }

    /// Handle for retuning thresholds from other threads
    pub fn thresholds(&self) -> Arc<SharedThresholds> {
        self.machine.thresholds().clone()
    }

    pub fn state(&self) -> &EngineState {
        self.machine.state()
    }

    pub fn alarm(&self) -> &AlarmController {
        &self.alarm
    }

    pub fn alarm_mut(&mut self) -> &mut AlarmController {
        &mut self.alarm
    }
}
