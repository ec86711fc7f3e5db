//! Drowsiness state tracking

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::analysis::{AlarmRequest, DetectionStatus, EyeStatus, YawnStatus};
use crate::config::SharedThresholds;
use crate::events::{detect_blink, detect_yawn};
use crate::features::RatioSample;

/// Counters carried from one frame to the next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Consecutive frames with eyes closed (reset on any open frame)
    pub eye_counter: u32,

    /// Leaky yawn counter (+1 yawning, -1 otherwise, floored at 0)
    pub yawn_counter: u32,

    /// Leaky blink counter (+1 blink edge, -1 otherwise, floored at 0)
    pub blink_counter: u32,

    /// EAR of the previous analyzed frame
    pub last_ear: f64,

    /// MAR of the previous analyzed frame
    pub last_mar: f64,

    /// Consecutive frames where no face was detected
    pub face_absent_frames: u32,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            eye_counter: 0,
            yawn_counter: 0,
            blink_counter: 0,
            last_ear: 1.0,
            last_mar: 0.0,
            face_absent_frames: 0,
        }
    }
}

impl EngineState {
    /// Reset state (on detection stop)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Leaky-bucket step
fn leak(counter: &mut u32, positive: bool) {
    *counter = if positive {
        counter.saturating_add(1)
    } else {
        counter.saturating_sub(1)
    };
}

/// Turns per-frame ratios into debounced blink/yawn/drowsiness status.
///
/// Thresholds are read from the shared handle once at the start of every
/// frame, so they can be retuned while frames are flowing.
#[derive(Debug)]
pub struct DrowsinessStateMachine {
    thresholds: Arc<SharedThresholds>,
    state: EngineState,
}

impl DrowsinessStateMachine {
    pub fn new(thresholds: Arc<SharedThresholds>) -> Self {
        Self {
            thresholds,
            state: EngineState::default(),
        }
    }

    /// Advance by one analyzed frame.
    ///
    /// Steps run in a fixed order: blink edge, yawn level, eye run length,
    /// drowsiness gate, then the previous-sample update.
    pub fn update(&mut self, sample: RatioSample) -> (DetectionStatus, AlarmRequest) {
        let thresholds = self.thresholds.snapshot();
        let state = &mut self.state;
        state.face_absent_frames = 0;

        let mut status = DetectionStatus {
            ear_value: sample.ear,
            mar_value: sample.mar,
            ..Default::default()
        };

        // Blink: edge triggered against the previous frame
        status.blink_detected =
            detect_blink(sample.ear, state.last_ear, thresholds.blink_threshold);
        leak(&mut state.blink_counter, status.blink_detected);

        // Yawn: level triggered, debounced by the leaky counter
        status.yawn_detected = detect_yawn(sample.mar, thresholds.yawn_threshold);
        leak(&mut state.yawn_counter, status.yawn_detected);
        if status.yawn_detected {
            status.yawn_status = YawnStatus::Yawning;
        }

        // Eyes: plain run length
        if sample.ear < thresholds.ear_threshold {
            state.eye_counter = state.eye_counter.saturating_add(1);
            if state.eye_counter >= thresholds.consecutive_frames {
                status.eye_status = EyeStatus::Drowsy;
                status.drowsiness_level = 1;
            }
        } else {
            state.eye_counter = 0;
        }

        let request = if state.yawn_counter >= thresholds.consecutive_frames
            || state.eye_counter >= thresholds.consecutive_frames
        {
            status.drowsiness_level = 1;
            AlarmRequest::Start
        } else {
            AlarmRequest::Stop
        };

        state.last_ear = sample.ear;
        state.last_mar = sample.mar;
        status.blink_count = state.blink_counter;

        debug!(
            ear = sample.ear,
            mar = sample.mar,
            eye_counter = state.eye_counter,
            yawn_counter = state.yawn_counter,
            blink_counter = state.blink_counter,
            level = status.drowsiness_level,
            "Frame analyzed"
        );

        (status, request)
    }

    /// Count a frame without a face. Detection counters stay as they are.
    pub fn record_absent_face(&mut self) -> u32 {
        self.state.face_absent_frames = self.state.face_absent_frames.saturating_add(1);
        self.state.face_absent_frames
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn thresholds(&self) -> &Arc<SharedThresholds> {
        &self.thresholds
    }
}

impl Default for DrowsinessStateMachine {
    fn default() -> Self {
        Self::new(Arc::new(SharedThresholds::default()))
    }
}
