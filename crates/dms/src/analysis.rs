//! Per-frame detection results

use serde::{Deserialize, Serialize};

/// Eye status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EyeStatus {
    #[default]
    Normal,
    Drowsy,
}

/// Mouth status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YawnStatus {
    #[default]
    Normal,
    Yawning,
}

/// What the drowsiness gate wants the alarm to do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmRequest {
    Start,
    Stop,
}

/// Status of one processed frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStatus {
    pub eye_status: EyeStatus,
    pub yawn_status: YawnStatus,

    /// EAR crossed down through the blink threshold this frame
    pub blink_detected: bool,

    /// MAR above the yawn threshold this frame
    pub yawn_detected: bool,

    /// 0 = alert, 1 = drowsy
    pub drowsiness_level: u8,

    /// Mean eye aspect ratio
    pub ear_value: f64,

    /// Mouth aspect ratio
    pub mar_value: f64,

    /// Leaky blink counter after this frame
    pub blink_count: u32,

    /// Whether the alarm is sounding after this frame's gate
    pub alarm_on: bool,
}

impl DetectionStatus {
    pub fn is_drowsy(&self) -> bool {
        self.drowsiness_level > 0
    }

    /// Short label for overlays, most severe first
    pub fn headline(&self) -> &'static str {
        if self.eye_status == EyeStatus::Drowsy {
            "DROWSY EYES"
        } else if self.is_drowsy() {
            "DROWSY"
        } else if self.yawn_detected {
            "YAWNING"
        } else if self.blink_detected {
            "BLINK"
        } else {
            "NORMAL"
        }
    }
}

/// Result of feeding one frame to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameOutcome {
    /// No face in the frame; counters were left untouched
    NoFace {
        /// Consecutive frames without a face, this one included
        absent_frames: u32,
    },

    /// First detected face was analyzed
    Analyzed(DetectionStatus),
}

impl FrameOutcome {
    pub fn status(&self) -> Option<&DetectionStatus> {
        match self {
            FrameOutcome::Analyzed(status) => Some(status),
            FrameOutcome::NoFace { .. } => None,
        }
    }
}
