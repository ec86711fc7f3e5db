//! DMS configuration

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::DmsError;

/// Detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Mean EAR below this counts as eyes closed
    pub ear_threshold: f64,

    /// MAR above this counts as yawning
    pub yawn_threshold: f64,

    /// EAR crossing down through this counts as a blink
    pub blink_threshold: f64,

    /// Run length (frames) that turns closed eyes or yawning into drowsiness
    pub consecutive_frames: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ear_threshold: 0.15,
            yawn_threshold: 0.35,
            blink_threshold: 0.15,
            consecutive_frames: 3,
        }
    }
}

impl Thresholds {
    /// Create strict config (earlier alarms)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.2,
            yawn_threshold: 0.3,
            consecutive_frames: 2,
            ..Default::default()
        }
    }

    /// Create lenient config (fewer false alarms)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.12,
            yawn_threshold: 0.45,
            consecutive_frames: 6,
            ..Default::default()
        }
    }

    /// Reject values the detectors can't work with
    pub fn validate(&self) -> Result<(), DmsError> {
        for (name, value) in [
            ("ear_threshold", self.ear_threshold),
            ("yawn_threshold", self.yawn_threshold),
            ("blink_threshold", self.blink_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DmsError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.consecutive_frames == 0 {
            return Err(DmsError::Config(
                "consecutive_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Thresholds that can be changed from another thread while frames are
/// being processed.
///
/// Each field is an independent atomic; readers take a [`Thresholds`]
/// snapshot once per frame and get the latest value of every field, with no
/// consistency across fields.
#[derive(Debug)]
pub struct SharedThresholds {
    ear_threshold: AtomicU64,
    yawn_threshold: AtomicU64,
    blink_threshold: AtomicU64,
    consecutive_frames: AtomicU32,
}

impl SharedThresholds {
    pub fn new(initial: Thresholds) -> Self {
        Self {
            ear_threshold: AtomicU64::new(initial.ear_threshold.to_bits()),
            yawn_threshold: AtomicU64::new(initial.yawn_threshold.to_bits()),
            blink_threshold: AtomicU64::new(initial.blink_threshold.to_bits()),
            consecutive_frames: AtomicU32::new(initial.consecutive_frames),
        }
    }

    /// Read the current value of every field
    pub fn snapshot(&self) -> Thresholds {
        Thresholds {
            ear_threshold: f64::from_bits(self.ear_threshold.load(Ordering::Relaxed)),
            yawn_threshold: f64::from_bits(self.yawn_threshold.load(Ordering::Relaxed)),
            blink_threshold: f64::from_bits(self.blink_threshold.load(Ordering::Relaxed)),
            consecutive_frames: self.consecutive_frames.load(Ordering::Relaxed),
        }
    }

    pub fn set_ear_threshold(&self, value: f64) {
        self.ear_threshold.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn set_yawn_threshold(&self, value: f64) {
        self.yawn_threshold.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn set_blink_threshold(&self, value: f64) {
        self.blink_threshold.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn set_consecutive_frames(&self, frames: u32) {
        self.consecutive_frames.store(frames, Ordering::Relaxed);
    }

    /// Overwrite every field (still field by field)
    pub fn store(&self, thresholds: Thresholds) {
        self.set_ear_threshold(thresholds.ear_threshold);
        self.set_yawn_threshold(thresholds.yawn_threshold);
        self.set_blink_threshold(thresholds.blink_threshold);
        self.set_consecutive_frames(thresholds.consecutive_frames);
    }
}

impl Default for SharedThresholds {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.ear_threshold, 0.15);
        assert_eq!(t.yawn_threshold, 0.35);
        assert_eq!(t.blink_threshold, 0.15);
        assert_eq!(t.consecutive_frames, 3);
    }

    #[test]
    fn test_validate() {
        assert!(Thresholds::default().validate().is_ok());
        assert!(Thresholds::strict().validate().is_ok());
        assert!(Thresholds::lenient().validate().is_ok());

        let zero_frames = Thresholds {
            consecutive_frames: 0,
            ..Default::default()
        };
        assert!(matches!(zero_frames.validate(), Err(DmsError::Config(_))));

        let nan = Thresholds {
            yawn_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_snapshot_sees_latest_values() {
        let shared = Arc::new(SharedThresholds::default());

        let writer = shared.clone();
        std::thread::spawn(move || {
            writer.set_ear_threshold(0.22);
            writer.set_consecutive_frames(5);
        })
        .join()
        .unwrap();

        let t = shared.snapshot();
        assert_eq!(t.ear_threshold, 0.22);
        assert_eq!(t.consecutive_frames, 5);
        assert_eq!(t.yawn_threshold, 0.35);
    }

    #[test]
    fn test_store_round_trips() {
        let shared = SharedThresholds::default();
        shared.store(Thresholds::strict());
        assert_eq!(shared.snapshot(), Thresholds::strict());
    }
}
