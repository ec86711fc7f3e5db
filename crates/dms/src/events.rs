//! Instantaneous blink and yawn detection

/// Blink edge trigger: the EAR crossed down through `blink_threshold`
/// between the previous and the current frame.
///
/// A sustained closure reports only its first frame.
pub fn detect_blink(current_ear: f64, last_ear: f64, blink_threshold: f64) -> bool {
    current_ear < blink_threshold && last_ear >= blink_threshold
}

/// Yawn level trigger: true on every frame the MAR is above `yawn_threshold`
pub fn detect_yawn(current_mar: f64, yawn_threshold: f64) -> bool {
    current_mar > yawn_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_fires_once_per_closure() {
        let ears = [0.30, 0.10, 0.08, 0.09, 0.30, 0.12];
        let mut last = 1.0;
        let fired: Vec<bool> = ears
            .iter()
            .map(|&ear| {
                let blink = detect_blink(ear, last, 0.15);
                last = ear;
                blink
            })
            .collect();

        assert_eq!(fired, [false, true, false, false, false, true]);
    }

    #[test]
    fn test_blink_threshold_boundaries() {
        // previous exactly at threshold still counts as open
        assert!(detect_blink(0.1, 0.15, 0.15));
        // current exactly at threshold is not closed
        assert!(!detect_blink(0.15, 0.3, 0.15));
    }

    #[test]
    fn test_yawn_is_level_triggered() {
        assert!(!detect_yawn(0.35, 0.35));
        assert!(detect_yawn(0.36, 0.35));
        assert!(detect_yawn(0.36, 0.35));
    }
}
