//! Audio backends for the alarm loop

use std::io::Write;
use tracing::warn;

/// Something that can sound the alarm once.
///
/// Called from the background repeat loop once per repeat interval, so
/// implementations should return promptly (start playback, don't wait for it).
pub trait AlarmSink: Send + Sync {
    fn play(&self);
}

impl<F> AlarmSink for F
where
    F: Fn() + Send + Sync,
{
    fn play(&self) {
        self()
    }
}

/// Emits the alarm as a log event (headless deployments)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlarmSink for LogSink {
    fn play(&self) {
        warn!("ALARM: drowsiness detected, wake up!");
    }
}

/// Rings the terminal bell on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct BellSink;

impl AlarmSink for BellSink {
    fn play(&self) {
        let mut stderr = std::io::stderr().lock();
        // Nothing useful to do if the terminal is gone
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_sink() {
        let plays = Arc::new(AtomicUsize::new(0));
        let counter = plays.clone();
        let sink = move || {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        sink.play();
        sink.play();
        assert_eq!(plays.load(Ordering::SeqCst), 2);
    }
}
