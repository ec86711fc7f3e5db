//! Alarm Controller Implementation

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sink::AlarmSink;

/// Alarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Whether the alarm may sound at all (runtime toggle)
    pub enabled: bool,
    /// Pause between two plays of the alarm sound (default: 1s)
    pub repeat_interval_ms: u64,
    /// How long `stop()` waits for the loop to exit (default: 1s)
    pub join_timeout_ms: u64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repeat_interval_ms: 1000,
            join_timeout_ms: 1000,
        }
    }
}

impl AlarmConfig {
    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

/// One running repeat loop.
///
/// Each session gets its own `running` flag, so a loop that outlives its
/// join timeout can never be revived by a later `start()`.
struct AlarmSession {
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// Decrements the live-loop count when a loop finishes or is dropped
struct LoopGuard(Arc<AtomicUsize>);

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the alarm on/off state and its background repeat loop.
///
/// `start()` and `stop()` are meant to be called on every frame with the
/// current intent; both are idempotent. Must be used from within a tokio
/// runtime. The sink is played on the blocking pool, so a slow backend never
/// holds up the caller's tasks, even on a current-thread runtime.
pub struct AlarmController {
    config: AlarmConfig,
    sink: Arc<dyn AlarmSink>,
    session: Option<AlarmSession>,
    /// Loops that have been spawned and not yet exited
    live_loops: Arc<AtomicUsize>,
    /// Number of times the alarm has been switched on
    activations: u64,
}

impl AlarmController {
    /// Create a new alarm controller
    pub fn new(config: AlarmConfig, sink: Arc<dyn AlarmSink>) -> Self {
        info!("Creating alarm controller with config: {:?}", config);
        Self {
            config,
            sink,
            session: None,
            live_loops: Arc::new(AtomicUsize::new(0)),
            activations: 0,
        }
    }

    /// Switch the alarm on.
    ///
    /// Returns `true` only when a new repeat loop was launched. Does nothing
    /// while the alarm is already on or disabled.
    pub fn start(&mut self) -> bool {
        if !self.config.enabled {
            debug!("Alarm start suppressed: alarm disabled");
            return false;
        }
        if self.is_on() {
            return false;
        }

        let running = Arc::new(AtomicBool::new(true));
        let wake = Arc::new(Notify::new());

        self.live_loops.fetch_add(1, Ordering::SeqCst);
        let guard = LoopGuard(self.live_loops.clone());

        let handle = tokio::spawn(repeat_loop(
            self.sink.clone(),
            running.clone(),
            wake.clone(),
            self.config.repeat_interval(),
            guard,
        ));

        self.session = Some(AlarmSession {
            running,
            wake,
            handle,
        });
        self.activations += 1;

        info!("Alarm started (activation {})", self.activations);
        true
    }

    /// Switch the alarm off and wait (bounded) for the loop to exit.
    ///
    /// A no-op when the alarm is already off. A join timeout is logged and
    /// otherwise ignored: the cleared flag guarantees the loop exits on its
    /// next wake.
    pub async fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        session.running.store(false, Ordering::Release);
        session.wake.notify_one();

        match tokio::time::timeout(self.config.join_timeout(), session.handle).await {
            Ok(Ok(())) => info!("Alarm stopped"),
            Ok(Err(e)) => warn!("Alarm loop terminated abnormally: {}", e),
            Err(_) => warn!(
                "Alarm loop did not exit within {:?}, detaching",
                self.config.join_timeout()
            ),
        }
    }

    /// Enable or disable the alarm at runtime. Disabling stops a running loop.
    pub async fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled == enabled {
            return;
        }
        self.config.enabled = enabled;
        info!("Alarm {}", if enabled { "enabled" } else { "disabled" });

        if !enabled {
            self.stop().await;
        }
    }

    /// Whether the alarm is currently sounding
    pub fn is_on(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.running.load(Ordering::Acquire))
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Repeat loops spawned and not yet exited (includes detached ones)
    pub fn live_loops(&self) -> usize {
        self.live_loops.load(Ordering::SeqCst)
    }

    /// Number of times the alarm has been switched on
    pub fn activations(&self) -> u64 {
        self.activations
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }
}

impl Drop for AlarmController {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.running.store(false, Ordering::Release);
            session.wake.notify_one();
        }
    }
}

async fn repeat_loop(
    sink: Arc<dyn AlarmSink>,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>,
    interval: Duration,
    _guard: LoopGuard,
) {
    debug!("Alarm loop entered");
    while running.load(Ordering::Acquire) {
        // Playback may block; keep it off the runtime's worker threads.
        // A stop during playback leaves a stored permit for `notified()`.
        let playback = sink.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || playback.play()).await {
            warn!("Alarm playback failed: {}", e);
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = wake.notified() => {}
        }
    }
    debug!("Alarm loop exited");
}
