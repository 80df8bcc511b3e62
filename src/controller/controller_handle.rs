//! Controller Handle - lifecycle of the gamepad-to-key pipeline
//!
//! Spawns one tokio task that owns the frame poller and the [`InputBridge`].
//! Frame ticks, repeat deadlines, focus changes and cancellation are all
//! serialized through a single `tokio::select!` loop, so the per-control
//! state and the repeat timer never need a lock.
//!

use super::bridge::InputBridge;
use super::frame_source::{FramePoller, PollerError, Polling};
use super::repeat_engine::RepeatSettings;
use super::snapshot::DeviceSnapshot;
use crate::mapping::injector::{KeyInjector, OskToggle};
use crate::mapping::key_map::KeyCodeMap;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration settings for the controller task
///
/// # Examples
///
/// ```ignore
/// use padbridge::controller::controller_handle::ControllerSettings;
/// use padbridge::controller::repeat_engine::RepeatSettings;
///
/// let settings = ControllerSettings {
///     frame_interval_ms: 8,
///     repeat: RepeatSettings::default(),
/// };
/// assert_eq!(settings.frame_interval().as_millis(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct ControllerSettings {
    /// Poll interval in milliseconds, one "rendering frame"
    pub frame_interval_ms: u64,

    /// Debounce and typematic repeat settings
    pub repeat: RepeatSettings,
}

impl ControllerSettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            repeat: RepeatSettings::default(),
        }
    }
}

/// Errors that can occur while starting the controller task
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The gamepad backend could not be opened
    #[error("Poller error: {0}")]
    PollerError(#[from] PollerError),

    /// The task ended abnormally
    #[error("Controller task failed: {0}")]
    TaskError(String),
}

/// Anything that can produce one snapshot per poll frame
pub trait FrameSource {
    fn poll_frame(&mut self) -> Vec<DeviceSnapshot>;
}

impl FrameSource for FramePoller<Polling> {
    fn poll_frame(&mut self) -> Vec<DeviceSnapshot> {
        FramePoller::<Polling>::poll_frame(self)
    }
}

/// Handle to the running controller task
///
/// Dropping the handle leaves the task running until the runtime shuts
/// down; call [`ControllerHandle::stop`] to release held keys first.
pub struct ControllerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Opens the gamepad backend and spawns the pipeline on the current runtime
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::PollerError`] if gilrs cannot be initialized.
    pub fn spawn<I, O>(
        settings: ControllerSettings,
        key_map: KeyCodeMap,
        focus: watch::Receiver<bool>,
        injector: I,
        osk: O,
    ) -> Result<Self, ControllerError>
    where
        I: KeyInjector + Send + 'static,
        O: OskToggle + Send + 'static,
    {
        info!("Initializing Controller system with settings: {:?}", settings);
        let poller = FramePoller::create()?.initialize();
        Ok(Self::spawn_with_source(
            poller, settings, key_map, focus, injector, osk,
        ))
    }

    /// Spawns the pipeline over an arbitrary frame source
    pub fn spawn_with_source<S, I, O>(
        source: S,
        settings: ControllerSettings,
        key_map: KeyCodeMap,
        focus: watch::Receiver<bool>,
        injector: I,
        osk: O,
    ) -> Self
    where
        S: FrameSource + Send + 'static,
        I: KeyInjector + Send + 'static,
        O: OskToggle + Send + 'static,
    {
        let focused = *focus.borrow();
        let bridge = InputBridge::new(key_map, settings.repeat.clone(), focused, injector, osk);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_pipeline(
            source,
            bridge,
            focus,
            cancel.clone(),
            settings.frame_interval(),
        ));
        info!("Controller task spawned");

        Self { cancel, task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops polling and waits until every held key has been released
    pub async fn stop(self) -> Result<(), ControllerError> {
        info!("Stopping controller task");
        self.cancel.cancel();
        self.task
            .await
            .map_err(|e| ControllerError::TaskError(e.to_string()))
    }
}

async fn run_pipeline<S, I, O>(
    mut source: S,
    mut bridge: InputBridge<I, O>,
    mut focus: watch::Receiver<bool>,
    cancel: CancellationToken,
    frame_interval: Duration,
) where
    S: FrameSource,
    I: KeyInjector,
    O: OskToggle,
{
    let mut ticker = time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut focus_open = true;

    loop {
        let deadline = bridge.next_deadline().map(Instant::from_std);

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Controller task cancelled");
                break;
            }
            changed = focus.changed(), if focus_open => match changed {
                Ok(()) => {
                    let focused = *focus.borrow_and_update();
                    bridge.on_focus(focused);
                }
                Err(_) => {
                    warn!("Focus channel closed, keeping last focus state");
                    focus_open = false;
                }
            },
            _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                bridge.on_timer(Instant::now().into_std());
            }
            _ = ticker.tick() => {
                let frame = source.poll_frame();
                bridge.on_frame(&frame, Instant::now().into_std());
            }
        }
    }

    bridge.shutdown();
    info!("Controller task finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::injector::{EguiInjector, PageEvent};
    use eframe::egui::{self, Key};
    use tokio::sync::mpsc;

    /// Replays a fixed button state on every frame
    struct HeldButton {
        pressed: Vec<usize>,
    }

    impl FrameSource for HeldButton {
        fn poll_frame(&mut self) -> Vec<DeviceSnapshot> {
            let mut buttons = vec![false; 17];
            for &i in &self.pressed {
                buttons[i] = true;
            }
            vec![DeviceSnapshot::new(0, "Test Pad").with_buttons(&buttons)]
        }
    }

    fn drain(rx: &mut mpsc::Receiver<PageEvent>) -> Vec<(Key, bool)> {
        let mut keys = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PageEvent::Key(egui::Event::Key { key, pressed, .. }) = event {
                keys.push((key, pressed));
            }
        }
        keys
    }

    #[tokio::test]
    async fn test_stop_releases_held_key() {
        let (tx, mut rx) = mpsc::channel(64);
        let (_focus_tx, focus_rx) = watch::channel(true);
        let injector = EguiInjector::new(tx);

        let handle = ControllerHandle::spawn_with_source(
            HeldButton { pressed: vec![0] },
            ControllerSettings::default(),
            KeyCodeMap::default_config(),
            focus_rx,
            injector.clone(),
            injector,
        );
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.stop().await.unwrap();

        let keys = drain(&mut rx);
        assert_eq!(keys.first(), Some(&(Key::Enter, true)));
        assert_eq!(keys.last(), Some(&(Key::Enter, false)));
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_unfocused_pipeline_is_silent() {
        let (tx, mut rx) = mpsc::channel(64);
        let (focus_tx, focus_rx) = watch::channel(false);
        let injector = EguiInjector::new(tx);

        let handle = ControllerHandle::spawn_with_source(
            HeldButton { pressed: vec![1] },
            ControllerSettings::default(),
            KeyCodeMap::default_config(),
            focus_rx,
            injector.clone(),
            injector,
        );
        tokio::time::sleep(Duration::from_millis(40)).await;
        drop(focus_tx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.is_running());
        handle.stop().await.unwrap();

        assert!(drain(&mut rx).is_empty());
    }
}
