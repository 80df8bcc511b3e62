use crate::controller::snapshot::DeviceSnapshot;
use chrono::{DateTime, Local};
use gilrs::{Axis, Button, EventType, Gamepad, Gilrs};
use statum::{machine, state};
use tracing::{debug, error, info, warn};

/// Number of buttons in the standard gamepad layout
pub const STANDARD_BUTTON_COUNT: usize = 17;

/// Buttons in standard gamepad order; the position is the button index
const STANDARD_BUTTONS: [Button; STANDARD_BUTTON_COUNT] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

// Standard axis order. Y axes are inverted so that "down" is positive.
const STANDARD_AXES: [(Axis, f32); 4] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
];

// Poller errors
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),
}

// Frame statistics, logged periodically
#[derive(Debug, Clone)]
struct FrameStats {
    frames: u64,
    events: u64,
    since: DateTime<Local>,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            events: 0,
            since: Local::now(),
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum PollerState {
    Initializing,
    Polling,
}

#[machine]
#[derive(Debug)]
pub struct FramePoller<S: PollerState> {
    // Gilrs context
    gilrs: Gilrs,

    // Interval between two stat lines
    stats_interval: chrono::Duration,

    stats: FrameStats,
}

impl FramePoller<Initializing> {
    pub fn create() -> Result<Self, PollerError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(PollerError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(gilrs, chrono::Duration::seconds(30), FrameStats::new()))
    }

    // Log the pads already present and transition to Polling
    pub fn initialize(self) -> FramePoller<Polling> {
        let count = self.gilrs.gamepads().count();
        if count == 0 {
            warn!("No gamepad connected, polling in idle mode");
        } else {
            info!("Found {} gamepads:", count);
            for (id, gamepad) in self.gilrs.gamepads() {
                info!("  [{}] {}", usize::from(id), signature(&gamepad));
            }
        }

        info!("Frame poller initialized, transitioning to Polling state");
        self.transition()
    }
}

impl FramePoller<Polling> {
    /// Drains pending backend events and snapshots every connected pad
    pub fn poll_frame(&mut self) -> Vec<DeviceSnapshot> {
        while let Some(event) = self.gilrs.next_event() {
            self.stats.events += 1;
            match event.event {
                EventType::Connected => {
                    let gamepad = self.gilrs.gamepad(event.id);
                    info!(
                        "Gamepad connected: [{}] {}",
                        usize::from(event.id),
                        signature(&gamepad)
                    );
                }
                EventType::Disconnected => {
                    warn!("Gamepad disconnected: [{}]", usize::from(event.id));
                }
                _ => {}
            }
        }

        let frame: Vec<DeviceSnapshot> = self
            .gilrs
            .gamepads()
            .map(|(id, gamepad)| snapshot(usize::from(id), &gamepad))
            .collect();

        self.stats.frames += 1;
        self.log_stats();
        frame
    }

    fn log_stats(&mut self) {
        let now = Local::now();
        let elapsed = now - self.stats.since;
        if elapsed < self.stats_interval {
            return;
        }

        let seconds = elapsed.num_milliseconds().max(1) as f64 / 1000.0;
        info!(
            "Frame poller stats at {}: {} frames, {} backend events in {:.1}s (avg {:.1} frames/sec)",
            now.format("%H:%M:%S"),
            self.stats.frames,
            self.stats.events,
            seconds,
            self.stats.frames as f64 / seconds
        );
        self.stats = FrameStats::new();
    }
}

fn signature(gamepad: &Gamepad<'_>) -> String {
    format!(
        "{} (STANDARD GAMEPAD Vendor: {:04x} Product: {:04x})",
        gamepad.name(),
        gamepad.vendor_id().unwrap_or(0),
        gamepad.product_id().unwrap_or(0)
    )
}

fn snapshot(index: usize, gamepad: &Gamepad<'_>) -> DeviceSnapshot {
    let buttons: Vec<bool> = STANDARD_BUTTONS
        .iter()
        .map(|&button| gamepad.is_pressed(button))
        .collect();
    let axes: Vec<f32> = STANDARD_AXES
        .iter()
        .map(|&(axis, sign)| normalize_axis(gamepad.value(axis) * sign))
        .collect();

    debug!("Snapshot [{}]: buttons={:?} axes={:?}", index, buttons, axes);
    DeviceSnapshot::new(index, signature(gamepad))
        .with_buttons(&buttons)
        .with_axes(&axes)
}

fn normalize_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Standard index of a gilrs button, if it has one
pub fn standard_index(button: Button) -> Option<usize> {
    STANDARD_BUTTONS.iter().position(|&b| b == button)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_button_order() {
        assert_eq!(standard_index(Button::South), Some(0));
        assert_eq!(standard_index(Button::LeftTrigger), Some(4));
        assert_eq!(standard_index(Button::Select), Some(8));
        assert_eq!(standard_index(Button::DPadDown), Some(13));
        assert_eq!(standard_index(Button::Mode), Some(16));
        assert_eq!(standard_index(Button::C), None);
    }

    #[test]
    fn test_normalize_axis() {
        assert_eq!(normalize_axis(0.3), 0.3);
        assert_eq!(normalize_axis(1.7), 1.0);
        assert_eq!(normalize_axis(-3.0), -1.0);
        assert_eq!(normalize_axis(f32::NAN), 0.0);
    }
}
