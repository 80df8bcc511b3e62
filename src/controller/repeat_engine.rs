//! Debounce-repeat engine
//!
//! Turns per-frame device snapshots into discrete key intents. Buttons and
//! axes are tracked per `(device index, control)`; an axis behaves like a
//! synthetic button that remembers which key it pressed, so the release
//! always matches the press even if the stick swings through zero to the
//! other side within one frame.
//!
//! Typematic repeat uses a single timer for the whole stream. Any press
//! replaces it and any release cancels it, so two repeat bursts can never
//! overlap.
//!
//! The engine never reads the clock itself. Callers pass `now`, which keeps
//! the pacing deterministic under test.

use crate::controller::selector::{select_devices, STEAM_INPUT_SIGNATURE};
use crate::controller::snapshot::{ControlId, DeviceSnapshot};
use crate::mapping::key_map::{KeyCodeMap, LogicalKey, DEFAULT_AXIS_THRESHOLD};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Phase of a key intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A logical key transition produced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyIntent {
    pub key: LogicalKey,
    pub phase: KeyPhase,
    /// Set on key-downs emitted by the repeat timer
    pub repeat: bool,
}

impl KeyIntent {
    pub fn down(key: LogicalKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Down,
            repeat: false,
        }
    }

    pub fn up(key: LogicalKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Up,
            repeat: false,
        }
    }

    pub fn repeat(key: LogicalKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Down,
            repeat: true,
        }
    }
}

/// Engine settings
#[derive(Clone, Debug)]
pub struct RepeatSettings {
    /// Time between the initial key-down and the start of the repeat phase
    pub delay: Duration,

    /// Time between two repeated key-downs
    pub interval: Duration,

    /// Axis magnitude that counts as a press
    pub axis_threshold: f32,

    /// Signature suffix of the device that wins over all others
    pub canonical_signature: String,
}

impl Default for RepeatSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            interval: Duration::from_millis(100),
            axis_threshold: DEFAULT_AXIS_THRESHOLD,
            canonical_signature: STEAM_INPUT_SIGNATURE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ControlState {
    pressed: bool,
    /// Key emitted on press, released verbatim
    active_key: Option<LogicalKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerPhase {
    Delay,
    Repeating,
}

/// The one active repeat stream
#[derive(Debug, Clone)]
pub struct RepeatTimer {
    key: LogicalKey,
    source: (usize, ControlId),
    phase: TimerPhase,
    deadline: Instant,
    interval: Duration,
}

impl RepeatTimer {
    fn arm(
        key: LogicalKey,
        source: (usize, ControlId),
        now: Instant,
        delay: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            key,
            source,
            phase: TimerPhase::Delay,
            deadline: now + delay,
            // zero would never advance the deadline
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn key(&self) -> LogicalKey {
        self.key
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Advances the timer to `now` and returns how many key-downs are due
    ///
    /// Deadlines advance from the previous deadline, not from `now`, so a
    /// late wake-up does not stretch the pacing.
    fn fire(&mut self, now: Instant) -> usize {
        let mut due = 0;
        while self.deadline <= now {
            match self.phase {
                TimerPhase::Delay => self.phase = TimerPhase::Repeating,
                TimerPhase::Repeating => due += 1,
            }
            self.deadline += self.interval;
        }
        due
    }
}

/// Stateful translation from snapshots to key intents
#[derive(Debug)]
pub struct RepeatEngine {
    key_map: KeyCodeMap,
    settings: RepeatSettings,
    devices: HashMap<usize, HashMap<ControlId, ControlState>>,
    timer: Option<RepeatTimer>,
}

impl RepeatEngine {
    pub fn new(key_map: KeyCodeMap, settings: RepeatSettings) -> Self {
        info!("Creating repeat engine with settings: {:?}", settings);
        Self {
            key_map,
            settings,
            devices: HashMap::new(),
            timer: None,
        }
    }

    /// Processes one poll frame and returns the resulting key transitions
    pub fn process_frame(&mut self, frame: &[DeviceSnapshot], now: Instant) -> Vec<KeyIntent> {
        let mut intents = Vec::new();

        let selected = select_devices(frame, &self.settings.canonical_signature);
        self.drop_inactive(frame, &selected, &mut intents);

        for device in selected {
            self.process_device(device, now, &mut intents);
        }

        intents
    }

    /// Emits the repeated key-downs that became due up to `now`
    pub fn fire_due(&mut self, now: Instant) -> Vec<KeyIntent> {
        match self.timer.as_mut() {
            Some(timer) => {
                let due = timer.fire(now);
                if due > 0 {
                    debug!("Repeat timer fired {} time(s) for {}", due, timer.key);
                }
                vec![KeyIntent::repeat(timer.key); due]
            }
            None => Vec::new(),
        }
    }

    /// Instant at which the repeat timer needs service next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.as_ref().map(RepeatTimer::deadline)
    }

    /// Key currently driven by the repeat timer
    pub fn active_repeat(&self) -> Option<LogicalKey> {
        self.timer.as_ref().map(RepeatTimer::key)
    }

    pub fn is_pressed(&self, device: usize, control: ControlId) -> bool {
        self.devices
            .get(&device)
            .and_then(|controls| controls.get(&control))
            .is_some_and(|state| state.pressed)
    }

    /// Teardown: releases every held control and cancels the timer
    pub fn release_all(&mut self) -> Vec<KeyIntent> {
        let mut indices: Vec<usize> = self.devices.keys().copied().collect();
        indices.sort_unstable();

        let mut intents = Vec::new();
        for index in indices {
            if let Some(controls) = self.devices.remove(&index) {
                release_held(controls, &mut intents);
            }
        }
        self.cancel_timer();

        if !intents.is_empty() {
            info!("Released {} held control(s) on teardown", intents.len());
        }
        intents
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            debug!("Cancelled repeat timer for {}", timer.key);
        }
    }

    /// Clears devices that vanished from the frame or lost the selection
    /// to the canonical device; both release what they still held.
    fn drop_inactive(
        &mut self,
        frame: &[DeviceSnapshot],
        selected: &[&DeviceSnapshot],
        intents: &mut Vec<KeyIntent>,
    ) {
        let connected: HashSet<usize> = frame.iter().map(|d| d.index).collect();
        let active: HashSet<usize> = selected.iter().map(|d| d.index).collect();
        let mut inactive: Vec<usize> = self
            .devices
            .keys()
            .filter(|index| !active.contains(index))
            .copied()
            .collect();
        inactive.sort_unstable();

        for index in inactive {
            if connected.contains(&index) {
                info!("Device {} deselected, releasing its controls", index);
            } else {
                info!("Device {} disconnected, clearing its control state", index);
            }
            if let Some(controls) = self.devices.remove(&index) {
                release_held(controls, intents);
            }
            if self.timer.as_ref().is_some_and(|t| t.source.0 == index) {
                self.cancel_timer();
            }
        }
    }

    fn process_device(&mut self, device: &DeviceSnapshot, now: Instant, intents: &mut Vec<KeyIntent>) {
        let Self {
            key_map,
            settings,
            devices,
            timer,
        } = self;
        let controls = devices.entry(device.index).or_default();

        for (i, button) in device.buttons.iter().enumerate() {
            let control = ControlId::Button(i);
            let state = controls.entry(control).or_default();

            if button.pressed && !state.pressed {
                let key = key_map.button_key(i);
                debug!("Device {} {} pressed -> {}", device.index, control, key);
                state.pressed = true;
                state.active_key = Some(key);
                intents.push(KeyIntent::down(key));
                *timer = Some(RepeatTimer::arm(
                    key,
                    (device.index, control),
                    now,
                    settings.delay,
                    settings.interval,
                ));
            } else if !button.pressed && state.pressed {
                let key = state.active_key.take().unwrap_or_else(|| key_map.button_key(i));
                debug!("Device {} {} released -> {}", device.index, control, key);
                state.pressed = false;
                intents.push(KeyIntent::up(key));
                *timer = None;
            }
        }

        for (i, &value) in device.axes.iter().enumerate() {
            let control = ControlId::Axis(i);
            let computed = key_map.axis_key(i, value, settings.axis_threshold);
            let state = controls.entry(control).or_default();

            match computed {
                Some(key) if !state.pressed => {
                    debug!(
                        "Device {} {} crossed threshold ({:.3}) -> {}",
                        device.index, control, value, key
                    );
                    state.pressed = true;
                    state.active_key = Some(key);
                    intents.push(KeyIntent::down(key));
                    *timer = Some(RepeatTimer::arm(
                        key,
                        (device.index, control),
                        now,
                        settings.delay,
                        settings.interval,
                    ));
                }
                // still deflected; keep the key chosen on entry
                Some(_) => {}
                None if state.pressed => {
                    state.pressed = false;
                    if let Some(key) = state.active_key.take() {
                        debug!("Device {} {} returned -> release {}", device.index, control, key);
                        intents.push(KeyIntent::up(key));
                    }
                    *timer = None;
                }
                None => {}
            }
        }
    }
}

fn release_held(controls: HashMap<ControlId, ControlState>, intents: &mut Vec<KeyIntent>) {
    let mut held: Vec<(ControlId, LogicalKey)> = controls
        .into_iter()
        .filter(|(_, state)| state.pressed)
        .filter_map(|(control, state)| state.active_key.map(|key| (control, key)))
        .collect();
    held.sort_by_key(|(control, _)| *control);

    intents.extend(held.into_iter().map(|(_, key)| KeyIntent::up(key)));
}
