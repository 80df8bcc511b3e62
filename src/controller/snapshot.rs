//! Per-frame device snapshots
//!
//! A snapshot is built fresh on every poll frame. Object identity means
//! nothing across frames; only `index` is stable while a pad stays connected.

use std::fmt;

/// Raw state of a single button
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonSnapshot {
    pub pressed: bool,
}

/// Snapshot of one connected device during one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// Session-stable device index
    pub index: usize,

    /// Identity string, e.g. `"Xbox Controller (STANDARD GAMEPAD Vendor: 045e Product: 028e)"`
    pub signature: String,

    /// Buttons in standard gamepad order
    pub buttons: Vec<ButtonSnapshot>,

    /// Axis values in `[-1.0, 1.0]`, standard order (left X, left Y, right X, right Y)
    pub axes: Vec<f32>,
}

impl DeviceSnapshot {
    pub fn new(index: usize, signature: impl Into<String>) -> Self {
        Self {
            index,
            signature: signature.into(),
            buttons: Vec::new(),
            axes: Vec::new(),
        }
    }

    /// Builder helper: set the pressed flags of all buttons
    pub fn with_buttons(mut self, pressed: &[bool]) -> Self {
        self.buttons = pressed
            .iter()
            .map(|&pressed| ButtonSnapshot { pressed })
            .collect();
        self
    }

    /// Builder helper: set all axis values
    pub fn with_axes(mut self, axes: &[f32]) -> Self {
        self.axes = axes.to_vec();
        self
    }
}

/// Identifies a control on a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlId {
    Button(usize),
    Axis(usize),
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlId::Button(i) => write!(f, "button {}", i),
            ControlId::Axis(i) => write!(f, "axis {}", i),
        }
    }
}
