//! Static lookup tables: controller index → logical key → injection code.
//!
//! Two tables live here. The first resolves a physical control (button index
//! or axis reading) into a [`LogicalKey`]. The second resolves a logical key
//! into the `(code, label)` pair the injection primitive expects.
//!
//! Nothing in this module fails. Unknown button indices become
//! [`LogicalKey::Fallback`], and logical keys without a table entry resolve to
//! the fallback [`KeyInfo`] (F24). Pages ignore F24 as an action but still
//! count it as user activity, so every control has a visible effect.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Default magnitude an axis has to exceed before it counts as pressed
pub const DEFAULT_AXIS_THRESHOLD: f32 = 0.5;

/// Logical keys produced by the translation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalKey {
    Enter,
    Escape,
    Space,
    Tab,
    /// Tab with the shift modifier held
    ShiftTab,
    /// F2, used by the page to seek backwards
    SeekBackward,
    /// F3, used by the page to seek forwards
    SeekForward,
    F4,
    /// Raises or lowers the on-screen keyboard
    OpenOsk,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// F24, no page action but wakes idle detection
    Fallback,
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Code/label pair understood by the key injection primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub code: String,
    pub label: String,
}

impl KeyInfo {
    pub fn new(code: &str, label: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }

    /// Target for every logical key without its own entry
    pub fn fallback() -> Self {
        Self::new("F24", "F24")
    }
}

/// Override for a single physical button, as read from the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub index: usize,
    pub key: LogicalKey,
}

/// Both lookup tables of the translation engine
#[derive(Debug, Clone)]
pub struct KeyCodeMap {
    /// Physical button index → logical key
    button_mapping: HashMap<usize, LogicalKey>,

    /// Logical key → injection code
    key_table: HashMap<LogicalKey, KeyInfo>,

    /// Resolution target for keys missing from `key_table`
    fallback: KeyInfo,
}

impl Default for KeyCodeMap {
    fn default() -> Self {
        Self::default_config()
    }
}

impl KeyCodeMap {
    /// Standard gamepad layout, aiming for parity with console TV apps
    pub fn default_config() -> Self {
        let mut button_mapping = HashMap::new();
        button_mapping.insert(0, LogicalKey::Enter); // A
        button_mapping.insert(1, LogicalKey::Escape); // B
        button_mapping.insert(2, LogicalKey::Space); // X
        button_mapping.insert(3, LogicalKey::Enter); // Y
        button_mapping.insert(4, LogicalKey::ShiftTab); // LB
        button_mapping.insert(5, LogicalKey::Tab); // RB
        button_mapping.insert(6, LogicalKey::SeekBackward); // LT
        button_mapping.insert(7, LogicalKey::SeekForward); // RT
        button_mapping.insert(8, LogicalKey::OpenOsk); // Select
        button_mapping.insert(9, LogicalKey::Enter); // Start
        button_mapping.insert(12, LogicalKey::ArrowUp);
        button_mapping.insert(13, LogicalKey::ArrowDown);
        button_mapping.insert(14, LogicalKey::ArrowLeft);
        button_mapping.insert(15, LogicalKey::ArrowRight);

        let mut key_table = HashMap::new();
        key_table.insert(LogicalKey::Enter, KeyInfo::new("Return", "Enter"));
        key_table.insert(LogicalKey::Escape, KeyInfo::new("Escape", "Escape"));
        key_table.insert(LogicalKey::Space, KeyInfo::new("Space", " "));
        key_table.insert(LogicalKey::Tab, KeyInfo::new("Tab", "Tab"));
        key_table.insert(LogicalKey::SeekBackward, KeyInfo::new("F2", "F2"));
        key_table.insert(LogicalKey::SeekForward, KeyInfo::new("F3", "F3"));
        key_table.insert(LogicalKey::F4, KeyInfo::new("F4", "F4"));
        key_table.insert(LogicalKey::ArrowUp, KeyInfo::new("Up", "ArrowUp"));
        key_table.insert(LogicalKey::ArrowDown, KeyInfo::new("Down", "ArrowDown"));
        key_table.insert(LogicalKey::ArrowLeft, KeyInfo::new("Left", "ArrowLeft"));
        key_table.insert(LogicalKey::ArrowRight, KeyInfo::new("Right", "ArrowRight"));
        key_table.insert(LogicalKey::Fallback, KeyInfo::fallback());

        Self {
            button_mapping,
            key_table,
            fallback: KeyInfo::fallback(),
        }
    }

    /// Default layout with config-file overrides applied on top
    pub fn with_bindings(bindings: &[ButtonBinding]) -> Self {
        let mut map = Self::default_config();
        for binding in bindings {
            debug!("Button {} rebound to {}", binding.index, binding.key);
            map.button_mapping.insert(binding.index, binding.key);
        }
        map
    }

    /// Logical key of a physical button; unmapped indices fall back
    pub fn button_key(&self, index: usize) -> LogicalKey {
        self.button_mapping
            .get(&index)
            .copied()
            .unwrap_or(LogicalKey::Fallback)
    }

    /// Logical key an axis reading stands for, `None` inside the dead zone
    ///
    /// Stick axes have two directions. The remaining axes 2 and 3 (second
    /// stick, or triggers on some pads) collapse to the fallback key.
    pub fn axis_key(&self, axis: usize, value: f32, threshold: f32) -> Option<LogicalKey> {
        let positive = value > threshold;
        let negative = value < -threshold;

        match axis {
            0 if positive => Some(LogicalKey::ArrowRight),
            0 if negative => Some(LogicalKey::ArrowLeft),
            1 if positive => Some(LogicalKey::ArrowDown),
            1 if negative => Some(LogicalKey::ArrowUp),
            2 | 3 if positive || negative => Some(LogicalKey::Fallback),
            _ => None,
        }
    }

    /// Injection code of a logical key
    pub fn key_info(&self, key: LogicalKey) -> &KeyInfo {
        self.key_table.get(&key).unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buttons() {
        let map = KeyCodeMap::default_config();

        assert_eq!(map.button_key(0), LogicalKey::Enter);
        assert_eq!(map.button_key(1), LogicalKey::Escape);
        assert_eq!(map.button_key(4), LogicalKey::ShiftTab);
        assert_eq!(map.button_key(8), LogicalKey::OpenOsk);
        assert_eq!(map.button_key(15), LogicalKey::ArrowRight);
    }

    #[test]
    fn test_unmapped_button_falls_back() {
        let map = KeyCodeMap::default_config();

        assert_eq!(map.button_key(10), LogicalKey::Fallback);
        assert_eq!(map.button_key(16), LogicalKey::Fallback);
        assert_eq!(map.button_key(99), LogicalKey::Fallback);
    }

    #[test]
    fn test_key_info_lookup() {
        let map = KeyCodeMap::default_config();

        assert_eq!(map.key_info(LogicalKey::Enter).code, "Return");
        assert_eq!(map.key_info(LogicalKey::Space).label, " ");
        assert_eq!(map.key_info(LogicalKey::ArrowUp).code, "Up");
        // special-cased by the dispatcher, never in the table
        assert_eq!(map.key_info(LogicalKey::OpenOsk), &KeyInfo::fallback());
        assert_eq!(map.key_info(LogicalKey::ShiftTab).code, "F24");
    }

    #[test]
    fn test_axis_keys() {
        let map = KeyCodeMap::default_config();
        let t = DEFAULT_AXIS_THRESHOLD;

        assert_eq!(map.axis_key(0, 0.8, t), Some(LogicalKey::ArrowRight));
        assert_eq!(map.axis_key(0, -0.8, t), Some(LogicalKey::ArrowLeft));
        assert_eq!(map.axis_key(1, 0.6, t), Some(LogicalKey::ArrowDown));
        assert_eq!(map.axis_key(1, -0.6, t), Some(LogicalKey::ArrowUp));
        assert_eq!(map.axis_key(2, -0.9, t), Some(LogicalKey::Fallback));
        assert_eq!(map.axis_key(3, 0.9, t), Some(LogicalKey::Fallback));

        // threshold itself is still inside the dead zone
        assert_eq!(map.axis_key(0, 0.5, t), None);
        assert_eq!(map.axis_key(1, -0.5, t), None);
        assert_eq!(map.axis_key(4, 1.0, t), None);
    }

    #[test]
    fn test_bindings_override_defaults() {
        let map = KeyCodeMap::with_bindings(&[
            ButtonBinding {
                index: 3,
                key: LogicalKey::Escape,
            },
            ButtonBinding {
                index: 10,
                key: LogicalKey::F4,
            },
        ]);

        assert_eq!(map.button_key(3), LogicalKey::Escape);
        assert_eq!(map.button_key(10), LogicalKey::F4);
        assert_eq!(map.button_key(0), LogicalKey::Enter);
    }
}
