//! # Shared UI styling
//!
//! Colors and frame helpers used by the demo page and the keyboard overlay.
//! Everything is a compile-time constant; the page has a single dark theme.

use eframe::egui::{self, Color32, Frame, Stroke};

/// Creates a styled frame with consistent margins and a one-pixel border.
pub fn create_frame(bg_color: Color32, border_color: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, border_color))
        .fill(bg_color)
        .inner_margin(4)
        .outer_margin(2)
}

/// Frame of a single keyboard cell, highlighted when selected or latched
pub fn key_frame(selected: bool, latched: bool, danger: bool) -> Frame {
    let (fill, border) = if selected {
        (UiColors::SELECTED, UiColors::SELECTED_BORDER)
    } else if latched {
        (UiColors::MODIFIER_ON, UiColors::MODIFIER_ON_BORDER)
    } else if danger {
        (UiColors::DANGER, UiColors::DANGER_BORDER)
    } else {
        (UiColors::KEY_BG, UiColors::KEY_BORDER)
    };
    Frame::new()
        .stroke(Stroke::new(if selected { 2.0 } else { 1.0 }, border))
        .fill(fill)
        .corner_radius(6)
        .inner_margin(egui::Margin::symmetric(6, 4))
}

/// Dark theme palette.
///
/// ## Color Hierarchy
/// - **Background Colors**: EXTREME_BG → INNER_BG → MAIN_BG (darkest to lightest)
/// - **Keyboard Colors**: KEY_BG for idle cells, SELECTED for the navigation
///   cursor, MODIFIER_ON for a latched Shift/Caps, DANGER for Exit
/// - **Status Colors**: ACTIVE (green) and INACTIVE (red)
pub struct UiColors;

impl UiColors {
    /// Primary background color for main content areas (RGB: 30, 30, 30)
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);

    /// Secondary background color for nested components (RGB: 25, 25, 25)
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);

    /// Deepest background color, used behind the keyboard (RGB: 20, 20, 20)
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);

    /// Border color for component separation (RGB: 60, 60, 60)
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    pub const KEY_BG: Color32 = Color32::from_rgb(102, 102, 102);
    pub const KEY_BORDER: Color32 = Color32::from_rgb(136, 136, 136);

    pub const SELECTED: Color32 = Color32::from_rgb(0, 120, 212);
    pub const SELECTED_BORDER: Color32 = Color32::WHITE;

    pub const MODIFIER_ON: Color32 = Color32::from_rgb(255, 107, 53);
    pub const MODIFIER_ON_BORDER: Color32 = Color32::from_rgb(255, 140, 66);

    pub const DANGER: Color32 = Color32::from_rgb(211, 47, 47);
    pub const DANGER_BORDER: Color32 = Color32::from_rgb(183, 28, 28);

    /// Active/focused status indicator color (RGB: 50, 200, 20) - Green
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    /// Inactive/unfocused status indicator color (RGB: 200, 50, 20) - Red
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);
}
