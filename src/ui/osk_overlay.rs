//! Rendering and input plumbing of the on-screen keyboard
//!
//! The overlay never mutates the keyboard itself. [`take_inputs`] pulls the
//! navigation keys out of the frame's input before any page widget sees them,
//! and [`show`] draws the grid and reports which cell was clicked.

use crate::osk::layout::{NavDirection, OskKey};
use crate::osk::{OnScreenKeyboard, OskInput};
use eframe::egui::{self, Event, Key, RichText, Sense, Vec2};

use super::common::{create_frame, key_frame, UiColors};

const KEY_HEIGHT: f32 = 36.0;
const KEY_SPACING: f32 = 6.0;

fn osk_input(key: Key) -> Option<OskInput> {
    match key {
        Key::ArrowUp => Some(OskInput::Navigate(NavDirection::Up)),
        Key::ArrowDown => Some(OskInput::Navigate(NavDirection::Down)),
        Key::ArrowLeft => Some(OskInput::Navigate(NavDirection::Left)),
        Key::ArrowRight => Some(OskInput::Navigate(NavDirection::Right)),
        Key::Enter | Key::Space => Some(OskInput::Activate),
        Key::Escape => Some(OskInput::Close),
        _ => None,
    }
}

/// Removes the keyboard's keys from this frame's events, in arrival order
///
/// Key-ups of those keys are swallowed as well so the page never sees half
/// of a key stroke.
pub fn take_inputs(ctx: &egui::Context) -> Vec<OskInput> {
    ctx.input_mut(|input| {
        let mut taken = Vec::new();
        input.events.retain(|event| match event {
            Event::Key { key, pressed, .. } => match osk_input(*key) {
                Some(osk) => {
                    if *pressed {
                        taken.push(osk);
                    }
                    false
                }
                None => true,
            },
            _ => true,
        });
        taken
    })
}

/// Relative width of a cell
fn key_weight(key: OskKey) -> f32 {
    match key {
        OskKey::Space => 6.0,
        OskKey::Char(_) => 1.0,
        _ => 2.0,
    }
}

/// Draws the keyboard in a bottom panel; returns the clicked cell
pub fn show(ctx: &egui::Context, osk: &OnScreenKeyboard) -> Option<(usize, usize)> {
    let session = osk.session()?;
    let mut clicked = None;

    egui::TopBottomPanel::bottom("osk_panel")
        .frame(create_frame(UiColors::EXTREME_BG, UiColors::BORDER))
        .show(ctx, |ui| {
            ui.add_space(8.0);
            create_frame(UiColors::INNER_BG, UiColors::SELECTED).show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                let text = session.buffer().as_str();
                if text.is_empty() {
                    ui.label(RichText::new("Type here...").monospace().weak());
                } else {
                    ui.label(RichText::new(text).monospace().size(16.0));
                }
            });
            ui.add_space(8.0);

            let cursor = session.cursor();
            for (row, keys) in osk.grid().rows().iter().enumerate() {
                let total: f32 = keys.iter().copied().map(key_weight).sum();
                let spacing = KEY_SPACING * keys.len().saturating_sub(1) as f32;
                let unit = ((ui.available_width() - spacing) / total).max(8.0);

                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = KEY_SPACING;
                    for (col, key) in keys.iter().copied().enumerate() {
                        let selected = cursor.row == row && cursor.col == col;
                        let latched = match key {
                            OskKey::Shift => session.shift(),
                            OskKey::Caps => session.caps(),
                            _ => false,
                        };
                        let size = Vec2::new(unit * key_weight(key), KEY_HEIGHT);
                        let label = osk.label(key);

                        let response = key_frame(selected, latched, key == OskKey::Exit)
                            .show(ui, |ui| {
                                ui.set_min_size(size - Vec2::splat(12.0));
                                ui.centered_and_justified(|ui| {
                                    ui.label(RichText::new(label).monospace().color(egui::Color32::WHITE));
                                });
                            })
                            .response
                            .interact(Sense::click());

                        if response.clicked() {
                            clicked = Some((row, col));
                        }
                    }
                });
                ui.add_space(KEY_SPACING);
            }
        });

    clicked
}
