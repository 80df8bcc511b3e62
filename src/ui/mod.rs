//! # Host page
//!
//! [`PageUI`] is the eframe app standing in for the rendered page. It is the
//! far end of the injection channel: the controller task pushes
//! [`PageEvent`]s, and `raw_input_hook` replays them as ordinary egui key
//! events so every widget reacts to the gamepad exactly like to a keyboard.
//!
//! ## Layout
//! - **Top Panel**: status line (window focus, keyboard state)
//! - **Central Panel**: the [`page::DemoPage`] form
//! - **Bottom Panel**: the on-screen keyboard while it is open
//!
//! ## Event ordering
//! A `ToggleOsk` that arrives after key events of the same frame is held
//! back until the next frame, so keys pressed before the toggle still reach
//! the page and keys pressed after it reach the keyboard.

pub mod common;
pub mod osk_overlay;
pub mod page;

use eframe::egui::{self, RichText, ViewportCommand};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::mapping::injector::PageEvent;
use crate::osk::{OnScreenKeyboard, OskOutcome};

use self::common::UiColors;
use self::page::DemoPage;

/// Events replayed in a single frame
#[derive(Debug, Default)]
struct FrameBatch {
    toggles: usize,
    keys: Vec<egui::Event>,
}

/// Takes this frame's share of `pending`: leading toggles, then keys up to
/// the next toggle, which stays queued for the following frame.
fn next_batch(pending: &mut VecDeque<PageEvent>) -> FrameBatch {
    let mut batch = FrameBatch::default();
    while let Some(event) = pending.pop_front() {
        match event {
            PageEvent::Key(key_event) => batch.keys.push(key_event),
            PageEvent::ToggleOsk if !batch.keys.is_empty() => {
                pending.push_front(PageEvent::ToggleOsk);
                break;
            }
            PageEvent::ToggleOsk => batch.toggles += 1,
        }
    }
    batch
}

pub struct PageUI {
    /// Events injected by the controller task
    event_receiver: mpsc::Receiver<PageEvent>,

    /// Events drained from the channel but not yet replayed
    pending: VecDeque<PageEvent>,

    /// Window focus as last reported to the controller task
    focus_sender: watch::Sender<bool>,
    window_focused: bool,

    page: DemoPage,
    osk: OnScreenKeyboard,
    osk_toggles: usize,
}

impl PageUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        event_receiver: mpsc::Receiver<PageEvent>,
        focus_sender: watch::Sender<bool>,
        allow_exit: bool,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        let window_focused = *focus_sender.borrow();
        PageUI {
            event_receiver,
            pending: VecDeque::new(),
            focus_sender,
            window_focused,
            page: DemoPage::new(),
            osk: OnScreenKeyboard::new(allow_exit),
            osk_toggles: 0,
        }
    }

    fn apply_outcome(&mut self, ctx: &egui::Context, outcome: OskOutcome) {
        match outcome {
            OskOutcome::ExitRequested => {
                info!("Closing window on keyboard exit request");
                ctx.send_viewport_cmd(ViewportCommand::Close);
            }
            OskOutcome::Ignored => {}
            other => debug!("Keyboard outcome: {:?}", other),
        }
    }

    fn report_focus(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.focused);
        if focused != self.window_focused {
            info!("Window focus changed: {}", focused);
            self.window_focused = focused;
            self.focus_sender.send_replace(focused);
        }
    }
}

impl eframe::App for PageUI {
    /// Replays injected events into egui's input before the frame runs
    fn raw_input_hook(&mut self, ctx: &egui::Context, raw_input: &mut egui::RawInput) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.pending.push_back(event);
        }

        let batch = next_batch(&mut self.pending);
        for _ in 0..batch.toggles {
            self.osk_toggles += 1;
            let outcome = self.osk.toggle(&mut self.page);
            self.apply_outcome(ctx, outcome);
        }
        raw_input.events.extend(batch.keys);

        if !self.pending.is_empty() {
            ctx.request_repaint();
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(16));
        self.report_focus(ctx);

        if self.osk.is_open() {
            for input in osk_overlay::take_inputs(ctx) {
                let outcome = self.osk.handle_input(input, &mut self.page);
                self.apply_outcome(ctx, outcome);
            }
        }

        egui::TopBottomPanel::top("status_panel")
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    let (dot, color) = if self.window_focused {
                        ("● focused", UiColors::ACTIVE)
                    } else {
                        ("● unfocused", UiColors::INACTIVE)
                    };
                    ui.label(RichText::new(dot).color(color));
                    ui.separator();
                    ui.label(if self.osk.is_open() {
                        "Keyboard open"
                    } else {
                        "Keyboard closed (Select to open)"
                    });
                    ui.separator();
                    ui.label(format!("Toggles: {}", self.osk_toggles));
                });
            });

        if let Some((row, col)) = osk_overlay::show(ctx, &self.osk) {
            let outcome = self.osk.activate_cell(row, col, &mut self.page);
            self.apply_outcome(ctx, outcome);
        }

        let freeze_focus = self.osk.is_open();
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(UiColors::MAIN_BG).inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.page.render(ui, freeze_focus);
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Key, Modifiers};

    fn key(key: Key) -> PageEvent {
        PageEvent::Key(egui::Event::Key {
            key,
            physical_key: Some(key),
            pressed: true,
            repeat: false,
            modifiers: Modifiers::NONE,
        })
    }

    fn keys_of(batch: &FrameBatch) -> Vec<Key> {
        batch
            .keys
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_toggle_after_keys_waits_for_next_frame() {
        let mut pending: VecDeque<PageEvent> =
            [key(Key::ArrowDown), PageEvent::ToggleOsk, key(Key::Enter)].into();

        let first = next_batch(&mut pending);
        assert_eq!(first.toggles, 0);
        assert_eq!(keys_of(&first), vec![Key::ArrowDown]);
        assert_eq!(pending.len(), 2);

        let second = next_batch(&mut pending);
        assert_eq!(second.toggles, 1);
        assert_eq!(keys_of(&second), vec![Key::Enter]);
        assert!(pending.is_empty());

        let third = next_batch(&mut pending);
        assert_eq!(third.toggles, 0);
        assert!(third.keys.is_empty());
    }

    #[test]
    fn test_leading_toggles_share_a_frame() {
        let mut pending: VecDeque<PageEvent> = [
            PageEvent::ToggleOsk,
            PageEvent::ToggleOsk,
            key(Key::Space),
            PageEvent::ToggleOsk,
        ]
        .into();

        let batch = next_batch(&mut pending);
        assert_eq!(batch.toggles, 2);
        assert_eq!(keys_of(&batch), vec![Key::Space]);
        assert_eq!(pending.len(), 1);
    }
}
