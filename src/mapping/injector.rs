//! Key injection seam
//!
//! [`KeyInjector`] is the trusted key-injection primitive the dispatcher
//! talks to; [`OskToggle`] is the one non-key intent it can raise. The
//! production implementation, [`EguiInjector`], turns both into
//! [`PageEvent`]s on a channel that the UI drains in its `raw_input_hook`,
//! so injected keys reach egui exactly like hardware keys do.

use crate::mapping::error::InjectError;
use eframe::egui::{self, Key, Modifiers};
use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

/// Direction of an injected key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
}

impl fmt::Display for KeyEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEventType::KeyDown => write!(f, "keyDown"),
            KeyEventType::KeyUp => write!(f, "keyUp"),
        }
    }
}

/// Modifiers the injection primitive accepts alongside a key code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Shift,
}

/// Dispatches a key event into the host surface as if it came from a keyboard
pub trait KeyInjector {
    fn inject(
        &mut self,
        event_type: KeyEventType,
        code: &str,
        modifiers: &[Modifier],
    ) -> Result<(), InjectError>;
}

/// Raises or lowers the on-screen keyboard
pub trait OskToggle {
    fn toggle_osk(&mut self);
}

/// Events delivered from the controller task to the UI, in order
#[derive(Debug, Clone)]
pub enum PageEvent {
    Key(egui::Event),
    ToggleOsk,
}

/// Injector feeding the egui host through a bounded channel
#[derive(Debug, Clone)]
pub struct EguiInjector {
    sender: mpsc::Sender<PageEvent>,
}

impl EguiInjector {
    pub fn new(sender: mpsc::Sender<PageEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: PageEvent) -> Result<(), InjectError> {
        self.sender
            .try_send(event)
            .map_err(|e| InjectError::SurfaceUnavailable(e.to_string()))
    }
}

impl KeyInjector for EguiInjector {
    fn inject(
        &mut self,
        event_type: KeyEventType,
        code: &str,
        modifiers: &[Modifier],
    ) -> Result<(), InjectError> {
        let key = key_from_code(code).ok_or_else(|| InjectError::UnsupportedCode(code.to_string()))?;

        let event = egui::Event::Key {
            key,
            physical_key: Some(key),
            pressed: event_type == KeyEventType::KeyDown,
            repeat: false,
            modifiers: egui_modifiers(modifiers),
        };
        debug!("Injecting {} {:?} {:?}", event_type, key, modifiers);
        self.send(PageEvent::Key(event))
    }
}

impl OskToggle for EguiInjector {
    fn toggle_osk(&mut self) {
        if let Err(e) = self.send(PageEvent::ToggleOsk) {
            debug!("Dropped OSK toggle: {}", e);
        }
    }
}

/// Resolves an injection code to an egui key
fn key_from_code(code: &str) -> Option<Key> {
    match code {
        "Return" | "Enter" => Some(Key::Enter),
        "Escape" => Some(Key::Escape),
        "Space" => Some(Key::Space),
        "Tab" => Some(Key::Tab),
        "Up" => Some(Key::ArrowUp),
        "Down" => Some(Key::ArrowDown),
        "Left" => Some(Key::ArrowLeft),
        "Right" => Some(Key::ArrowRight),
        other => Key::from_name(other),
    }
}

fn egui_modifiers(modifiers: &[Modifier]) -> Modifiers {
    modifiers.iter().fold(Modifiers::NONE, |mods, modifier| {
        mods.plus(match modifier {
            Modifier::Shift => Modifiers::SHIFT,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(key_from_code("Return"), Some(Key::Enter));
        assert_eq!(key_from_code("Up"), Some(Key::ArrowUp));
        assert_eq!(key_from_code("F2"), Some(Key::F2));
        assert_eq!(key_from_code("F24"), Some(Key::F24));
        assert_eq!(key_from_code("Unidentified"), None);
    }

    #[test]
    fn test_inject_sends_key_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut injector = EguiInjector::new(tx);

        injector
            .inject(KeyEventType::KeyDown, "Tab", &[Modifier::Shift])
            .unwrap();
        injector.inject(KeyEventType::KeyUp, "Return", &[]).unwrap();

        match rx.try_recv().unwrap() {
            PageEvent::Key(egui::Event::Key {
                key,
                pressed,
                modifiers,
                ..
            }) => {
                assert_eq!(key, Key::Tab);
                assert!(pressed);
                assert!(modifiers.shift);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.try_recv().unwrap() {
            PageEvent::Key(egui::Event::Key {
                key,
                pressed,
                modifiers,
                ..
            }) => {
                assert_eq!(key, Key::Enter);
                assert!(!pressed);
                assert_eq!(modifiers, Modifiers::NONE);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let (tx, _rx) = mpsc::channel(8);
        let mut injector = EguiInjector::new(tx);

        let result = injector.inject(KeyEventType::KeyDown, "Unidentified", &[]);
        assert_eq!(
            result,
            Err(InjectError::UnsupportedCode("Unidentified".to_string()))
        );
    }

    #[test]
    fn test_closed_surface() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let mut injector = EguiInjector::new(tx);

        let result = injector.inject(KeyEventType::KeyDown, "Escape", &[]);
        assert!(matches!(result, Err(InjectError::SurfaceUnavailable(_))));
    }

    #[test]
    fn test_toggle_is_ordered_with_keys() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut injector = EguiInjector::new(tx);

        injector.inject(KeyEventType::KeyDown, "Escape", &[]).unwrap();
        injector.toggle_osk();

        assert!(matches!(rx.try_recv().unwrap(), PageEvent::Key(_)));
        assert!(matches!(rx.try_recv().unwrap(), PageEvent::ToggleOsk));
    }
}
