//! Dispatcher: logical key intents → injection primitive calls
//!
//! Two intents bypass the generic table. `OpenOsk` toggles the on-screen
//! keyboard instead of emitting a key, and `ShiftTab` is sent as `Tab` with
//! an explicit shift modifier. Everything else becomes a single call with the
//! mapped code and no modifiers.
//!
//! Injection failures are retried once with the lower-cased code and then
//! dropped. The subsystem never stalls on a surface that refuses input.

use crate::controller::repeat_engine::{KeyIntent, KeyPhase};
use crate::mapping::injector::{KeyEventType, KeyInjector, Modifier, OskToggle};
use crate::mapping::key_map::{KeyCodeMap, LogicalKey};
use tracing::{debug, info, warn};

pub struct Dispatcher<I, O> {
    key_map: KeyCodeMap,
    injector: I,
    osk: O,
}

impl<I: KeyInjector, O: OskToggle> Dispatcher<I, O> {
    pub fn new(key_map: KeyCodeMap, injector: I, osk: O) -> Self {
        Self {
            key_map,
            injector,
            osk,
        }
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn osk(&self) -> &O {
        &self.osk
    }

    pub fn dispatch_all(&mut self, intents: &[KeyIntent]) {
        for intent in intents {
            self.dispatch(intent);
        }
    }

    pub fn dispatch(&mut self, intent: &KeyIntent) {
        let event_type = match intent.phase {
            KeyPhase::Down => KeyEventType::KeyDown,
            KeyPhase::Up => KeyEventType::KeyUp,
        };

        match intent.key {
            LogicalKey::OpenOsk => {
                // held select must not flicker the overlay
                if intent.phase == KeyPhase::Down && !intent.repeat {
                    info!("Toggling on-screen keyboard");
                    self.osk.toggle_osk();
                }
            }
            LogicalKey::ShiftTab => {
                let code = self.key_map.key_info(LogicalKey::Tab).code.clone();
                self.inject(event_type, &code, &[Modifier::Shift]);
            }
            key => {
                let code = self.key_map.key_info(key).code.clone();
                self.inject(event_type, &code, &[]);
            }
        }
    }

    fn inject(&mut self, event_type: KeyEventType, code: &str, modifiers: &[Modifier]) {
        let error = match self.injector.inject(event_type, code, modifiers) {
            Ok(()) => return,
            Err(e) => e,
        };

        let degraded = code.to_lowercase();
        warn!(
            "Injecting {} {} failed ({}), retrying as {}",
            event_type, code, error, degraded
        );
        if let Err(e) = self.injector.inject(event_type, &degraded, modifiers) {
            debug!("Dropped {} {}: {}", event_type, code, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mapping::error::InjectError;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Call {
        pub event_type: KeyEventType,
        pub code: String,
        pub modifiers: Vec<Modifier>,
    }

    /// Records every injection attempt; rejects codes listed in `reject`
    #[derive(Debug, Default)]
    pub(crate) struct RecordingInjector {
        pub calls: Vec<Call>,
        pub reject: Vec<String>,
    }

    impl RecordingInjector {
        pub fn delivered(&self) -> Vec<&Call> {
            self.calls
                .iter()
                .filter(|c| !self.reject.contains(&c.code))
                .collect()
        }
    }

    impl KeyInjector for RecordingInjector {
        fn inject(
            &mut self,
            event_type: KeyEventType,
            code: &str,
            modifiers: &[Modifier],
        ) -> Result<(), InjectError> {
            self.calls.push(Call {
                event_type,
                code: code.to_string(),
                modifiers: modifiers.to_vec(),
            });
            if self.reject.iter().any(|r| r == code) {
                return Err(InjectError::UnsupportedCode(code.to_string()));
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct CountingToggle {
        pub toggles: usize,
    }

    impl OskToggle for CountingToggle {
        fn toggle_osk(&mut self) {
            self.toggles += 1;
        }
    }

    fn dispatcher(reject: &[&str]) -> Dispatcher<RecordingInjector, CountingToggle> {
        let injector = RecordingInjector {
            calls: Vec::new(),
            reject: reject.iter().map(|s| s.to_string()).collect(),
        };
        Dispatcher::new(KeyCodeMap::default_config(), injector, CountingToggle::default())
    }

    #[test]
    fn test_plain_key() {
        let mut d = dispatcher(&[]);
        d.dispatch(&KeyIntent::down(LogicalKey::Enter));
        d.dispatch(&KeyIntent::up(LogicalKey::Enter));

        assert_eq!(
            d.injector().calls,
            vec![
                Call {
                    event_type: KeyEventType::KeyDown,
                    code: "Return".to_string(),
                    modifiers: vec![],
                },
                Call {
                    event_type: KeyEventType::KeyUp,
                    code: "Return".to_string(),
                    modifiers: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_shift_tab_carries_modifier() {
        let mut d = dispatcher(&[]);
        d.dispatch(&KeyIntent::down(LogicalKey::ShiftTab));

        let call = &d.injector().calls[0];
        assert_eq!(call.code, "Tab");
        assert_eq!(call.modifiers, vec![Modifier::Shift]);
    }

    #[test]
    fn test_open_osk_toggles_without_key() {
        let mut d = dispatcher(&[]);
        d.dispatch(&KeyIntent::down(LogicalKey::OpenOsk));
        d.dispatch(&KeyIntent::repeat(LogicalKey::OpenOsk));
        d.dispatch(&KeyIntent::up(LogicalKey::OpenOsk));

        assert_eq!(d.osk().toggles, 1);
        assert!(d.injector().calls.is_empty());
    }

    #[test]
    fn test_fallback_key_code() {
        let mut d = dispatcher(&[]);
        d.dispatch(&KeyIntent::down(LogicalKey::Fallback));

        assert_eq!(d.injector().calls[0].code, "F24");
    }

    #[test]
    fn test_failed_injection_retries_lowercase_once() {
        let mut d = dispatcher(&["Return"]);
        d.dispatch(&KeyIntent::down(LogicalKey::Enter));

        let codes: Vec<&str> = d.injector().calls.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["Return", "return"]);
        assert_eq!(d.injector().delivered().len(), 1);
    }

    #[test]
    fn test_double_failure_is_dropped() {
        let mut d = dispatcher(&["Escape", "escape"]);
        d.dispatch(&KeyIntent::down(LogicalKey::Escape));
        d.dispatch(&KeyIntent::down(LogicalKey::Tab));

        // two attempts for escape, then the stream simply continues
        assert_eq!(d.injector().calls.len(), 3);
        assert_eq!(d.injector().delivered()[0].code, "Tab");
    }
}
