//! Input bridge: engine → focus gate → dispatcher
//!
//! Owns the whole translation pipeline. The controller task calls one of the
//! `on_*` methods per wake-up; since all of them run on the same task there
//! is no shared state and no locking.

use crate::controller::repeat_engine::{KeyIntent, RepeatEngine, RepeatSettings};
use crate::controller::snapshot::DeviceSnapshot;
use crate::mapping::dispatcher::Dispatcher;
use crate::mapping::focus::FocusGate;
use crate::mapping::injector::{KeyInjector, OskToggle};
use crate::mapping::key_map::KeyCodeMap;
use std::time::Instant;
use tracing::debug;

pub struct InputBridge<I, O> {
    engine: RepeatEngine,
    gate: FocusGate,
    dispatcher: Dispatcher<I, O>,
}

impl<I: KeyInjector, O: OskToggle> InputBridge<I, O> {
    pub fn new(
        key_map: KeyCodeMap,
        settings: RepeatSettings,
        focused: bool,
        injector: I,
        osk: O,
    ) -> Self {
        Self {
            engine: RepeatEngine::new(key_map.clone(), settings),
            gate: FocusGate::new(focused),
            dispatcher: Dispatcher::new(key_map, injector, osk),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<I, O> {
        &self.dispatcher
    }

    /// Poll frame tick
    pub fn on_frame(&mut self, frame: &[DeviceSnapshot], now: Instant) {
        let intents = self.engine.process_frame(frame, now);
        self.forward(intents);
    }

    /// Repeat deadline reached
    pub fn on_timer(&mut self, now: Instant) {
        let intents = self.engine.fire_due(now);
        self.forward(intents);
    }

    /// Host focus signal
    pub fn on_focus(&mut self, focused: bool) {
        self.gate.set_focused(focused);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.engine.next_deadline()
    }

    /// Releases every held key; called when polling stops
    pub fn shutdown(&mut self) {
        let intents = self.engine.release_all();
        debug!("Bridge shutdown with {} pending release(s)", intents.len());
        self.forward(intents);
    }

    fn forward(&mut self, intents: Vec<KeyIntent>) {
        let admitted = self.gate.admit(intents);
        self.dispatcher.dispatch_all(&admitted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::dispatcher::tests::{CountingToggle, RecordingInjector};
    use crate::mapping::injector::KeyEventType;
    use std::time::Duration;

    fn bridge(focused: bool) -> InputBridge<RecordingInjector, CountingToggle> {
        InputBridge::new(
            KeyCodeMap::default_config(),
            RepeatSettings::default(),
            focused,
            RecordingInjector::default(),
            CountingToggle::default(),
        )
    }

    fn pad(pressed: &[usize]) -> DeviceSnapshot {
        let mut buttons = vec![false; 17];
        for &i in pressed {
            buttons[i] = true;
        }
        DeviceSnapshot::new(0, "Test Pad").with_buttons(&buttons)
    }

    fn events(bridge: &InputBridge<RecordingInjector, CountingToggle>) -> Vec<(KeyEventType, String)> {
        bridge
            .dispatcher()
            .injector()
            .calls
            .iter()
            .map(|c| (c.event_type, c.code.clone()))
            .collect()
    }

    #[test]
    fn test_focus_loss_while_held() {
        let mut bridge = bridge(true);
        let t0 = Instant::now();

        bridge.on_frame(&[pad(&[0])], t0);
        bridge.on_focus(false);
        bridge.on_frame(&[pad(&[0])], t0 + Duration::from_millis(16));
        bridge.on_timer(t0 + Duration::from_millis(800));
        bridge.on_focus(true);
        bridge.on_frame(&[pad(&[0])], t0 + Duration::from_millis(816));
        bridge.on_frame(&[pad(&[])], t0 + Duration::from_millis(832));

        assert_eq!(
            events(&bridge),
            vec![
                (KeyEventType::KeyDown, "Return".to_string()),
                (KeyEventType::KeyUp, "Return".to_string()),
            ]
        );
    }

    #[test]
    fn test_repeat_burst_reaches_injector() {
        let mut bridge = bridge(true);
        let t0 = Instant::now();

        bridge.on_frame(&[pad(&[13])], t0);
        let mut t = t0;
        while let Some(deadline) = bridge.next_deadline() {
            if deadline > t0 + Duration::from_millis(900) {
                break;
            }
            t = deadline;
            bridge.on_timer(t);
        }
        bridge.on_frame(&[pad(&[])], t + Duration::from_millis(10));

        let downs = events(&bridge)
            .iter()
            .filter(|(ty, _)| *ty == KeyEventType::KeyDown)
            .count();
        // initial press + repeats at 600, 700, 800, 900
        assert_eq!(downs, 5);
        assert_eq!(
            events(&bridge).last(),
            Some(&(KeyEventType::KeyUp, "Down".to_string()))
        );
    }

    #[test]
    fn test_select_toggles_osk() {
        let mut bridge = bridge(true);
        let t0 = Instant::now();

        bridge.on_frame(&[pad(&[8])], t0);
        bridge.on_frame(&[pad(&[])], t0 + Duration::from_millis(50));

        assert_eq!(bridge.dispatcher().osk().toggles, 1);
        assert!(events(&bridge).is_empty());
    }

    #[test]
    fn test_shutdown_releases_held_keys() {
        let mut bridge = bridge(true);
        let t0 = Instant::now();

        bridge.on_frame(&[pad(&[5])], t0);
        bridge.shutdown();

        assert_eq!(
            events(&bridge),
            vec![
                (KeyEventType::KeyDown, "Tab".to_string()),
                (KeyEventType::KeyUp, "Tab".to_string()),
            ]
        );
        assert_eq!(bridge.next_deadline(), None);
    }
}
