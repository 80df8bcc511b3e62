//! Focus gate
//!
//! Drops key intents while the host window is not focused. Only emission is
//! suppressed; the engine keeps its bookkeeping, so a button held across a
//! focus change neither re-fires its key-down nor loses its key-up.

use crate::controller::repeat_engine::KeyIntent;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct FocusGate {
    focused: bool,
}

impl FocusGate {
    pub fn new(focused: bool) -> Self {
        Self { focused }
    }

    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            info!("Host focus changed: {}", focused);
        }
        self.focused = focused;
    }

    /// Passes intents through while focused, swallows them otherwise
    pub fn admit(&self, intents: Vec<KeyIntent>) -> Vec<KeyIntent> {
        if self.focused {
            return intents;
        }
        if !intents.is_empty() {
            debug!("Suppressed {} key intent(s) while unfocused", intents.len());
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::key_map::LogicalKey;

    #[test]
    fn test_gate_follows_focus() {
        let mut gate = FocusGate::new(true);
        let intents = vec![KeyIntent::down(LogicalKey::Enter)];

        assert_eq!(gate.admit(intents.clone()), intents);

        gate.set_focused(false);
        assert!(gate.admit(intents.clone()).is_empty());

        gate.set_focused(true);
        assert_eq!(gate.admit(intents.clone()).len(), 1);
    }
}
