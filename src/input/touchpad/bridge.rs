//! Emulator input bridge - forwards tracker transitions to the engine
//!
//! Only transitions cross the engine boundary: a button that stayed pressed
//! (or stayed released) between two passes produces no call.
//!
//! The engine may not exist yet (core still loading) or may be torn down
//! and replaced (ROM reload). While no engine is attached, transitions are
//! dropped. The first pass after an engine attaches re-synchronises it from
//! the full active set, so a button pressed during the gap is not lost.

use std::sync::Arc;
use tracing::{debug, trace};

use super::buttons::ButtonSet;
use super::tracker::Transition;
use crate::engine::Engine;

pub struct InputBridge {
    engine: Option<Arc<dyn Engine>>,
    /// Next pass must push the whole active set
    resync_pending: bool,
    /// What the attached engine currently believes is held
    held: ButtonSet,
    /// Transitions dropped while detached (diagnostics)
    dropped: u64,
}

impl InputBridge {
    /// Bridge with no engine attached yet
    pub fn new() -> Self {
        Self {
            engine: None,
            resync_pending: false,
            held: ButtonSet::new(),
            dropped: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    /// Buttons the attached engine has been told are down
    pub fn held(&self) -> ButtonSet {
        self.held
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Attach (or replace) the engine; the next pass re-synchronises it
    pub fn attach_engine(&mut self, engine: Arc<dyn Engine>) {
        if let Some(old) = self.detach_engine() {
            debug!("Replacing engine '{}' with '{}'", old.name(), engine.name());
        }
        debug!("Engine '{}' attached, resync pending", engine.name());
        self.engine = Some(engine);
        self.held = ButtonSet::new();
        self.resync_pending = true;
    }

    /// Detach the engine, releasing whatever it still holds
    pub fn detach_engine(&mut self) -> Option<Arc<dyn Engine>> {
        let engine = self.engine.take()?;
        for button in self.held.iter() {
            engine.release_button(button);
        }
        debug!("Engine '{}' detached (released {})", engine.name(), self.held);
        self.held = ButtonSet::new();
        self.resync_pending = false;
        Some(engine)
    }

    /// Forward one pass to the engine
    ///
    /// Releases are sent before presses. A button never appears in both
    /// lists of one transition, so the order cannot contradict itself.
    pub fn apply(&mut self, transition: &Transition) {
        let Some(engine) = self.engine.as_ref() else {
            if !transition.is_empty() {
                self.dropped += 1;
                trace!(
                    pressed = %transition.pressed,
                    released = %transition.released,
                    "No engine attached, dropping transition"
                );
            }
            return;
        };

        if self.resync_pending {
            self.resync_pending = false;
            debug!("Resynchronising engine '{}' with {}", engine.name(), transition.set);
            for button in transition.set.iter() {
                engine.press_button(button);
            }
            self.held = transition.set;
            return;
        }

        for button in transition.released.iter() {
            engine.release_button(button);
        }
        for button in transition.pressed.iter() {
            engine.press_button(button);
        }
        self.held = self
            .held
            .union(&transition.pressed)
            .difference(&transition.released);
    }
}

impl Default for InputBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCall, RecordingEngine};
    use crate::input::touchpad::buttons::LogicalButton;

    fn set(buttons: &[LogicalButton]) -> ButtonSet {
        buttons.iter().copied().collect()
    }

    fn attached() -> (InputBridge, Arc<RecordingEngine>) {
        let engine = Arc::new(RecordingEngine::new());
        let mut bridge = InputBridge::new();
        bridge.attach_engine(engine.clone());
        // Consume the initial resync with an empty set
        bridge.apply(&Transition::steady(ButtonSet::new()));
        (bridge, engine)
    }

    #[test]
    fn test_empty_transition_makes_no_calls() {
        let (mut bridge, engine) = attached();
        bridge.apply(&Transition::steady(set(&[LogicalButton::A])));
        bridge.apply(&Transition::default());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_transitions_emit_exactly_once() {
        let (mut bridge, engine) = attached();
        bridge.apply(&Transition {
            set: set(&[LogicalButton::B]),
            pressed: set(&[LogicalButton::B]),
            released: ButtonSet::new(),
        });
        bridge.apply(&Transition {
            set: set(&[LogicalButton::A]),
            pressed: set(&[LogicalButton::A]),
            released: set(&[LogicalButton::B]),
        });

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Press(LogicalButton::B),
                EngineCall::Release(LogicalButton::B),
                EngineCall::Press(LogicalButton::A),
            ]
        );
        assert_eq!(bridge.held(), set(&[LogicalButton::A]));
    }

    #[test]
    fn test_detached_bridge_drops_calls() {
        let mut bridge = InputBridge::new();
        assert!(!bridge.is_ready());
        bridge.apply(&Transition {
            set: set(&[LogicalButton::A]),
            pressed: set(&[LogicalButton::A]),
            released: ButtonSet::new(),
        });
        assert_eq!(bridge.dropped(), 1);
        assert!(bridge.held().is_empty());
    }

    #[test]
    fn test_attach_resyncs_full_set_once() {
        let mut bridge = InputBridge::new();
        // A pressed while the engine was still loading
        bridge.apply(&Transition {
            set: set(&[LogicalButton::A]),
            pressed: set(&[LogicalButton::A]),
            released: ButtonSet::new(),
        });

        let engine = Arc::new(RecordingEngine::new());
        bridge.attach_engine(engine.clone());
        assert!(engine.is_empty());

        // Next pass, no movement
        bridge.apply(&Transition::steady(set(&[LogicalButton::A])));
        assert_eq!(engine.calls(), vec![EngineCall::Press(LogicalButton::A)]);

        // Further steady passes stay silent
        bridge.apply(&Transition::steady(set(&[LogicalButton::A])));
        assert_eq!(engine.press_count(LogicalButton::A), 1);
    }

    #[test]
    fn test_detach_releases_held_buttons() {
        let (mut bridge, engine) = attached();
        bridge.apply(&Transition {
            set: set(&[LogicalButton::Up]),
            pressed: set(&[LogicalButton::Up]),
            released: ButtonSet::new(),
        });

        let detached = bridge.detach_engine();
        assert!(detached.is_some());
        assert!(!bridge.is_ready());
        assert_eq!(
            engine.calls(),
            vec![EngineCall::Press(LogicalButton::Up), EngineCall::Release(LogicalButton::Up)]
        );
    }
}
