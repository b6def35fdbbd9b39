//! Recording engine - keeps an ordered log of every call

use parking_lot::Mutex;
use std::fmt;

use super::Engine;
use crate::input::touchpad::LogicalButton;

/// One call made into an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    Press(LogicalButton),
    Release(LogicalButton),
}

impl fmt::Display for EngineCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCall::Press(b) => write!(f, "press {}", b),
            EngineCall::Release(b) => write!(f, "release {}", b),
        }
    }
}

/// Engine that records calls instead of emulating anything
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all calls so far, oldest first
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Drain the call log
    pub fn take(&self) -> Vec<EngineCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// How many times `button` was pressed
    pub fn press_count(&self, button: LogicalButton) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| **c == EngineCall::Press(button))
            .count()
    }
}

impl Engine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn press_button(&self, button: LogicalButton) {
        self.calls.lock().push(EngineCall::Press(button));
    }

    fn release_button(&self, button: LogicalButton) {
        self.calls.lock().push(EngineCall::Release(button));
    }
}
