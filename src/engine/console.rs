//! Console engine - logs every button call for testing and debugging

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use super::Engine;
use crate::input::touchpad::LogicalButton;

/// ConsoleEngine logs all press/release calls
///
/// This is useful for:
/// - Trying out a pad layout without a running emulator
/// - Checking that only transitions reach the engine
pub struct ConsoleEngine {
    name: String,
    /// Call counter for debugging
    call_count: AtomicU64,
}

impl ConsoleEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_count: AtomicU64::new(0),
        }
    }

    /// Number of press/release calls received so far
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    fn log_call(&self, verb: &str, button: LogicalButton) {
        let call_num = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "🎮 Engine '{}' → {} {} [call #{}]",
            self.name,
            verb,
            button.engine_code(),
            call_num
        );
        debug!(
            engine = %self.name,
            verb = verb,
            button = %button,
            call_count = call_num,
            "ConsoleEngine call"
        );
    }
}

impl Engine for ConsoleEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn press_button(&self, button: LogicalButton) {
        self.log_call("press", button);
    }

    fn release_button(&self, button: LogicalButton) {
        self.log_call("release", button);
    }
}
