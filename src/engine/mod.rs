//! Emulation engines the pad can drive
//!
//! The emulator core is a black box to the input layer: it only needs two
//! discrete entry points, one for "button down" and one for "button up".

use crate::input::touchpad::LogicalButton;

/// Engine trait - anything that accepts joypad presses implements this
///
/// Note: methods take &self so engines can be shared as `Arc<dyn Engine>`
/// between the input bridge and the frame loop. Implementations use
/// interior mutability for their button state.
pub trait Engine: Send + Sync {
    /// Engine name for logs (e.g., "console", "joypad")
    fn name(&self) -> &str;

    /// The player pressed `button`
    fn press_button(&self, button: LogicalButton);

    /// The player released `button`
    fn release_button(&self, button: LogicalButton);
}

pub mod console;
pub mod joypad;
pub mod recording;

pub use console::ConsoleEngine;
pub use joypad::JoypadEngine;
pub use recording::{EngineCall, RecordingEngine};
