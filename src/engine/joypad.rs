//! NES standard controller port.
//!
//! The NES controller is a serial shift register accessed via $4016/$4017.
//! Writing bit 0 = 1 to $4016 enables strobe (continuously reloads).
//! Writing bit 0 = 0 latches the current button state.
//! Each read returns one bit and shifts the register right.

use parking_lot::Mutex;

use super::Engine;
use crate::input::touchpad::{ButtonSet, LogicalButton};

/// Controller port state.
#[derive(Debug, Default)]
pub struct Joypad {
    /// Current button state (bit per button, see [`LogicalButton::nes_bit`]).
    buttons: u8,
    /// Latched shift register.
    shift_register: u8,
    /// Strobe mode: when true, shift register continuously reloads.
    strobe: bool,
}

impl Joypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: LogicalButton, pressed: bool) {
        let bit = 1 << button.nes_bit();
        if pressed {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
        if self.strobe {
            self.shift_register = self.buttons;
        }
    }

    /// Read $4016: return bit 0 of shift register, shift right.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            // Strobe held high: always reports A
            return self.buttons & 1;
        }
        let result = self.shift_register & 1;
        self.shift_register >>= 1;
        // Official controllers return 1 once all 8 bits are out
        self.shift_register |= 0x80;
        result
    }

    /// Write $4016: bit 0 controls strobe.
    pub fn write(&mut self, value: u8) {
        let new_strobe = value & 1 != 0;
        if self.strobe && !new_strobe {
            self.shift_register = self.buttons;
        }
        self.strobe = new_strobe;
    }

    /// Raw button byte in serial order.
    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Held buttons as a set.
    pub fn held(&self) -> ButtonSet {
        LogicalButton::ALL
            .into_iter()
            .filter(|b| self.buttons & (1 << b.nes_bit()) != 0)
            .collect()
    }
}

/// Player-one controller port fed directly by the touch pad.
#[derive(Debug, Default)]
pub struct JoypadEngine {
    port: Mutex<Joypad>,
}

impl JoypadEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU write to $4016.
    pub fn write(&self, value: u8) {
        self.port.lock().write(value);
    }

    /// CPU read from $4016.
    pub fn read(&self) -> u8 {
        self.port.lock().read()
    }

    /// Latch and shift out all eight buttons, as a game's input routine does.
    pub fn poll(&self) -> u8 {
        let mut port = self.port.lock();
        port.write(1);
        port.write(0);
        (0..8).fold(0u8, |acc, i| acc | (port.read() << i))
    }

    pub fn buttons(&self) -> u8 {
        self.port.lock().buttons()
    }

    pub fn held(&self) -> ButtonSet {
        self.port.lock().held()
    }
}

impl Engine for JoypadEngine {
    fn name(&self) -> &str {
        "joypad"
    }

    fn press_button(&self, button: LogicalButton) {
        self.port.lock().set_button(button, true);
    }

    fn release_button(&self, button: LogicalButton) {
        self.port.lock().set_button(button, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strobe_latch_and_read() {
        let mut pad = Joypad::new();
        pad.set_button(LogicalButton::A, true);
        pad.set_button(LogicalButton::Start, true);

        pad.write(1);
        pad.write(0);

        assert_eq!(pad.read(), 1); // A
        assert_eq!(pad.read(), 0); // B
        assert_eq!(pad.read(), 0); // Select
        assert_eq!(pad.read(), 1); // Start
        assert_eq!(pad.read(), 0); // Up
        assert_eq!(pad.read(), 0); // Down
        assert_eq!(pad.read(), 0); // Left
        assert_eq!(pad.read(), 0); // Right
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn strobe_mode_returns_a_button() {
        let mut pad = Joypad::new();
        pad.set_button(LogicalButton::A, true);
        pad.write(1);

        assert_eq!(pad.read(), 1);
        assert_eq!(pad.read(), 1);

        pad.set_button(LogicalButton::A, false);
        assert_eq!(pad.read(), 0);
    }

    #[test]
    fn engine_calls_reach_the_port() {
        let engine = JoypadEngine::new();
        engine.press_button(LogicalButton::Right);
        engine.press_button(LogicalButton::B);

        assert_eq!(engine.buttons(), 0b1000_0010);
        assert_eq!(engine.poll(), 0b1000_0010);
        assert_eq!(
            engine.held().to_vec(),
            vec![LogicalButton::Right, LogicalButton::B]
        );

        engine.release_button(LogicalButton::Right);
        assert_eq!(engine.poll(), 0b0000_0010);
    }
}
