//! Logical buttons of the on-screen NES pad
//!
//! The pad exposes a fixed, closed set of eight buttons. Their declaration
//! order doubles as hit-test precedence when two regions overlap:
//!
//! ```text
//!   D-pad:    Up, Down, Left, Right
//!   Action:   A, B
//!   System:   Start, Select
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the eight NES-style control inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalButton {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

impl LogicalButton {
    /// All buttons in hit-test precedence order
    pub const ALL: [LogicalButton; 8] = [
        LogicalButton::Up,
        LogicalButton::Down,
        LogicalButton::Left,
        LogicalButton::Right,
        LogicalButton::A,
        LogicalButton::B,
        LogicalButton::Start,
        LogicalButton::Select,
    ];

    /// Position in [`LogicalButton::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in layout files and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            LogicalButton::Up => "up",
            LogicalButton::Down => "down",
            LogicalButton::Left => "left",
            LogicalButton::Right => "right",
            LogicalButton::A => "a",
            LogicalButton::B => "b",
            LogicalButton::Start => "start",
            LogicalButton::Select => "select",
        }
    }

    /// Joypad code understood by the emulator core (player one)
    ///
    /// Start and Select are shared across ports, so they carry no player prefix.
    pub const fn engine_code(self) -> &'static str {
        match self {
            LogicalButton::Up => "Joypad1Up",
            LogicalButton::Down => "Joypad1Down",
            LogicalButton::Left => "Joypad1Left",
            LogicalButton::Right => "Joypad1Right",
            LogicalButton::A => "Joypad1A",
            LogicalButton::B => "Joypad1B",
            LogicalButton::Start => "Start",
            LogicalButton::Select => "Select",
        }
    }

    /// Bit position in the NES standard controller shift register
    ///
    /// The hardware reports A, B, Select, Start, Up, Down, Left, Right.
    pub const fn nes_bit(self) -> u8 {
        match self {
            LogicalButton::A => 0,
            LogicalButton::B => 1,
            LogicalButton::Select => 2,
            LogicalButton::Start => 3,
            LogicalButton::Up => 4,
            LogicalButton::Down => 5,
            LogicalButton::Left => 6,
            LogicalButton::Right => 7,
        }
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogicalButton::Up => "Up",
            LogicalButton::Down => "Down",
            LogicalButton::Left => "Left",
            LogicalButton::Right => "Right",
            LogicalButton::A => "A",
            LogicalButton::B => "B",
            LogicalButton::Start => "Start",
            LogicalButton::Select => "Select",
        };
        f.write_str(label)
    }
}

/// Returned when a string does not name one of the eight pad buttons
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pad button '{0}' (expected up, down, left, right, a, b, start or select)")]
pub struct ParseButtonError(pub String);

impl FromStr for LogicalButton {
    type Err = ParseButtonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LogicalButton::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseButtonError(wanted.to_string()))
    }
}

/// Set of logical buttons
///
/// Backed by one bit per button, so membership is exclusive (never a
/// multiset) and iteration always follows precedence order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Insert a button, returning `true` if it was not already present
    pub fn insert(&mut self, button: LogicalButton) -> bool {
        let bit = 1 << button.index();
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    /// Remove a button, returning `true` if it was present
    pub fn remove(&mut self, button: LogicalButton) -> bool {
        let bit = 1 << button.index();
        let present = self.0 & bit != 0;
        self.0 &= !bit;
        present
    }

    pub const fn contains(&self, button: LogicalButton) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Buttons in `self` that are not in `other`
    pub const fn difference(&self, other: &ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & !other.0)
    }

    pub const fn union(&self, other: &ButtonSet) -> ButtonSet {
        ButtonSet(self.0 | other.0)
    }

    pub const fn intersection(&self, other: &ButtonSet) -> ButtonSet {
        ButtonSet(self.0 & other.0)
    }

    /// Iterate members in precedence order
    pub fn iter(&self) -> impl Iterator<Item = LogicalButton> + '_ {
        LogicalButton::ALL.into_iter().filter(|b| self.contains(*b))
    }

    /// Collect members into a vector (precedence order)
    pub fn to_vec(&self) -> Vec<LogicalButton> {
        self.iter().collect()
    }
}

impl FromIterator<LogicalButton> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = LogicalButton>>(iter: I) -> Self {
        let mut set = ButtonSet::new();
        for button in iter {
            set.insert(button);
        }
        set
    }
}

impl fmt::Debug for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(none)");
        }
        let names: Vec<String> = self.iter().map(|b| b.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}
