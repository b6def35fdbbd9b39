//! NES Touchpad - on-screen NES controller input mapping
//!
//! Maps touch and mouse pointers over a virtual gamepad onto press/release
//! calls of an emulation engine, without ever leaving a button stuck.

pub mod cli;
pub mod config;
pub mod engine;
pub mod input;
pub mod script;

pub use config::{AppConfig, ControllerConfig};
pub use engine::Engine;
pub use input::touchpad::{ButtonSet, LogicalButton, TouchController, Transition};
