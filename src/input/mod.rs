//! Input sources

pub mod touchpad;
