//! Pointer event normalization
//!
//! Touch events carry a list of active contacts; mouse events carry one
//! position plus a button mask. Both are reduced to a flat list of
//! [`PointerSample`]s describing the contacts that are currently down, so the
//! tracker never has to branch on input modality.
//!
//! Nothing in here looks at button regions.

use serde::{Deserialize, Serialize};

/// Mask bit of the primary (left) mouse button in `MouseEvent::buttons`
pub const PRIMARY_BUTTON: u16 = 1;

/// Identity of one contact point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    /// Touch identifier assigned by the platform
    Touch(u64),
    /// The single mouse pointer
    Mouse,
}

/// Synthetic id shared by every mouse sample
pub const MOUSE_POINTER_ID: PointerId = PointerId::Mouse;

/// A single contact point's coordinates at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: PointerId,
    pub x: f64,
    pub y: f64,
}

impl PointerSample {
    pub const fn new(pointer_id: PointerId, x: f64, y: f64) -> Self {
        Self { pointer_id, x, y }
    }
}

/// Touch lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One entry of a touch event's active-touch list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// A touch event as delivered by the platform
///
/// `touches` lists every contact still on the surface after the event, so
/// an `End` for the last finger carries an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }
}

/// Mouse event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseKind {
    Down,
    Move,
    Up,
    Leave,
}

/// A mouse event as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub x: f64,
    pub y: f64,
    /// Currently held mouse buttons (bit 0 = primary)
    pub buttons: u16,
}

impl MouseEvent {
    pub fn new(kind: MouseKind, x: f64, y: f64, buttons: u16) -> Self {
        Self { kind, x, y, buttons }
    }

    /// Is the primary button held while this event fired?
    pub fn primary_down(&self) -> bool {
        self.buttons & PRIMARY_BUTTON != 0
    }
}

/// Samples for every contact still down after a touch event
pub fn normalize_touch(event: &TouchEvent) -> Vec<PointerSample> {
    event
        .touches
        .iter()
        .map(|t| PointerSample::new(PointerId::Touch(t.id), t.x, t.y))
        .collect()
}

/// Zero or one sample for the mouse pointer
pub fn normalize_mouse(event: &MouseEvent, is_down: bool) -> Vec<PointerSample> {
    if !is_down {
        return Vec::new();
    }
    vec![PointerSample::new(MOUSE_POINTER_ID, event.x, event.y)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(id: u64, x: f64, y: f64) -> TouchPoint {
        TouchPoint { id, x, y }
    }

    #[test]
    fn test_touch_maps_every_active_contact() {
        let event = TouchEvent::new(TouchPhase::Move, vec![tp(3, 1.0, 2.0), tp(7, 3.0, 4.0)]);
        let samples = normalize_touch(&event);
        assert_eq!(
            samples,
            vec![
                PointerSample::new(PointerId::Touch(3), 1.0, 2.0),
                PointerSample::new(PointerId::Touch(7), 3.0, 4.0),
            ]
        );
    }

    #[test]
    fn test_touch_end_keeps_remaining_contacts() {
        let event = TouchEvent::new(TouchPhase::End, vec![tp(7, 3.0, 4.0)]);
        let samples = normalize_touch(&event);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].pointer_id, PointerId::Touch(7));
    }

    #[test]
    fn test_touch_end_last_finger_is_empty() {
        let event = TouchEvent::new(TouchPhase::End, vec![]);
        assert!(normalize_touch(&event).is_empty());
    }

    #[test]
    fn test_mouse_up_is_empty() {
        let event = MouseEvent::new(MouseKind::Up, 5.0, 5.0, 0);
        assert!(normalize_mouse(&event, false).is_empty());
    }

    #[test]
    fn test_mouse_down_uses_synthetic_id() {
        let event = MouseEvent::new(MouseKind::Down, 5.0, 6.0, PRIMARY_BUTTON);
        assert!(event.primary_down());
        let samples = normalize_mouse(&event, event.primary_down());
        assert_eq!(samples, vec![PointerSample::new(MOUSE_POINTER_ID, 5.0, 6.0)]);
    }

    #[test]
    fn test_secondary_button_is_not_down() {
        // Right button only (bit 1)
        let event = MouseEvent::new(MouseKind::Move, 5.0, 6.0, 2);
        assert!(!event.primary_down());
    }
}
