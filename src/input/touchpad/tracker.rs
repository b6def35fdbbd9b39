//! Active-button set tracker
//!
//! Owns the set of pressed buttons and recomputes it from the pointer samples
//! of each event pass. A button is active iff at least one current sample
//! lies inside its region.

use tracing::trace;

use super::buttons::ButtonSet;
use super::geometry::RegionResolver;
use super::normalize::PointerSample;

/// Result of one tracker pass
///
/// `pressed` and `released` are disjoint by construction: one is
/// `new - old`, the other `old - new`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// Active buttons after the pass
    pub set: ButtonSet,
    /// Buttons that entered the set
    pub pressed: ButtonSet,
    /// Buttons that left the set
    pub released: ButtonSet,
}

impl Transition {
    /// A pass that changed nothing
    pub const fn steady(set: ButtonSet) -> Self {
        Self {
            set,
            pressed: ButtonSet::new(),
            released: ButtonSet::new(),
        }
    }

    /// True when no button changed state
    pub const fn is_empty(&self) -> bool {
        self.pressed.is_empty() && self.released.is_empty()
    }

    fn between(old: ButtonSet, new: ButtonSet) -> Self {
        Self {
            set: new,
            pressed: new.difference(&old),
            released: old.difference(&new),
        }
    }
}

/// Sole owner and mutator of the active-button set
#[derive(Debug, Default)]
pub struct ButtonTracker {
    active: ButtonSet,
}

impl ButtonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the currently pressed buttons
    pub fn active(&self) -> ButtonSet {
        self.active
    }

    /// Replace the active set with the buttons hit by `samples`
    ///
    /// Samples that hit nothing are ignored; several samples on the same
    /// button count once. A pointer dragged from one button to another
    /// between passes yields a release of the first and a press of the
    /// second in the same transition.
    pub fn update(&mut self, resolver: &RegionResolver, samples: &[PointerSample]) -> Transition {
        let new_set: ButtonSet = samples
            .iter()
            .filter_map(|s| resolver.hit_test_all(s.x, s.y))
            .collect();

        let transition = Transition::between(self.active, new_set);
        self.active = new_set;

        if !transition.is_empty() {
            trace!(
                pressed = %transition.pressed,
                released = %transition.released,
                "Active set now {}",
                transition.set
            );
        }
        transition
    }

    /// Release everything
    ///
    /// Called on pointer up, cancel and leave; every previously active
    /// button is reported as released.
    pub fn clear(&mut self) -> Transition {
        let transition = Transition::between(self.active, ButtonSet::new());
        self.active = ButtonSet::new();
        transition
    }
}
