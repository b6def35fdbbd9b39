//! On-screen NES controller
//!
//! Turns touch and mouse pointers over a virtual pad into press/release
//! calls on an emulation engine. The pipeline for every UI event is:
//!
//! ```text
//! raw event -> normalize -> tracker (hit tests via geometry) -> bridge -> engine
//! ```
//!
//! A [`TouchController`] is built once per emulator view and owns every
//! stage; there is no global state.

pub mod bridge;
pub mod buttons;
pub mod geometry;
pub mod normalize;
pub mod tracker;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::config::ControllerConfig;
use crate::engine::Engine;

pub use bridge::InputBridge;
pub use buttons::{ButtonSet, LogicalButton, ParseButtonError};
pub use geometry::{LayoutError, Rect, RegionHandle, RegionHandles, RegionResolver, RegionSource};
pub use normalize::{
    normalize_mouse, normalize_touch, MouseEvent, MouseKind, PointerId, PointerSample, TouchEvent,
    TouchPhase, TouchPoint,
};
pub use tracker::{ButtonTracker, Transition};

/// Input controller for one emulator view
pub struct TouchController {
    resolver: RegionResolver,
    tracker: ButtonTracker,
    bridge: InputBridge,
    /// Minimum spacing between accepted moves of the same contacts
    debounce: Duration,
    last_accepted: Option<Instant>,
    /// Contacts seen by the last accepted pass
    last_pointers: Vec<PointerId>,
}

impl TouchController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            resolver: RegionResolver::new(),
            tracker: ButtonTracker::new(),
            bridge: InputBridge::new(),
            debounce: Duration::from_millis(config.debounce_ms),
            last_accepted: None,
            last_pointers: Vec::new(),
        }
    }

    pub fn register_region(&mut self, button: LogicalButton, element: Arc<dyn RegionSource>) {
        self.resolver.register_region(button, element);
    }

    pub fn unregister_region(&mut self, button: LogicalButton) {
        self.resolver.unregister_region(button);
    }

    /// Register one live handle per button (layout-file driven geometry)
    pub fn register_handles(&mut self, handles: &RegionHandles) {
        handles.register_all(&mut self.resolver);
    }

    pub fn set_debounce(&mut self, config: &ControllerConfig) {
        self.debounce = Duration::from_millis(config.debounce_ms);
    }

    /// Hand over the engine once it has finished loading
    pub fn attach_engine(&mut self, engine: Arc<dyn Engine>) {
        self.bridge.attach_engine(engine);
    }

    pub fn detach_engine(&mut self) -> Option<Arc<dyn Engine>> {
        self.bridge.detach_engine()
    }

    pub fn engine_ready(&self) -> bool {
        self.bridge.is_ready()
    }

    /// Currently pressed buttons, for visual feedback
    pub fn active_buttons(&self) -> ButtonSet {
        self.tracker.active()
    }

    pub fn handle_touch(&mut self, event: &TouchEvent) -> Transition {
        self.handle_touch_at(event, Instant::now())
    }

    /// Process a touch event observed at `now`
    ///
    /// Cancel always releases everything. End recomputes from the touches
    /// that remain, or releases everything when none do. Only moves of an
    /// unchanged set of contacts are debounced.
    pub fn handle_touch_at(&mut self, event: &TouchEvent, now: Instant) -> Transition {
        match event.phase {
            TouchPhase::Cancel => self.clear(),
            TouchPhase::End if event.touches.is_empty() => self.clear(),
            TouchPhase::End | TouchPhase::Start => self.update(&normalize_touch(event), now),
            TouchPhase::Move => {
                let samples = normalize_touch(event);
                if self.debounced(&samples, now) {
                    return Transition::steady(self.tracker.active());
                }
                self.update(&samples, now)
            }
        }
    }

    pub fn handle_mouse(&mut self, event: &MouseEvent) -> Transition {
        self.handle_mouse_at(event, Instant::now())
    }

    /// Process a mouse event observed at `now`
    ///
    /// Up and leave always release everything. A move is debounced only
    /// while the primary button state is unchanged.
    pub fn handle_mouse_at(&mut self, event: &MouseEvent, now: Instant) -> Transition {
        let samples = match event.kind {
            MouseKind::Up | MouseKind::Leave => return self.clear(),
            MouseKind::Down | MouseKind::Move => normalize_mouse(event, event.primary_down()),
        };
        if event.kind == MouseKind::Move && self.debounced(&samples, now) {
            return Transition::steady(self.tracker.active());
        }
        self.update(&samples, now)
    }

    /// Release every active button
    pub fn clear(&mut self) -> Transition {
        let transition = self.tracker.clear();
        self.last_accepted = None;
        self.last_pointers.clear();
        if !transition.is_empty() {
            debug!("Released {}", transition.released);
        }
        self.bridge.apply(&transition);
        transition
    }

    fn update(&mut self, samples: &[PointerSample], now: Instant) -> Transition {
        self.last_accepted = Some(now);
        self.last_pointers = samples.iter().map(|s| s.pointer_id).collect();

        let transition = self.tracker.update(&self.resolver, samples);
        if !transition.is_empty() {
            debug!(
                "Pad: +[{}] -[{}] => {}",
                transition.pressed, transition.released, transition.set
            );
        }
        self.bridge.apply(&transition);
        transition
    }

    /// True when `samples` only move the contacts of the last accepted
    /// pass, inside the debounce window
    fn debounced(&self, samples: &[PointerSample], now: Instant) -> bool {
        let Some(last) = self.last_accepted else {
            return false;
        };
        if now.saturating_duration_since(last) >= self.debounce {
            return false;
        }
        let same_contacts = samples.len() == self.last_pointers.len()
            && samples.iter().all(|s| self.last_pointers.contains(&s.pointer_id));
        if same_contacts {
            trace!("Debounced pointer move");
        }
        same_contacts
    }
}

impl Default for TouchController {
    fn default() -> Self {
        Self::new(&ControllerConfig::default())
    }
}
