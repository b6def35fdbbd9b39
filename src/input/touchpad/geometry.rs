//! Button geometry resolver
//!
//! Maps each [`LogicalButton`] to the live hit box of the element that
//! renders it. Geometry is never cached: every hit test asks the element
//! for its current bounding box, because viewport resizes and responsive
//! layout move the controls between events.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

use super::buttons::LogicalButton;

/// Axis-aligned rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Point containment, inclusive on all four edges
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// True when the two rectangles share any point (edges included)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Check that the rectangle can back a button region
    pub fn validate(&self, button: LogicalButton) -> Result<(), LayoutError> {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(LayoutError::NonFinite { button });
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(LayoutError::NegativeSize {
                button,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1}) {:.1}x{:.1}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Invalid region geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("region for {button} has non-finite coordinates")]
    NonFinite { button: LogicalButton },

    #[error("region for {button} has negative size ({width}x{height})")]
    NegativeSize {
        button: LogicalButton,
        width: f64,
        height: f64,
    },
}

/// Anything that can report the current bounding box of a rendered control
///
/// Returns `None` while the backing element is unavailable (not yet mounted,
/// or unmounted). Implementations must report live layout; the resolver
/// calls this on every hit test.
pub trait RegionSource: Send + Sync {
    fn bounding_box(&self) -> Option<Rect>;
}

/// A fixed rectangle that never moves
impl RegionSource for Rect {
    fn bounding_box(&self) -> Option<Rect> {
        Some(*self)
    }
}

/// Shared, mutable element geometry
///
/// The UI side keeps one clone and calls [`RegionHandle::set`] on mount and
/// resize, [`RegionHandle::unmount`] when the element goes away. The resolver
/// holds another clone and reads it live.
#[derive(Debug, Clone, Default)]
pub struct RegionHandle {
    rect: Arc<RwLock<Option<Rect>>>,
}

impl RegionHandle {
    /// Handle for an element that is not mounted yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted(rect: Rect) -> Self {
        Self {
            rect: Arc::new(RwLock::new(Some(rect))),
        }
    }

    pub fn set(&self, rect: Rect) {
        *self.rect.write() = Some(rect);
    }

    pub fn unmount(&self) {
        *self.rect.write() = None;
    }

    pub fn get(&self) -> Option<Rect> {
        *self.rect.read()
    }
}

impl RegionSource for RegionHandle {
    fn bounding_box(&self) -> Option<Rect> {
        self.get()
    }
}

/// Per-button registry of region sources
#[derive(Default)]
pub struct RegionResolver {
    regions: [Option<Arc<dyn RegionSource>>; 8],
}

impl RegionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the element backing `button`, replacing any previous one
    pub fn register_region(&mut self, button: LogicalButton, element: Arc<dyn RegionSource>) {
        debug!("Registering region for {}", button);
        self.regions[button.index()] = Some(element);
    }

    /// Forget the element backing `button`; later hit tests on it miss
    pub fn unregister_region(&mut self, button: LogicalButton) {
        if self.regions[button.index()].take().is_some() {
            debug!("Unregistered region for {}", button);
        }
    }

    pub fn is_registered(&self, button: LogicalButton) -> bool {
        self.regions[button.index()].is_some()
    }

    /// Current bounding box of `button`, read from the live element
    pub fn bounding_box(&self, button: LogicalButton) -> Option<Rect> {
        self.regions[button.index()]
            .as_ref()
            .and_then(|source| source.bounding_box())
    }

    /// Does `(x, y)` fall inside the current region of `button`?
    ///
    /// Unregistered or unmounted buttons never hit.
    pub fn hit_test(&self, button: LogicalButton, x: f64, y: f64) -> bool {
        match self.bounding_box(button) {
            Some(rect) => rect.contains(x, y),
            None => {
                trace!("No live region for {}, treating as miss", button);
                false
            }
        }
    }

    /// First button, in precedence order, whose region contains `(x, y)`
    pub fn hit_test_all(&self, x: f64, y: f64) -> Option<LogicalButton> {
        LogicalButton::ALL
            .into_iter()
            .find(|button| self.hit_test(*button, x, y))
    }
}

/// One [`RegionHandle`] per button, driven from a layout map
///
/// Used when geometry comes from a layout file instead of a live UI: a layout
/// reload moves, resizes or unmounts the handles in place, and the resolver
/// sees the change on its next hit test.
#[derive(Debug, Clone, Default)]
pub struct RegionHandles {
    handles: [RegionHandle; 8],
}

impl RegionHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self, button: LogicalButton) -> &RegionHandle {
        &self.handles[button.index()]
    }

    /// Register every handle with the resolver
    pub fn register_all(&self, resolver: &mut RegionResolver) {
        for button in LogicalButton::ALL {
            resolver.register_region(button, Arc::new(self.handle(button).clone()));
        }
    }

    /// Mount buttons present in `layout`, unmount the rest
    pub fn apply_layout(&self, layout: &BTreeMap<LogicalButton, Rect>) {
        for button in LogicalButton::ALL {
            match layout.get(&button) {
                Some(rect) => self.handle(button).set(*rect),
                None => self.handle(button).unmount(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_is_edge_inclusive() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(40.0, 60.0));
        assert!(r.contains(25.0, 30.0));
        assert!(!r.contains(9.99, 30.0));
        assert!(!r.contains(25.0, 60.01));
    }

    #[test]
    fn test_rect_validate() {
        assert!(Rect::new(0.0, 0.0, 10.0, 10.0).validate(LogicalButton::A).is_ok());
        assert_eq!(
            Rect::new(f64::NAN, 0.0, 1.0, 1.0).validate(LogicalButton::B),
            Err(LayoutError::NonFinite { button: LogicalButton::B })
        );
        assert!(matches!(
            Rect::new(0.0, 0.0, -1.0, 1.0).validate(LogicalButton::Up),
            Err(LayoutError::NegativeSize { .. })
        ));
    }

    #[test]
    fn test_unregistered_button_never_hits() {
        let resolver = RegionResolver::new();
        assert!(!resolver.hit_test(LogicalButton::A, 0.0, 0.0));
        assert_eq!(resolver.hit_test_all(0.0, 0.0), None);
    }

    #[test]
    fn test_hit_test_reads_live_geometry() {
        let mut resolver = RegionResolver::new();
        let handle = RegionHandle::mounted(Rect::new(0.0, 0.0, 10.0, 10.0));
        resolver.register_region(LogicalButton::A, Arc::new(handle.clone()));

        assert!(resolver.hit_test(LogicalButton::A, 5.0, 5.0));

        // Element moves after a resize: old position must no longer hit
        handle.set(Rect::new(100.0, 100.0, 10.0, 10.0));
        assert!(!resolver.hit_test(LogicalButton::A, 5.0, 5.0));
        assert!(resolver.hit_test(LogicalButton::A, 105.0, 105.0));

        // Element unmounts: registered but unavailable
        handle.unmount();
        assert!(resolver.is_registered(LogicalButton::A));
        assert!(!resolver.hit_test(LogicalButton::A, 105.0, 105.0));
    }

    #[test]
    fn test_overlap_resolved_by_precedence() {
        let mut resolver = RegionResolver::new();
        resolver.register_region(LogicalButton::Start, Arc::new(Rect::new(0.0, 0.0, 20.0, 20.0)));
        resolver.register_region(LogicalButton::A, Arc::new(Rect::new(10.0, 10.0, 20.0, 20.0)));
        resolver.register_region(LogicalButton::Right, Arc::new(Rect::new(15.0, 15.0, 20.0, 20.0)));

        // All three overlap at (16, 16): D-pad wins
        assert_eq!(resolver.hit_test_all(16.0, 16.0), Some(LogicalButton::Right));
        // A beats Start
        assert_eq!(resolver.hit_test_all(12.0, 12.0), Some(LogicalButton::A));
        assert_eq!(resolver.hit_test_all(2.0, 2.0), Some(LogicalButton::Start));
    }

    #[test]
    fn test_unregister_region() {
        let mut resolver = RegionResolver::new();
        resolver.register_region(LogicalButton::B, Arc::new(Rect::new(0.0, 0.0, 5.0, 5.0)));
        resolver.unregister_region(LogicalButton::B);
        assert!(!resolver.is_registered(LogicalButton::B));
        assert!(!resolver.hit_test(LogicalButton::B, 1.0, 1.0));
    }

    #[test]
    fn test_region_handles_apply_layout() {
        let handles = RegionHandles::new();
        let mut resolver = RegionResolver::new();
        handles.register_all(&mut resolver);

        let mut layout = BTreeMap::new();
        layout.insert(LogicalButton::Up, Rect::new(0.0, 0.0, 10.0, 10.0));
        handles.apply_layout(&layout);
        assert_eq!(resolver.hit_test_all(5.0, 5.0), Some(LogicalButton::Up));

        layout.clear();
        layout.insert(LogicalButton::Down, Rect::new(0.0, 0.0, 10.0, 10.0));
        handles.apply_layout(&layout);
        assert_eq!(resolver.hit_test_all(5.0, 5.0), Some(LogicalButton::Down));
        assert_eq!(resolver.bounding_box(LogicalButton::Up), None);
    }
}
