//! Seam to the renderer.
//!
//! Rendering and spline tessellation live outside this crate. Reconcilers
//! only need to mint a visual handle when a control point or marker appears
//! and release it when that entry goes away, so the renderer is modelled as
//! a handle allocator.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::Point3;

/// Opaque identifier of a visual element owned by the renderer.
pub type HandleId = Uuid;

/// Visual handle allocator implemented by the renderer.
pub trait Scene {
    /// Create an editable handle for one trajectory control point.
    fn spawn_point(&mut self, point: Point3) -> HandleId;

    /// Create a marker for one animated object.
    fn spawn_marker(&mut self, color: &str) -> HandleId;

    /// Release a handle. Unknown handles are ignored.
    fn despawn(&mut self, handle: HandleId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleKind {
    Point,
    Marker,
}

/// Scene without a renderer. Tracks which handles are live.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    live: HashMap<HandleId, HandleKind>,
}

impl HeadlessScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total handles minted and not yet released.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// Live control-point handles.
    #[must_use]
    pub fn live_points(&self) -> usize {
        self.count(HandleKind::Point)
    }

    /// Live object markers.
    #[must_use]
    pub fn live_markers(&self) -> usize {
        self.count(HandleKind::Marker)
    }

    #[must_use]
    pub fn is_live(&self, handle: HandleId) -> bool {
        self.live.contains_key(&handle)
    }

    fn count(&self, kind: HandleKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    fn mint(&mut self, kind: HandleKind) -> HandleId {
        let handle = Uuid::new_v4();
        self.live.insert(handle, kind);
        handle
    }
}

impl Scene for HeadlessScene {
    fn spawn_point(&mut self, _point: Point3) -> HandleId {
        self.mint(HandleKind::Point)
    }

    fn spawn_marker(&mut self, _color: &str) -> HandleId {
        self.mint(HandleKind::Marker)
    }

    fn despawn(&mut self, handle: HandleId) {
        self.live.remove(&handle);
    }
}
