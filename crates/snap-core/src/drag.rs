//! Pointer drag constrained to a view-parallel plane.
//!
//! On press the entity's depth along the view axis is frozen together with the
//! offset between the entity and the point under the pointer. While held, the
//! entity follows the pointer on that plane; rotation is never touched.

use bevy::math::{Dir3, Ray3d, Vec3};

/// Camera origin and viewing direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrame {
    pub origin: Vec3,
    pub forward: Dir3,
}

impl ViewFrame {
    pub fn new(origin: Vec3, forward: Dir3) -> Self {
        Self { origin, forward }
    }

    /// Distance of `point` along the view axis.
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(*self.forward)
    }

    /// Intersects `ray` with the view-parallel plane at `depth`.
    ///
    /// Returns `None` when the ray runs parallel to (or away from) that plane.
    pub fn point_at_depth(&self, ray: Ray3d, depth: f32) -> Option<Vec3> {
        let along = ray.direction.dot(*self.forward);
        if along.abs() <= f32::EPSILON {
            return None;
        }
        let distance = (depth - self.depth_of(ray.origin)) / along;
        if distance < 0.0 {
            return None;
        }
        Some(ray.get_point(distance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Grab {
    offset: Vec3,
    depth: f32,
}

/// Drag state of one entity.
#[derive(Debug, Clone, Default)]
pub struct DragPositioner {
    grab: Option<Grab>,
}

impl DragPositioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Offset between entity and pointer point captured on press.
    pub fn offset(&self) -> Option<Vec3> {
        self.grab.map(|grab| grab.offset)
    }

    /// Starts a drag if the pointer ray hit this entity first.
    ///
    /// Returns `true` when a drag started.
    pub fn press(&mut self, ray: Ray3d, view: ViewFrame, hit_self_first: bool, position: Vec3) -> bool {
        if !hit_self_first {
            return false;
        }
        let depth = view.depth_of(position);
        let Some(point) = view.point_at_depth(ray, depth) else {
            return false;
        };
        self.grab = Some(Grab {
            offset: position - point,
            depth,
        });
        true
    }

    /// New position for the current pointer ray, if dragging.
    pub fn drag(&self, ray: Ray3d, view: ViewFrame) -> Option<Vec3> {
        let grab = self.grab?;
        view.point_at_depth(ray, grab.depth)
            .map(|point| point + grab.offset)
    }

    /// Ends the drag. Returns `true` if one was active.
    pub fn release(&mut self) -> bool {
        self.grab.take().is_some()
    }
}
