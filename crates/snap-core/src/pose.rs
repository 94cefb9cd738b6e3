//! Poses and right-angle rotation helpers shared by every snap strategy.

use bevy::math::{Dir3, EulerRot, Quat, Vec3};
use bevy::prelude::Transform;

/// Euler order used whenever a rotation is decomposed for rounding (yaw, pitch, roll).
pub const EULER_ORDER: EulerRot = EulerRot::YXZ;

/// Position + orientation of a snapping entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_translation(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Writes position and rotation into a `Transform`, leaving its scale untouched.
    ///
    /// Returns `true` if the transform actually changed.
    pub fn write_to(&self, transform: &mut Transform) -> bool {
        if transform.translation == self.position && transform.rotation == self.rotation {
            return false;
        }
        transform.translation = self.position;
        transform.rotation = self.rotation;
        true
    }
}

impl From<&Transform> for Pose {
    fn from(transform: &Transform) -> Self {
        Self::new(transform.translation, transform.rotation)
    }
}

impl From<Transform> for Pose {
    fn from(transform: Transform) -> Self {
        Self::from(&transform)
    }
}

/// Rounds an angle (degrees) to the nearest multiple of 90° and wraps it into (-180°, 180°].
///
/// Exact halves (45°, 135°, ...) round to the even multiple.
pub fn round_to_right_angle(degrees: f32) -> f32 {
    let rounded = (degrees / 90.0).round_ties_even() * 90.0;
    let wrapped = (rounded + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Euler angles (degrees, `x`=pitch `y`=yaw `z`=roll) of a rotation rounded to right angles.
pub fn right_angle_euler(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EULER_ORDER);
    Vec3::new(
        round_to_right_angle(pitch.to_degrees()),
        round_to_right_angle(yaw.to_degrees()),
        round_to_right_angle(roll.to_degrees()),
    )
}

/// Snaps every Euler axis of `rotation` to the nearest right angle.
pub fn round_rotation_to_right_angles(rotation: Quat) -> Quat {
    let euler = right_angle_euler(rotation);
    Quat::from_euler(
        EULER_ORDER,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Angular difference between two rotations, in degrees.
pub fn angle_between_degrees(a: Quat, b: Quat) -> f32 {
    a.normalize().angle_between(b.normalize()).to_degrees()
}

/// Rotation whose forward axis (-Z) points along `forward`.
///
/// Up reference is +Y, or +Z when `forward` is (anti)parallel to +Y.
pub fn facing_rotation(forward: Vec3) -> Option<Quat> {
    let forward = Dir3::new(forward).ok()?;
    let up = if forward.dot(Vec3::Y).abs() > 0.999 {
        Dir3::Z
    } else {
        Dir3::Y
    };
    Some(Transform::IDENTITY.looking_to(forward, up).rotation)
}

/// Moves `current` toward `target` by fraction `t` (clamped to [0, 1]).
pub fn approach(current: Vec3, target: Vec3, t: f32) -> Vec3 {
    current.lerp(target, t.clamp(0.0, 1.0))
}
