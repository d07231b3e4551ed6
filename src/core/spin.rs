//! Constant-rate rotation shared by every animated body.

use bevy::prelude::*;
use std::f32::consts::TAU;

/// Rotation about a fixed local axis at a signed rate.
///
/// The sign of `rotations_per_second` is the direction of rotation; nothing
/// downstream flips it.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub axis: Vec3,
    pub rotations_per_second: f32,
    pub enabled: bool,
    /// Current angle in radians, kept in `[0, TAU)`.
    pub angle: f32,
}

impl Spin {
    pub fn about_y(rotations_per_second: f32) -> Self {
        Self {
            axis: Vec3::Y,
            rotations_per_second,
            enabled: true,
            angle: 0.0,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Advance by `delta_secs`. Negative deltas are treated as zero.
    ///
    /// The angle wraps each step; an unbounded f32 would eventually swallow
    /// per-frame increments whole.
    pub fn animate(&mut self, delta_secs: f32) {
        if !self.enabled {
            return;
        }
        let step = delta_secs.max(0.0) * TAU * self.rotations_per_second;
        self.angle = (self.angle.rem_euclid(TAU) + step).rem_euclid(TAU);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(self.axis.normalize_or(Vec3::Y), self.angle)
    }
}

/// Advance every `T` body by this frame's delta and write its rotation.
pub fn animate_bodies<T: Component>(
    time: Res<Time>,
    mut bodies: Query<(&mut Spin, &mut Transform), With<T>>,
) {
    let delta = time.delta_secs();
    for (mut spin, mut transform) in &mut bodies {
        spin.animate(delta);
        transform.rotation = spin.rotation();
    }
}
