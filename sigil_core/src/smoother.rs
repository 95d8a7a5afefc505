//! Exponential smoothing of the magic-circle animation parameters.
//!
//! Each frame a parameter moves a fixed fraction of the remaining distance
//! toward its target.  For `0 < factor < 1` the gap shrinks geometrically and
//! the value never overshoots.  The rotation angle is the odd one out: it
//! integrates the smoothed rotation velocity instead of chasing a target.

use std::f32::consts::TAU;

use crate::config::SmoothingConfig;

/// One smoothing step from `current` toward `target`.
pub fn smooth(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

// ════════════════════════════════════════════════════════════════════════════
// Smoothed
// ════════════════════════════════════════════════════════════════════════════

/// A scalar that eases toward a moving target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothed {
    pub value:  f32,
    pub target: f32,
    factor:     f32,
}

impl Smoothed {
    pub fn new(factor: f32) -> Self {
        Smoothed { value: 0.0, target: 0.0, factor }
    }

    /// Set a new target and take one step toward it.  Returns the new value.
    pub fn approach(&mut self, target: f32) -> f32 {
        self.target = target;
        self.value = smooth(self.value, target, self.factor);
        self.value
    }

    /// Drop the current value to zero; the target is left for the next
    /// frame to overwrite.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AnimationParams
// ════════════════════════════════════════════════════════════════════════════

/// Size, opacity and rotation of one magic circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationParams {
    pub size:              Smoothed,
    pub alpha:             Smoothed,
    pub rotation_velocity: Smoothed,
    /// Radians, kept in `[0, TAU)`.
    pub rotation_angle:    f32,
}

impl AnimationParams {
    pub fn new(cfg: &SmoothingConfig) -> Self {
        AnimationParams {
            size:              Smoothed::new(cfg.size_factor),
            alpha:             Smoothed::new(cfg.alpha_factor),
            rotation_velocity: Smoothed::new(cfg.velocity_factor),
            rotation_angle:    0.0,
        }
    }

    /// Feed one frame of hand measurements: retarget and smooth every
    /// parameter, then advance the rotation.
    ///
    /// Targets go through the clamped maps first, so size and alpha can only
    /// approach values inside their output ranges.
    pub fn track(&mut self, openness: f32, hand_size: f32, cfg: &SmoothingConfig) {
        self.size.approach(cfg.size_map.apply(openness));
        self.alpha.approach(cfg.alpha_map.apply(openness));
        self.spin(hand_size, cfg);
    }

    /// Retarget only the rotation (used when the openness reading is
    /// unreliable) and advance the angle.
    pub fn spin(&mut self, hand_size: f32, cfg: &SmoothingConfig) {
        self.rotation_velocity.approach(cfg.velocity_map.apply(hand_size));
        self.rotation_angle = (self.rotation_angle + self.rotation_velocity.value).rem_euclid(TAU);
    }

    /// Hard reset of the visible state: the circle regrows from nothing.
    pub fn collapse(&mut self) {
        self.size.reset();
        self.alpha.reset();
    }

    pub fn size(&self) -> f32 { self.size.value }
    pub fn alpha(&self) -> f32 { self.alpha.value }
    pub fn velocity(&self) -> f32 { self.rotation_velocity.value }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
