//! Tunable constants for the scene, grouped per component.
//!
//! Every `Default` reproduces the stock look and feel; the binary overrides
//! individual fields from the command line.

use std::time::Duration;

use crate::geometry::LinearMap;

// ════════════════════════════════════════════════════════════════════════════
// ParamScope
// ════════════════════════════════════════════════════════════════════════════

/// Who owns the magic-circle animation parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParamScope {
    /// One set of parameters shared by every hand.  The last hand processed
    /// in a frame decides what every circle looks like, and a break on any
    /// hand resets all of them.
    #[default]
    Shared,
    /// Each hand index owns its own parameters and motion trail.
    PerHand,
}

// ════════════════════════════════════════════════════════════════════════════
// Component configs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct SmoothingConfig {
    /// Openness ratio → circle size target.
    pub size_map:        LinearMap,
    /// Openness ratio → circle alpha target (0–255 scale).
    pub alpha_map:       LinearMap,
    /// Hand size (capture px) → rotation velocity target (rad/frame).
    pub velocity_map:    LinearMap,
    pub size_factor:     f32,
    pub alpha_factor:    f32,
    pub velocity_factor: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig {
            size_map:        LinearMap::new(0.6, 1.4, 220.0, 520.0),
            alpha_map:       LinearMap::new(0.6, 1.4, 90.0, 210.0),
            velocity_map:    LinearMap::new(140.0, 340.0, 0.002, 0.05),
            size_factor:     0.08,
            alpha_factor:    0.08,
            velocity_factor: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FistConfig {
    /// Openness below this counts as a closed fist.
    pub threshold:       f32,
    /// How long the fist must be held before the circle breaks.
    pub hold:            Duration,
    /// How long a break lasts when the hand never opens.
    pub break_duration:  Duration,
    /// Extra openness above `threshold` that ends a break early.
    pub recovery_margin: f32,
}

impl FistConfig {
    pub fn recovery_threshold(&self) -> f32 {
        self.threshold + self.recovery_margin
    }
}

impl Default for FistConfig {
    fn default() -> Self {
        FistConfig {
            threshold:       0.75,
            hold:            Duration::from_millis(50),
            break_duration:  Duration::from_millis(3000),
            recovery_margin: 0.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
    pub sparkle_life:   u32,
    /// Upward drift per frame, surface px.
    pub sparkle_drift:  f32,
    /// Hand size → sparkle diameter.
    pub sparkle_size:   LinearMap,
    /// Life → sparkle alpha.
    pub sparkle_alpha:  LinearMap,
    /// Shards spawned per break.
    pub shard_count:    usize,
    /// Initial shard speed range, px/frame (upper bound exclusive).
    pub shard_speed:    (f32, f32),
    /// Downward acceleration, px/frame².
    pub shard_gravity:  f32,
    /// Shard life range, frames (upper bound exclusive).
    pub shard_life:     (u32, u32),
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            sparkle_life:  60,
            sparkle_drift: 0.2,
            sparkle_size:  LinearMap::new(120.0, 320.0, 4.0, 12.0),
            sparkle_alpha: LinearMap::new(0.0, 60.0, 0.0, 120.0),
            shard_count:   36,
            shard_speed:   (3.0, 10.0),
            shard_gravity: 0.15,
            shard_life:    (60, 140),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AudioConfig {
    /// Strongest alpha must exceed this for the circle loop to sound.
    pub circle_alpha_gate: f32,
    pub circle_rate:       LinearMap,
    pub circle_volume:     LinearMap,
    /// Index-tip speed (surface px/frame) that counts as a gust.
    pub wind_speed_gate:   f32,
    pub wind_fade:         LinearMap,
    pub wind_rate:         LinearMap,
    /// Per-frame decay of the wind fade toward silence.
    pub wind_decay:        f32,
    pub ambient_volume:    f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            circle_alpha_gate: 5.0,
            circle_rate:       LinearMap::new(0.0, 0.05, 0.7, 1.3),
            circle_volume:     LinearMap::new(0.0, 210.0, 0.0, 0.8),
            wind_speed_gate:   8.0,
            wind_fade:         LinearMap::new(8.0, 50.0, 0.1, 0.6),
            wind_rate:         LinearMap::new(8.0, 50.0, 0.9, 1.25),
            wind_decay:        0.05,
            ambient_volume:    0.35,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneConfig
// ════════════════════════════════════════════════════════════════════════════

/// Complete configuration of a [`crate::scene::Scene`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub surface_w:  f32,
    pub surface_h:  f32,
    pub scope:      ParamScope,
    pub smoothing:  SmoothingConfig,
    pub fist:       FistConfig,
    pub particles:  ParticleConfig,
    pub audio:      AudioConfig,
    /// Background star dots drawn each frame.
    pub star_count: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            surface_w:  1920.0,
            surface_h:  1080.0,
            scope:      ParamScope::Shared,
            smoothing:  SmoothingConfig::default(),
            fist:       FistConfig::default(),
            particles:  ParticleConfig::default(),
            audio:      AudioConfig::default(),
            star_count: 90,
        }
    }
}
