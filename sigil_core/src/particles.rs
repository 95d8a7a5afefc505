//! Fingertip sparkles and shatter shards.
//!
//! Both systems live in one process-wide collection each, independent of
//! which hand emitted the particle.  Lifetimes are counted in frames; every
//! call to `advance` is one frame: integrate, draw, then drop the dead.
//!
//! Randomness is injected (`R: Rng`) so a seeded generator makes every
//! burst reproducible.

use std::f32::consts::TAU;

use rand::Rng;

use crate::canvas::{Canvas, Rgb};
use crate::config::ParticleConfig;
use crate::geometry::{map_range, Point};

pub const SPARKLE_PALETTE: [Rgb; 3] = [
    Rgb(255, 200, 230),
    Rgb(240, 220, 255),
    Rgb(255, 235, 250),
];

pub const SHARD_PALETTE: [Rgb; 3] = [
    Rgb(255, 180, 220),
    Rgb(255, 210, 230),
    Rgb(240, 220, 255),
];

/// Life at which a shard is drawn at full size/opacity.
const SHARD_FULL_LIFE: f32 = 140.0;

fn pick<R: Rng>(rng: &mut R, palette: &[Rgb]) -> Rgb {
    palette[rng.random_range(0..palette.len())]
}

// ════════════════════════════════════════════════════════════════════════════
// Sparkles
// ════════════════════════════════════════════════════════════════════════════

/// A short-lived dot that floats up from a fingertip.
#[derive(Clone, Debug, PartialEq)]
pub struct Sparkle {
    pub position: Point,
    /// Drawn diameter, surface px.
    pub size:     f32,
    /// Remaining frames.
    pub life:     u32,
    pub color:    Rgb,
}

#[derive(Clone, Debug, Default)]
pub struct SparkleField {
    sparkles: Vec<Sparkle>,
}

impl SparkleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize { self.sparkles.len() }
    pub fn is_empty(&self) -> bool { self.sparkles.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &Sparkle> { self.sparkles.iter() }

    /// One sparkle per fingertip.  `hand_size` (capture px) sets the size.
    pub fn emit<R: Rng>(
        &mut self,
        tips: &[Point],
        hand_size: f32,
        cfg: &ParticleConfig,
        rng: &mut R,
    ) {
        let size = cfg.sparkle_size.apply(hand_size);
        for &tip in tips {
            self.sparkles.push(Sparkle {
                position: tip,
                size,
                life: cfg.sparkle_life,
                color: pick(rng, &SPARKLE_PALETTE),
            });
        }
    }

    /// Age, drift, draw and cull every sparkle.
    pub fn advance(&mut self, canvas: &mut impl Canvas, cfg: &ParticleConfig) {
        canvas.push();
        canvas.no_stroke();
        for s in &mut self.sparkles {
            s.life = s.life.saturating_sub(1);
            s.position.y -= cfg.sparkle_drift;
            canvas.fill(s.color, cfg.sparkle_alpha.apply(s.life as f32));
            canvas.ellipse(s.position, s.size);
        }
        canvas.pop();
        self.sparkles.retain(|s| s.life > 0);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Shards
// ════════════════════════════════════════════════════════════════════════════

/// A ballistic fragment of a shattered circle.
#[derive(Clone, Debug, PartialEq)]
pub struct Shard {
    pub position:     Point,
    pub velocity:     Point,
    pub acceleration: Point,
    /// Remaining frames.
    pub life:         u32,
    pub color:        Rgb,
}

impl Shard {
    /// One semi-implicit Euler step: velocity first, then position.
    pub fn step(&mut self) {
        self.velocity += self.acceleration;
        self.position += self.velocity;
        self.life = self.life.saturating_sub(1);
    }

    pub fn alpha(&self) -> f32 {
        map_range(self.life as f32, 0.0, SHARD_FULL_LIFE, 0.0, 220.0)
    }

    pub fn diameter(&self) -> f32 {
        map_range(self.life as f32, 0.0, SHARD_FULL_LIFE, 0.5, 6.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ShardField {
    shards: Vec<Shard>,
}

impl ShardField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize { self.shards.len() }
    pub fn is_empty(&self) -> bool { self.shards.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &Shard> { self.shards.iter() }

    pub fn push(&mut self, shard: Shard) {
        self.shards.push(shard);
    }

    /// Spawn `cfg.shard_count` shards flying out of `center` in random
    /// directions.
    pub fn burst<R: Rng>(&mut self, center: Point, cfg: &ParticleConfig, rng: &mut R) {
        let (v_lo, v_hi) = cfg.shard_speed;
        let (l_lo, l_hi) = cfg.shard_life;
        self.shards.reserve(cfg.shard_count);
        for _ in 0..cfg.shard_count {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(v_lo..v_hi);
            self.shards.push(Shard {
                position:     center,
                velocity:     Point::from_angle(angle) * speed,
                acceleration: Point::new(0.0, cfg.shard_gravity),
                life:         rng.random_range(l_lo..l_hi),
                color:        pick(rng, &SHARD_PALETTE),
            });
        }
    }

    /// Step, draw and cull every shard.
    pub fn advance(&mut self, canvas: &mut impl Canvas) {
        canvas.push();
        canvas.no_stroke();
        for s in &mut self.shards {
            s.step();
            canvas.fill(s.color, s.alpha());
            canvas.ellipse(s.position, s.diameter());
        }
        canvas.pop();
        self.shards.retain(|s| s.life > 0);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CommandList, DrawCommand};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ellipses(c: &CommandList) -> usize {
        c.count(|cmd| matches!(cmd, DrawCommand::Ellipse(..)))
    }

    /// Fill alphas and ellipse diameters, in drawing order.
    fn fills_and_sizes(c: &CommandList) -> (Vec<f32>, Vec<f32>) {
        let alphas = c.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Fill(_, a) => Some(*a),
            _ => None,
        }).collect();
        let sizes = c.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Ellipse(_, d) => Some(*d),
            _ => None,
        }).collect();
        (alphas, sizes)
    }

    fn strictly_decreasing(v: &[f32]) -> bool {
        v.windows(2).all(|w| w[1] < w[0])
    }

    #[test]
    fn shard_lives_exactly_its_life() {
        let mut field = ShardField::new();
        field.push(Shard {
            position:     Point::ZERO,
            velocity:     Point::new(1.0, -4.0),
            acceleration: Point::new(0.0, 0.15),
            life:         7,
            color:        SHARD_PALETTE[0],
        });

        let mut canvas = CommandList::new();
        let mut last_vy = f32::NEG_INFINITY;
        let mut frames = 0;
        while !field.is_empty() {
            let before = field.iter().next().map(|s| s.velocity.y);
            field.advance(&mut canvas);
            frames += 1;
            if let Some(vy) = before { assert!(vy > last_vy); last_vy = vy; }
            assert!(frames <= 7);
        }
        assert_eq!(frames, 7);
        assert_eq!(ellipses(&canvas), 7);
    }

    #[test]
    fn shard_fades_and_shrinks_with_life() {
        let mut field = ShardField::new();
        field.push(Shard {
            position:     Point::ZERO,
            velocity:     Point::ZERO,
            acceleration: Point::new(0.0, 0.15),
            life:         140,
            color:        SHARD_PALETTE[2],
        });
        let mut canvas = CommandList::new();
        while !field.is_empty() { field.advance(&mut canvas); }

        let (alphas, sizes) = fills_and_sizes(&canvas);
        assert_eq!(alphas.len(), 140);
        assert_eq!(sizes.len(), 140);
        assert!(strictly_decreasing(&alphas));
        assert!(strictly_decreasing(&sizes));

        // First frame is drawn at life 139, the last at life 0.
        assert!((alphas[0] - 220.0 * 139.0 / 140.0).abs() < 1e-3);
        assert!((sizes[0] - (0.5 + 5.5 * 139.0 / 140.0)).abs() < 1e-4);
        assert_eq!(alphas[139], 0.0);
        assert_eq!(sizes[139], 0.5);
    }

    #[test]
    fn shard_vertical_velocity_strictly_increases() {
        let mut s = Shard {
            position:     Point::ZERO,
            velocity:     Point::new(0.0, -8.0),
            acceleration: Point::new(0.0, 0.15),
            life:         100,
            color:        SHARD_PALETTE[1],
        };
        let mut prev = s.velocity.y;
        for _ in 0..50 {
            s.step();
            assert!(s.velocity.y > prev);
            prev = s.velocity.y;
        }
    }

    #[test]
    fn burst_samples_within_ranges() {
        let cfg = ParticleConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut field = ShardField::new();
        let center = Point::new(500.0, 400.0);
        field.burst(center, &cfg, &mut rng);

        assert_eq!(field.len(), 36);
        for s in field.iter() {
            let speed = s.velocity.length();
            assert!(speed >= 2.999 && speed < 10.001, "speed {}", speed);
            assert!((60..140).contains(&s.life));
            assert_eq!(s.position, center);
            assert_eq!(s.acceleration, Point::new(0.0, 0.15));
            assert!(SHARD_PALETTE.contains(&s.color));
        }
    }

    #[test]
    fn overlapping_bursts_never_exceed_their_sum() {
        let cfg = ParticleConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = ShardField::new();
        let mut canvas = CommandList::new();

        field.burst(Point::ZERO, &cfg, &mut rng);
        for _ in 0..30 { field.advance(&mut canvas); }
        let survivors = field.len();
        assert!(survivors <= 36);

        field.burst(Point::ZERO, &cfg, &mut rng);
        assert_eq!(field.len(), survivors + 36);
        for _ in 0..200 {
            field.advance(&mut canvas);
            assert!(field.len() <= survivors + 36);
        }
        assert!(field.is_empty());
    }

    #[test]
    fn same_seed_same_burst() {
        let cfg = ParticleConfig::default();
        let mut a = ShardField::new();
        let mut b = ShardField::new();
        a.burst(Point::ZERO, &cfg, &mut StdRng::seed_from_u64(3));
        b.burst(Point::ZERO, &cfg, &mut StdRng::seed_from_u64(3));
        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn sparkles_drift_up_and_expire() {
        let cfg = ParticleConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = SparkleField::new();
        let tips = [Point::new(10.0, 100.0); 5];
        field.emit(&tips, 220.0, &cfg, &mut rng);
        assert_eq!(field.len(), 5);
        assert!(field.iter().all(|s| (s.size - 8.0).abs() < 1e-4));
        assert!(field.iter().all(|s| SPARKLE_PALETTE.contains(&s.color)));

        let mut canvas = CommandList::new();
        field.advance(&mut canvas, &cfg);
        assert!(field.iter().all(|s| s.position.y < 100.0 && s.life == 59));

        for _ in 0..59 { field.advance(&mut canvas, &cfg); }
        assert!(field.is_empty());
        assert_eq!(ellipses(&canvas), 5 * 60);
    }

    #[test]
    fn sparkle_alpha_fades_to_nothing() {
        let cfg = ParticleConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut field = SparkleField::new();
        field.emit(&[Point::new(0.0, 50.0)], 200.0, &cfg, &mut rng);

        let mut canvas = CommandList::new();
        while !field.is_empty() { field.advance(&mut canvas, &cfg); }

        let (alphas, sizes) = fills_and_sizes(&canvas);
        assert_eq!(alphas.len(), 60);
        assert!(strictly_decreasing(&alphas));
        assert!((alphas[0] - 118.0).abs() < 1e-4);
        assert_eq!(alphas[59], 0.0);
        assert!(sizes.iter().all(|&d| d == sizes[0]));
    }

    #[test]
    fn sparkle_size_clamped() {
        let cfg = ParticleConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut field = SparkleField::new();
        field.emit(&[Point::ZERO], 10.0, &cfg, &mut rng);
        field.emit(&[Point::ZERO], 999.0, &cfg, &mut rng);
        let sizes: Vec<f32> = field.iter().map(|s| s.size).collect();
        assert_eq!(sizes, vec![4.0, 12.0]);
    }
}
