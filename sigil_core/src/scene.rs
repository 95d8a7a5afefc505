//! The per-frame orchestrator.
//!
//! [`Scene::tick`] runs one rendered frame: background, then every tracked
//! hand in detector order, then the particle systems and the audio mapping.
//! The caller supplies the timestamp, the latest hand list, a canvas and the
//! sound bank; the scene owns all the state that must persist between
//! frames.
//!
//! ```text
//!   hands ─▶ classify ─▶ params ─▶ sparkles ─▶ wind ─▶ fist machine
//!                                                         │
//!                              ┌──────── Break ───────────┤
//!                              ▼                          ▼
//!                     collapse + shards + shatter   circle / glow
//! ```
//!
//! Per-hand state is created the first time an index is seen and kept for
//! the life of the scene.  A hand that disappears keeps its state frozen
//! until its index comes back.

use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;

use crate::audio::{FrameLoudness, MotionTrail, SoundBank, WindTracker};
use crate::backdrop::draw_background;
use crate::canvas::Canvas;
use crate::classifier::{classify, HandMetrics, Openness};
use crate::config::{ParamScope, SceneConfig};
use crate::fist::{FistMachine, FistState, Transition};
use crate::geometry::{FrameMapper, Point};
use crate::hand::{HandIndex, HandObservation, Keypoint};
use crate::particles::{ShardField, SparkleField};
use crate::sigil::{draw_break_glow, draw_magic_circle};
use crate::smoother::AnimationParams;

// ════════════════════════════════════════════════════════════════════════════
// Per-hand state
// ════════════════════════════════════════════════════════════════════════════

/// The animation parameters of a circle and the fingertip trail feeding
/// its wind.  Owned by the scene in shared mode, by each hand otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleMotion {
    pub params: AnimationParams,
    pub trail:  MotionTrail,
}

impl CircleMotion {
    fn new(cfg: &SceneConfig) -> Self {
        CircleMotion {
            params: AnimationParams::new(&cfg.smoothing),
            trail:  MotionTrail::default(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct HandSlot {
    fist:   FistMachine,
    /// Unused in shared mode.
    motion: CircleMotion,
}

// ════════════════════════════════════════════════════════════════════════════
// Reports
// ════════════════════════════════════════════════════════════════════════════

/// What one hand did this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandReport {
    pub index:      HandIndex,
    /// Capture-space measurements.
    pub metrics:    HandMetrics,
    /// Hand center on the render surface.
    pub center:     Point,
    pub transition: Transition,
    pub broken:     bool,
    /// Circle size and alpha as drawn (or skipped) this frame.
    pub size:       f32,
    pub alpha:      f32,
    pub drawn:      bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub hands:    Vec<HandReport>,
    pub shards:   usize,
    pub sparkles: usize,
}

impl FrameReport {
    pub fn breaks(&self) -> usize {
        self.hands.iter().filter(|h| h.transition == Transition::Break).count()
    }

    pub fn recoveries(&self) -> usize {
        self.hands.iter().filter(|h| h.transition == Transition::Recover).count()
    }

    pub fn hand(&self, index: HandIndex) -> Option<&HandReport> {
        self.hands.iter().find(|h| h.index == index)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene<R: Rng> {
    cfg:      SceneConfig,
    mapper:   FrameMapper,
    rng:      R,
    shared:   CircleMotion,
    hands:    HashMap<HandIndex, HandSlot>,
    sparkles: SparkleField,
    shards:   ShardField,
    wind:     WindTracker,
}

impl<R: Rng> Scene<R> {
    pub fn new(cfg: SceneConfig, mapper: FrameMapper, rng: R) -> Self {
        Scene {
            shared:   CircleMotion::new(&cfg),
            hands:    HashMap::new(),
            sparkles: SparkleField::new(),
            shards:   ShardField::new(),
            wind:     WindTracker::default(),
            cfg,
            mapper,
            rng,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.cfg
    }

    /// Start the background music.  Call once before the first tick.
    pub fn start_audio(&self, sounds: &mut SoundBank) {
        sounds.start_ambient(&self.cfg.audio);
    }

    /// Parameters that drive hand `index`'s circle.  In shared mode every
    /// index sees the same set.
    pub fn params(&self, index: HandIndex) -> Option<&AnimationParams> {
        match self.cfg.scope {
            ParamScope::Shared  => Some(&self.shared.params),
            ParamScope::PerHand => self.hands.get(&index).map(|h| &h.motion.params),
        }
    }

    /// `None` until the index has been seen.
    pub fn fist_state(&self, index: HandIndex) -> Option<FistState> {
        self.hands.get(&index).map(|h| h.fist.state())
    }

    pub fn shards(&self) -> &ShardField { &self.shards }
    pub fn sparkles(&self) -> &SparkleField { &self.sparkles }
    pub fn wind_fade(&self) -> f32 { self.wind.fade }

    /// Run one frame.  `hands` is the detector's latest list; a hand's
    /// position in it is its index.
    pub fn tick(
        &mut self,
        now: Duration,
        hands: &[HandObservation],
        canvas: &mut impl Canvas,
        sounds: &mut SoundBank,
    ) -> FrameReport {
        let Scene { cfg, mapper, rng, shared, hands: slots, sparkles, shards, wind } = self;

        draw_background(canvas, cfg.surface_w, cfg.surface_h, cfg.star_count, rng);
        log::trace!("tick {:?}: {} hand(s)", now, hands.len());

        let mut loudness = FrameLoudness::default();
        let mut reports = Vec::with_capacity(hands.len());

        for (index, hand) in hands.iter().enumerate() {
            let metrics = classify(hand);
            let center = mapper.to_surface(metrics.center);
            let tips = hand.fingertips().map(|p| mapper.to_surface(p));

            let slot = slots.entry(index).or_insert_with(|| HandSlot {
                fist:   FistMachine::new(),
                motion: CircleMotion::new(cfg),
            });
            let motion = match cfg.scope {
                ParamScope::Shared  => &mut *shared,
                ParamScope::PerHand => &mut slot.motion,
            };

            if !slot.fist.is_broken() {
                match metrics.openness {
                    Openness::Known(ratio) => {
                        motion.params.track(ratio, metrics.hand_size, &cfg.smoothing)
                    }
                    Openness::Unknown => motion.params.spin(metrics.hand_size, &cfg.smoothing),
                }
                sparkles.emit(&tips, metrics.hand_size, &cfg.particles, rng);
            }

            let index_tip = mapper.to_surface(hand.get(Keypoint::IndexTip));
            if let Some(speed) = motion.trail.speed(index_tip) {
                wind.gust(speed, &cfg.audio, sounds);
            }

            let transition = slot.fist.update(metrics.openness, now, &cfg.fist);
            match transition {
                Transition::Break => {
                    motion.params.collapse();
                    shards.burst(center, &cfg.particles, rng);
                    sounds.shatter.trigger();
                    log::debug!(
                        "hand {} broke at {:?} (openness {:?})",
                        index, now, metrics.openness.ratio()
                    );
                }
                Transition::Recover => {
                    motion.params.collapse();
                    log::debug!("hand {} recovered at {:?}", index, now);
                }
                Transition::None => {}
            }

            let broken = slot.fist.is_broken();
            let drawn = if broken {
                draw_break_glow(canvas, center);
                false
            } else {
                loudness.observe(motion.params.alpha(), motion.params.velocity());
                draw_magic_circle(canvas, &motion.params, center)
            };

            reports.push(HandReport {
                index,
                metrics,
                center,
                transition,
                broken,
                size: motion.params.size(),
                alpha: motion.params.alpha(),
                drawn,
            });
        }

        sparkles.advance(canvas, &cfg.particles);
        shards.advance(canvas);

        loudness.apply(&cfg.audio, sounds);
        wind.settle(&cfg.audio, sounds);

        FrameReport { hands: reports, shards: shards.len(), sparkles: sparkles.len() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundProbe;
    use crate::canvas::{CommandList, DrawCommand};
    use crate::hand::HandPose;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SceneConfig {
        SceneConfig { surface_w: 64.0, surface_h: 36.0, star_count: 4, ..SceneConfig::default() }
    }

    fn scene(cfg: SceneConfig) -> Scene<StdRng> {
        let mapper = FrameMapper::new(640.0, 480.0, cfg.surface_w, cfg.surface_h);
        Scene::new(cfg, mapper, StdRng::seed_from_u64(42))
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn open_hand() -> HandObservation { HandPose::default().synthesize() }

    fn fist_hand() -> HandObservation { HandPose { curl: 1.0, ..HandPose::default() }.synthesize() }

    #[test]
    fn open_hand_grows_circle_and_sparkles() {
        let mut s = scene(small_config());
        let mut sounds = SoundBank::silent();
        let mut c = CommandList::new();
        let mut last = FrameReport::default();
        for f in 0..40 {
            c.clear();
            last = s.tick(ms(f * 16), &[open_hand()], &mut c, &mut sounds);
        }
        let h = last.hand(0).expect("hand 0");
        assert!(!h.broken && h.drawn);
        assert!(h.size > 200.0);
        assert!(last.sparkles > 0);
        assert!(c.is_balanced());
        assert_eq!(last.shards, 0);
    }

    #[test]
    fn held_fist_breaks_and_shows_glow() {
        let mut s = scene(small_config());
        let mut sounds = SoundBank::silent();
        let mut c = CommandList::new();

        s.tick(ms(0), &[fist_hand()], &mut c, &mut sounds);
        let r = s.tick(ms(60), &[fist_hand()], &mut c, &mut sounds);
        assert_eq!(r.breaks(), 1);
        assert!(r.hand(0).is_some_and(|h| h.broken && !h.drawn));
        assert_eq!(s.params(0).map(|p| (p.size(), p.alpha())), Some((0.0, 0.0)));

        c.clear();
        s.tick(ms(76), &[fist_hand()], &mut c, &mut sounds);
        let glow = r.hand(0).map(|h| DrawCommand::Ellipse(h.center, 40.0));
        assert!(glow.is_some_and(|g| c.commands.contains(&g)));
    }

    #[test]
    fn broken_hand_emits_no_sparkles_and_freezes_rotation() {
        let mut s = scene(small_config());
        let mut sounds = SoundBank::silent();
        let mut c = CommandList::new();
        s.tick(ms(0), &[fist_hand()], &mut c, &mut sounds);
        s.tick(ms(60), &[fist_hand()], &mut c, &mut sounds);
        let angle = s.params(0).map(|p| p.rotation_angle);

        for _ in 0..70 {
            s.tick(ms(100), &[fist_hand()], &mut c, &mut sounds);
        }
        assert!(s.sparkles().is_empty());
        assert_eq!(s.params(0).map(|p| p.rotation_angle), angle);
    }

    #[test]
    fn absent_hand_state_is_frozen() {
        let mut s = scene(small_config());
        let mut sounds = SoundBank::silent();
        let mut c = CommandList::new();
        s.tick(ms(0), &[fist_hand()], &mut c, &mut sounds);
        s.tick(ms(60), &[fist_hand()], &mut c, &mut sounds);
        let frozen = s.fist_state(0);

        s.tick(ms(10_000), &[], &mut c, &mut sounds);
        assert_eq!(s.fist_state(0), frozen);
        assert_eq!(s.fist_state(1), None);
    }

    #[test]
    fn break_plays_shatter_once_and_circle_loop_follows_alpha() {
        let shatter = SoundProbe::new();
        let circle = SoundProbe::new();
        let ambient = SoundProbe::new();
        let mut sounds = SoundBank {
            shatter: shatter.slot(),
            circle:  circle.slot(),
            ambient: ambient.slot(),
            ..SoundBank::default()
        };
        let mut s = scene(small_config());
        s.start_audio(&mut sounds);
        assert!(ambient.snapshot().looping);
        assert!((ambient.snapshot().volume - 0.35).abs() < 1e-6);

        let mut c = CommandList::new();
        for f in 0..10 { s.tick(ms(f * 16), &[open_hand()], &mut c, &mut sounds); }
        assert!(circle.snapshot().playing);

        s.tick(ms(1000), &[fist_hand()], &mut c, &mut sounds);
        s.tick(ms(1060), &[fist_hand()], &mut c, &mut sounds);
        assert_eq!(shatter.snapshot().starts, 1);
        assert!(!circle.snapshot().playing);
    }

    #[test]
    fn unknown_openness_keeps_rendering() {
        let mut s = scene(small_config());
        let mut sounds = SoundBank::silent();
        let mut c = CommandList::new();
        for f in 0..40 { s.tick(ms(f * 16), &[open_hand()], &mut c, &mut sounds); }
        let size = s.params(0).map(|p| p.size());

        let flat = HandObservation::from_fn(|_| Point::new(320.0, 240.0));
        let r = s.tick(ms(700), &[flat], &mut c, &mut sounds);
        let h = r.hand(0).expect("hand 0");
        assert_eq!(h.metrics.openness, Openness::Unknown);
        assert!(h.drawn);
        assert_eq!(s.params(0).map(|p| p.size()), size);
    }

    #[test]
    fn fast_index_tip_raises_wind() {
        let wind = SoundProbe::new();
        let mut sounds = SoundBank { wind: wind.slot(), ..SoundBank::default() };
        let mut s = scene(SceneConfig::default());
        let mut c = CommandList::new();

        let left = HandPose { center: Point::new(200.0, 240.0), ..HandPose::default() }.synthesize();
        let right = HandPose { center: Point::new(240.0, 240.0), ..HandPose::default() }.synthesize();
        s.tick(ms(0), &[left], &mut c, &mut sounds);
        assert_eq!(s.wind_fade(), 0.0);
        s.tick(ms(16), &[right], &mut c, &mut sounds);
        assert!(s.wind_fade() > 0.5);
        assert!(wind.snapshot().looping);
    }
}
