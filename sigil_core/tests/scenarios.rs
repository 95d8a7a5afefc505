//! End-to-end frames through `Scene::tick` with synthetic hands.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use sigil_core::audio::{SoundBank, SoundProbe};
use sigil_core::canvas::CommandList;
use sigil_core::fist::Transition;
use sigil_core::{FrameMapper, HandObservation, HandPose, ParamScope, Point, Scene, SceneConfig};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn scene(scope: ParamScope) -> Scene<StdRng> {
    let cfg = SceneConfig { surface_w: 96.0, surface_h: 54.0, star_count: 3, scope, ..SceneConfig::default() };
    let mapper = FrameMapper::new(640.0, 480.0, cfg.surface_w, cfg.surface_h);
    Scene::new(cfg, mapper, StdRng::seed_from_u64(2024))
}

/// A hand whose openness ratio is exactly `ratio`: bounding box 100×100,
/// thumb→index 0, index→pinky = `ratio`·100.
fn hand_with_ratio(ratio: f32, origin: Point) -> HandObservation {
    use sigil_core::hand::Keypoint;
    HandObservation::from_fn(|kp| {
        let p = match kp {
            Keypoint::Wrist    => Point::new(0.0, 100.0),
            Keypoint::ThumbTip => Point::new(0.0, 0.0),
            Keypoint::IndexTip => Point::new(0.0, 0.0),
            Keypoint::PinkyTip => Point::new(ratio * 100.0, 0.0),
            _                  => Point::new(100.0, 50.0),
        };
        p + origin
    })
}

fn open_hand(at: Point) -> HandObservation {
    HandPose { center: at, ..HandPose::default() }.synthesize()
}

#[test]
fn fist_held_sixty_ms_breaks_once() {
    let mut s = scene(ParamScope::Shared);
    let mut c = CommandList::new();
    let mut sounds = SoundBank::silent();
    let origin = Point::new(200.0, 200.0);

    for f in 0..30 {
        s.tick(ms(f * 16), &[open_hand(Point::new(320.0, 240.0))], &mut c, &mut sounds);
        c.clear();
    }
    let start = 30 * 16;
    let shards_before = s.shards().len();

    let mut breaks = 0;
    let mut t = start;
    while t <= start + 60 {
        let r = s.tick(ms(t), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
        breaks += r.breaks();
        c.clear();
        t += 10;
    }

    assert_eq!(breaks, 1);
    assert!(s.fist_state(0).is_some_and(|f| f.is_broken));
    // Two frames since the burst; no shard is that short-lived.
    assert_eq!(s.shards().len(), shards_before + 36);
    let p = s.params(0).expect("shared params");
    assert_eq!((p.size(), p.alpha()), (0.0, 0.0));
}

#[test]
fn open_hand_ends_break_and_resets() {
    let mut s = scene(ParamScope::Shared);
    let mut c = CommandList::new();
    let mut sounds = SoundBank::silent();
    let origin = Point::new(200.0, 200.0);

    s.tick(ms(0), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
    let r = s.tick(ms(60), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
    assert_eq!(r.breaks(), 1);

    let r = s.tick(ms(400), &[hand_with_ratio(0.95, origin)], &mut c, &mut sounds);
    let h = r.hand(0).expect("hand 0");
    assert_eq!(h.transition, Transition::Recover);
    assert!(!h.broken);
    assert_eq!(s.fist_state(0).map(|f| f.is_broken), Some(false));
    let p = s.params(0).expect("shared params");
    assert_eq!((p.size(), p.alpha()), (0.0, 0.0));

    // Regrows on the next frame.
    s.tick(ms(416), &[hand_with_ratio(0.95, origin)], &mut c, &mut sounds);
    assert!(s.params(0).is_some_and(|p| p.size() > 0.0));
}

#[test]
fn break_times_out_after_three_seconds() {
    let mut s = scene(ParamScope::Shared);
    let mut c = CommandList::new();
    let mut sounds = SoundBank::silent();
    let origin = Point::new(200.0, 200.0);

    s.tick(ms(0), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
    s.tick(ms(50), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
    let end = s.fist_state(0).map(|f| f.break_end);
    assert_eq!(end, Some(ms(3050)));

    let r = s.tick(ms(3050), &[hand_with_ratio(0.85, origin)], &mut c, &mut sounds);
    assert!(r.hand(0).is_some_and(|h| h.broken));
    let r = s.tick(ms(3051), &[hand_with_ratio(0.85, origin)], &mut c, &mut sounds);
    assert_eq!(r.recoveries(), 1);
}

#[test]
fn shared_params_reset_the_other_hand() {
    let mut s = scene(ParamScope::Shared);
    let mut c = CommandList::new();
    let mut sounds = SoundBank::silent();
    let fist = Point::new(100.0, 200.0);
    let steady = Point::new(450.0, 240.0);

    for f in 0..40 {
        s.tick(ms(f * 16), &[open_hand(Point::new(150.0, 240.0)), open_hand(steady)], &mut c, &mut sounds);
        c.clear();
    }
    let grown = s.params(1).map(|p| p.size()).unwrap_or(0.0);
    assert!(grown > 300.0);

    s.tick(ms(1000), &[hand_with_ratio(0.5, fist), open_hand(steady)], &mut c, &mut sounds);
    let r = s.tick(ms(1060), &[hand_with_ratio(0.5, fist), open_hand(steady)], &mut c, &mut sounds);

    assert_eq!(r.hand(0).map(|h| h.transition), Some(Transition::Break));
    let other = r.hand(1).expect("hand 1");
    assert!(!other.broken);
    // Hand 1 was processed after the collapse: one smoothing step from zero.
    assert!(other.size < 0.1 * grown, "size {} grown {}", other.size, grown);
}

#[test]
fn per_hand_params_leave_the_other_hand_alone() {
    let mut s = scene(ParamScope::PerHand);
    let mut c = CommandList::new();
    let mut sounds = SoundBank::silent();
    let fist = Point::new(100.0, 200.0);
    let steady = Point::new(450.0, 240.0);

    for f in 0..40 {
        s.tick(ms(f * 16), &[open_hand(Point::new(150.0, 240.0)), open_hand(steady)], &mut c, &mut sounds);
        c.clear();
    }
    let grown = s.params(1).map(|p| p.size()).unwrap_or(0.0);

    s.tick(ms(1000), &[hand_with_ratio(0.5, fist), open_hand(steady)], &mut c, &mut sounds);
    let r = s.tick(ms(1060), &[hand_with_ratio(0.5, fist), open_hand(steady)], &mut c, &mut sounds);

    assert_eq!(r.breaks(), 1);
    assert_eq!(s.params(0).map(|p| p.size()), Some(0.0));
    let other = r.hand(1).expect("hand 1");
    assert!(other.size >= grown * 0.95);
}

#[test]
fn break_sound_and_circle_loop() {
    let shatter = SoundProbe::new();
    let circle = SoundProbe::new();
    let mut sounds = SoundBank { shatter: shatter.slot(), circle: circle.slot(), ..SoundBank::default() };
    let mut s = scene(ParamScope::Shared);
    let mut c = CommandList::new();
    let origin = Point::new(200.0, 200.0);

    s.tick(ms(0), &[hand_with_ratio(1.2, origin)], &mut c, &mut sounds);
    assert!(circle.snapshot().playing);

    s.tick(ms(100), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
    s.tick(ms(160), &[hand_with_ratio(0.5, origin)], &mut c, &mut sounds);
    assert_eq!(shatter.snapshot().starts, 1);
    assert!(!circle.snapshot().playing);
}
