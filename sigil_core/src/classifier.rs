//! Per-frame hand measurements: scale proxy, openness ratio and center.
//!
//! The openness ratio is the thumb→index plus index→pinky tip distance,
//! divided by the hand size (mean of bounding-box width and height).  Both
//! terms scale with distance from the camera, so one fixed fist threshold
//! works for near and far hands alike.

use crate::geometry::Point;
use crate::hand::{HandObservation, Keypoint};

/// Hand sizes below this (capture px) are treated as degenerate geometry.
pub const MIN_HAND_SIZE: f32 = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// Openness
// ════════════════════════════════════════════════════════════════════════════

/// Finger-spread signal for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Openness {
    /// Scale-normalised spread; small = fist, ~1.0+ = open hand.
    Known(f32),
    /// The keypoints were degenerate; there is no gesture signal this frame.
    Unknown,
}

impl Openness {
    pub fn ratio(self) -> Option<f32> {
        match self {
            Openness::Known(r) => Some(r),
            Openness::Unknown  => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandMetrics
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandMetrics {
    /// Mean of bounding-box width and height, capture px.
    pub hand_size: f32,
    pub openness:  Openness,
    /// Mean of all keypoints, capture px.
    pub center:    Point,
}

/// Measure one hand.
pub fn classify(hand: &HandObservation) -> HandMetrics {
    let pts: Vec<Point> = hand.keypoints()
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    let all_finite = pts.len() == hand.keypoints().len();

    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in &pts {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let hand_size = ((max_x - min_x) + (max_y - min_y)) / 2.0;
    let center = Point::mean(&pts).unwrap_or_default();

    let openness = if all_finite && hand_size >= MIN_HAND_SIZE {
        let thumb = hand.get(Keypoint::ThumbTip);
        let index = hand.get(Keypoint::IndexTip);
        let pinky = hand.get(Keypoint::PinkyTip);
        let spread = thumb.distance(index) + index.distance(pinky);
        Openness::Known(spread / hand_size)
    } else {
        Openness::Unknown
    };

    HandMetrics {
        hand_size: if hand_size.is_finite() { hand_size } else { 0.0 },
        openness,
        center,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HandPose;

    fn ratio(hand: &HandObservation) -> f32 {
        classify(hand).openness.ratio().expect("known openness")
    }

    #[test]
    fn openness_is_scale_invariant() {
        let hand = HandPose { spread: 1.3, ..HandPose::default() }.synthesize();
        let base = ratio(&hand);
        for &k in &[0.25_f32, 0.5, 2.0, 3.7, 10.0] {
            let scaled = ratio(&hand.scaled(k));
            assert!((scaled - base).abs() < 1e-4, "k={} base={} scaled={}", k, base, scaled);
        }
    }

    #[test]
    fn open_hand_above_fist_threshold_and_fist_below() {
        let open = HandPose::default().synthesize();
        let fist = HandPose { curl: 1.0, ..HandPose::default() }.synthesize();
        assert!(ratio(&open) > 0.9);
        assert!(ratio(&fist) < 0.75);
    }

    #[test]
    fn hand_size_is_mean_of_box_sides() {
        let hand = HandObservation::from_fn(|kp| match kp {
            Keypoint::Wrist    => Point::new(0.0, 0.0),
            Keypoint::PinkyTip => Point::new(100.0, 50.0),
            _                  => Point::new(10.0, 10.0),
        });
        assert_eq!(classify(&hand).hand_size, 75.0);
    }

    #[test]
    fn coincident_keypoints_are_unknown() {
        let hand = HandObservation::from_fn(|_| Point::new(42.0, 42.0));
        let m = classify(&hand);
        assert_eq!(m.openness, Openness::Unknown);
        assert_eq!(m.center, Point::new(42.0, 42.0));
    }

    #[test]
    fn non_finite_keypoints_are_unknown() {
        let hand = HandObservation::from_fn(|kp| {
            if kp == Keypoint::Wrist { Point::new(f32::NAN, 0.0) } else { Point::new(kp.index() as f32 * 5.0, 3.0) }
        });
        let m = classify(&hand);
        assert_eq!(m.openness, Openness::Unknown);
        assert!(m.center.x.is_finite() && m.hand_size.is_finite());
    }
}
