//! Hand observations as delivered by the pose detector.
//!
//! A detector reports, per frame, a list of hands.  Each hand is a fixed set
//! of 21 named keypoints in capture-frame pixels, in the usual
//! wrist → thumb → index → middle → ring → pinky order.  Observations are
//! read-only input: they are consumed by one tick and then dropped.

use crate::geometry::Point;

/// Position of a hand in the detector's output list.  Used as the key for
/// all per-hand state.
pub type HandIndex = usize;

/// Number of keypoints in every [`HandObservation`].
pub const KEYPOINT_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Keypoint
// ════════════════════════════════════════════════════════════════════════════

/// Named hand keypoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Keypoint {
    Wrist       = 0,
    ThumbCmc    = 1,
    ThumbMcp    = 2,
    ThumbIp     = 3,
    ThumbTip    = 4,
    IndexMcp    = 5,
    IndexPip    = 6,
    IndexDip    = 7,
    IndexTip    = 8,
    MiddleMcp   = 9,
    MiddlePip   = 10,
    MiddleDip   = 11,
    MiddleTip   = 12,
    RingMcp     = 13,
    RingPip     = 14,
    RingDip     = 15,
    RingTip     = 16,
    PinkyMcp    = 17,
    PinkyPip    = 18,
    PinkyDip    = 19,
    PinkyTip    = 20,
}

impl Keypoint {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five fingertips, thumb first.
pub const FINGERTIPS: [Keypoint; 5] = [
    Keypoint::ThumbTip,
    Keypoint::IndexTip,
    Keypoint::MiddleTip,
    Keypoint::RingTip,
    Keypoint::PinkyTip,
];

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    keypoints: [Point; KEYPOINT_COUNT],
}

impl HandObservation {
    pub fn new(keypoints: [Point; KEYPOINT_COUNT]) -> Self {
        HandObservation { keypoints }
    }

    /// Build an observation by asking `f` for each keypoint in order.
    pub fn from_fn(mut f: impl FnMut(Keypoint) -> Point) -> Self {
        let mut keypoints = [Point::ZERO; KEYPOINT_COUNT];
        for (i, slot) in keypoints.iter_mut().enumerate() {
            *slot = f(KEYPOINT_ORDER[i]);
        }
        HandObservation { keypoints }
    }

    pub fn get(&self, kp: Keypoint) -> Point {
        self.keypoints[kp.index()]
    }

    pub fn keypoints(&self) -> &[Point; KEYPOINT_COUNT] {
        &self.keypoints
    }

    /// Fingertip positions in [`FINGERTIPS`] order.
    pub fn fingertips(&self) -> [Point; 5] {
        FINGERTIPS.map(|kp| self.get(kp))
    }

    /// Every keypoint multiplied by `k` about the origin.
    pub fn scaled(&self, k: f32) -> Self {
        HandObservation { keypoints: self.keypoints.map(|p| p * k) }
    }

    /// Reflected across the vertical line `x = axis`; a right hand becomes a
    /// left hand.
    pub fn mirrored(&self, axis: f32) -> Self {
        HandObservation { keypoints: self.keypoints.map(|p| Point::new(2.0 * axis - p.x, p.y)) }
    }
}

const KEYPOINT_ORDER: [Keypoint; KEYPOINT_COUNT] = [
    Keypoint::Wrist,
    Keypoint::ThumbCmc,  Keypoint::ThumbMcp,  Keypoint::ThumbIp,   Keypoint::ThumbTip,
    Keypoint::IndexMcp,  Keypoint::IndexPip,  Keypoint::IndexDip,  Keypoint::IndexTip,
    Keypoint::MiddleMcp, Keypoint::MiddlePip, Keypoint::MiddleDip, Keypoint::MiddleTip,
    Keypoint::RingMcp,   Keypoint::RingPip,   Keypoint::RingDip,   Keypoint::RingTip,
    Keypoint::PinkyMcp,  Keypoint::PinkyPip,  Keypoint::PinkyDip,  Keypoint::PinkyTip,
];

// ════════════════════════════════════════════════════════════════════════════
// Synthetic hands
// ════════════════════════════════════════════════════════════════════════════

/// Pose parameters for a synthesised hand.
///
/// `span` is the rough palm-to-fingertip length in capture pixels, `spread`
/// fans the fingers (1.0 = relaxed open hand) and `curl` folds every finger
/// toward the palm (0.0 = open, 1.0 = closed fist).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub center: Point,
    pub span:   f32,
    pub spread: f32,
    pub curl:   f32,
}

impl Default for HandPose {
    fn default() -> Self {
        HandPose { center: Point::new(320.0, 240.0), span: 200.0, spread: 1.0, curl: 0.0 }
    }
}

// Finger fan angles (radians from straight up), lengths and knuckle reach,
// thumb first, all relative to the span.
const FAN:    [f32; 5] = [-0.95, -0.30, -0.05, 0.20, 0.45];
const LENGTH: [f32; 5] = [0.35, 0.42, 0.46, 0.43, 0.36];
const REACH:  [f32; 5] = [0.25, 0.45, 0.47, 0.45, 0.42];

impl HandPose {
    /// Lay out 21 keypoints for this pose.  Used by simulated detectors and
    /// by tests that need plausible hands.
    pub fn synthesize(&self) -> HandObservation {
        let s = self.span;
        let up = |angle: f32| Point::new(angle.sin(), -angle.cos());

        let wrist = self.center + Point::new(0.0, 0.5 * s);
        let palm  = self.center + Point::new(0.0, 0.15 * s);
        let curl  = self.curl.clamp(0.0, 1.0);

        let mut keypoints = [Point::ZERO; KEYPOINT_COUNT];
        keypoints[Keypoint::Wrist.index()] = wrist;

        for finger in 0..5 {
            let knuckle_dir = if finger == 0 { up(-1.0) } else { up(FAN[finger] * 0.6) };
            let knuckle = wrist + knuckle_dir * (s * REACH[finger]);
            let dir = up(FAN[finger] * self.spread);

            let base = 1 + 4 * finger;
            keypoints[base] = knuckle;
            for joint in 1..4 {
                let t = joint as f32 / 3.0;
                let extended = knuckle + dir * (s * LENGTH[finger] * t);
                let folded   = knuckle + (palm - knuckle) * (t * 0.9);
                keypoints[base + joint] = extended + (folded - extended) * curl;
            }
        }

        HandObservation::new(keypoints)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
