//! Hand detectors — LeapMotion hardware or keyboard/mouse simulation.
//!
//! Either way the output is a whole list of hands per detector frame,
//! delivered over an `mpsc` channel.  The frame loop only ever looks at the
//! newest list ([`drain_latest`]); anything older is dropped.
//!
//! Keypoints are in capture coordinates (640×480 by default) and already
//! mirrored so that moving a hand to the right moves it right on screen.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use sigil_core::geometry::{lerp, Point};
use sigil_core::hand::{HandObservation, HandPose};

/// One detector frame: every hand it currently sees, in its own order.
pub type HandFrame = Vec<HandObservation>;

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<H: HandSource>(source: H) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// Take the newest pending frame, discarding older ones.
///
/// `Ok(None)` means nothing new arrived; `Err` means the source has gone
/// away for good.
pub fn drain_latest(rx: &Receiver<HandFrame>) -> Result<Option<HandFrame>, TryRecvError> {
    let mut latest = None;
    loop {
        match rx.try_recv() {
            Ok(frame) => latest = Some(frame),
            Err(TryRecvError::Empty) => return Ok(latest),
            Err(TryRecvError::Disconnected) => {
                return if latest.is_some() { Ok(latest) } else { Err(TryRecvError::Disconnected) };
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHands — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window, once per rendered frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimControls {
    /// Pointer in capture coordinates.
    pub pointer:      Point,
    /// Primary hand clenched (Space or left mouse button).
    pub fist:         bool,
    /// Second hand clenched (K).
    pub second_fist:  bool,
    /// Change in finger spread (scroll wheel, Up/Down).
    pub spread_delta: f32,
    /// Change in hand span, capture px (W/S: toward/away from the camera).
    pub span_delta:   f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Frame(SimControls),
    /// Show or hide the mirrored second hand (H).
    ToggleSecondHand,
}

const SPREAD_RANGE: (f32, f32) = (0.3, 1.8);
const SPAN_RANGE:   (f32, f32) = (60.0, 360.0);
/// Fraction of the remaining curl covered per frame; a real fist takes a
/// few frames to close.
const CURL_RATE:    f32 = 0.35;

/// The simulated hands' pose state.
#[derive(Clone, Debug, PartialEq)]
pub struct SimHands {
    video_w: f32,
    primary: HandPose,
    second:  Option<HandPose>,
}

impl SimHands {
    pub fn new(video_w: f32, video_h: f32) -> Self {
        let primary = HandPose { center: Point::new(video_w / 2.0, video_h / 2.0), ..HandPose::default() };
        SimHands { video_w, primary, second: None }
    }

    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::ToggleSecondHand => {
                self.second = match self.second {
                    Some(_) => None,
                    None    => Some(self.primary),
                };
            }
            SimInput::Frame(c) => {
                let p = &mut self.primary;
                p.center = c.pointer;
                p.spread = (p.spread + c.spread_delta).clamp(SPREAD_RANGE.0, SPREAD_RANGE.1);
                p.span = (p.span + c.span_delta).clamp(SPAN_RANGE.0, SPAN_RANGE.1);
                p.curl = lerp(p.curl, if c.fist { 1.0 } else { 0.0 }, CURL_RATE);

                let mirror = Point::new(self.video_w - c.pointer.x, c.pointer.y);
                let (spread, span) = (p.spread, p.span);
                if let Some(s) = &mut self.second {
                    s.center = mirror;
                    s.spread = spread;
                    s.span = span;
                    s.curl = lerp(s.curl, if c.second_fist { 1.0 } else { 0.0 }, CURL_RATE);
                }
            }
        }
    }

    /// The primary hand, then the second one drawn as its mirror image.
    pub fn hands(&self) -> HandFrame {
        let mut frame = vec![self.primary.synthesize()];
        if let Some(s) = &self.second {
            frame.push(s.synthesize().mirrored(s.center.x));
        }
        frame
    }
}

/// Hand source driven by [`SimInput`] events from the visualizer's window.
pub struct SimHandSource {
    pub rx:    Receiver<SimInput>,
    pub hands: SimHands,
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let SimHandSource { rx, mut hands } = *self;
        for input in rx {
            hands.apply(input);
            if let SimInput::Frame(_) = input {
                if tx.send(hands.hands()).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Maps LeapMotion millimetres onto the capture frame.
///
/// The device looks up from the desk, so its x axis already matches the
/// user's left/right and y is height above the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeapProjection {
    /// Horizontal mm covered by the frame, centred on the sensor.
    pub x_span: f32,
    /// Height band in mm, bottom to top of the frame.
    pub y_range: (f32, f32),
    pub video_w: f32,
    pub video_h: f32,
}

impl Default for LeapProjection {
    fn default() -> Self {
        LeapProjection { x_span: 400.0, y_range: (80.0, 420.0), video_w: 640.0, video_h: 480.0 }
    }
}

impl LeapProjection {
    pub fn project(&self, x_mm: f32, y_mm: f32) -> Point {
        let (lo, hi) = self.y_range;
        Point::new(
            (x_mm / self.x_span + 0.5) * self.video_w,
            (1.0 - (y_mm - lo) / (hi - lo)) * self.video_h,
        )
    }
}

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each digit contributes its four joints in knuckle-to-tip order; the wrist
/// is taken midway between the index and pinky metacarpal bases.
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    pub projection: LeapProjection,
}

/// Connect to the LeapMotion service on a tracking thread.  Blocks until
/// the connection is open so a missing device is reported up front.
#[cfg(feature = "leap")]
pub fn spawn_leap_source(projection: LeapProjection) -> Result<Receiver<HandFrame>, String> {
    let (status_tx, status_rx) = mpsc::sync_channel::<Result<(), String>>(1);
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || LeapHandSource { projection }.track(tx, status_tx));
    match status_rx.recv() {
        Ok(Ok(()))  => Ok(rx),
        Ok(Err(e))  => Err(e),
        Err(_)      => Err("tracking thread exited".to_string()),
    }
}

#[cfg(feature = "leap")]
impl LeapHandSource {
    fn track(self, tx: Sender<HandFrame>, status: mpsc::SyncSender<Result<(), String>>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => { let _ = status.send(Err(format!("{:?}", e))); return; }
        };
        if let Err(e) = connection.open() {
            let _ = status.send(Err(format!("{:?}", e)));
            return;
        }
        let _ = status.send(Ok(()));
        log::info!("LeapMotion connection open");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let hands: HandFrame = frame.hands()
                    .filter_map(|hand| self.observe(&hand))
                    .collect();
                if tx.send(hands).is_err() { return; }
            }
        }
    }

    fn observe(&self, hand: &leaprs::Hand) -> Option<HandObservation> {
        let digits: Vec<_> = hand.digits().collect();
        if digits.len() < 5 { return None; }

        macro_rules! px {
            ($joint:expr) => {{ let v = $joint; self.projection.project(v.x, v.y) }};
        }
        let mut points = [Point::ZERO; sigil_core::hand::KEYPOINT_COUNT];

        let index_base = px!(digits[1].metacarpal().prev_joint());
        let pinky_base = px!(digits[4].metacarpal().prev_joint());
        points[0] = (index_base + pinky_base) * 0.5;

        for (finger, digit) in digits.iter().take(5).enumerate() {
            let base = 1 + 4 * finger;
            points[base]     = px!(digit.proximal().prev_joint());
            points[base + 1] = px!(digit.intermediate().prev_joint());
            points[base + 2] = px!(digit.distal().prev_joint());
            points[base + 3] = px!(digit.distal().next_joint());
        }
        Some(HandObservation::new(points))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
