//! Sound handles and the audio reactivity mapping.
//!
//! The core never talks to an audio device.  It drives a [`SoundBank`] of
//! four [`Sound`] handles (circle loop, background loop, wind loop, shatter
//! one-shot) through [`SoundSlot`], which checks readiness before every call
//! so a missing or not-yet-loaded sound is silently skipped.

use crate::config::AudioConfig;
use crate::geometry::{lerp, Point};

// ════════════════════════════════════════════════════════════════════════════
// Sound — the playback interface
// ════════════════════════════════════════════════════════════════════════════

/// A single playable sound asset.
pub trait Sound {
    /// False while the asset is unavailable; every other call is skipped.
    fn is_ready(&self) -> bool { true }
    /// Play once from the start.
    fn play(&mut self);
    /// Play repeatedly until stopped.
    fn start_loop(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
    /// 0.0 – 1.0.
    fn set_volume(&mut self, volume: f32);
    /// Playback speed multiplier, 1.0 = normal.
    fn set_rate(&mut self, rate: f32);
}

// ════════════════════════════════════════════════════════════════════════════
// SoundSlot — readiness-guarded handle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct SoundSlot {
    sound: Option<Box<dyn Sound>>,
}

impl SoundSlot {
    pub fn new(sound: Box<dyn Sound>) -> Self {
        SoundSlot { sound: Some(sound) }
    }

    pub fn empty() -> Self {
        SoundSlot { sound: None }
    }

    fn ready(&mut self) -> Option<&mut Box<dyn Sound>> {
        self.sound.as_mut().filter(|s| s.is_ready())
    }

    pub fn is_playing(&self) -> bool {
        self.sound.as_ref().is_some_and(|s| s.is_ready() && s.is_playing())
    }

    /// Start a one-shot unless it is already sounding.
    pub fn trigger(&mut self) {
        if let Some(s) = self.ready() {
            if !s.is_playing() { s.play(); }
        }
    }

    /// Start looping unless already playing.
    pub fn ensure_looping(&mut self) {
        if let Some(s) = self.ready() {
            if !s.is_playing() { s.start_loop(); }
        }
    }

    /// Stop unconditionally.  A one-shot that has stopped counting as
    /// playing may still hold a note that needs releasing.
    pub fn stop(&mut self) {
        if let Some(s) = self.ready() { s.stop(); }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if let Some(s) = self.ready() { s.set_volume(volume.clamp(0.0, 1.0)); }
    }

    pub fn set_rate(&mut self, rate: f32) {
        if let Some(s) = self.ready() { s.set_rate(rate); }
    }
}

/// Every sound the scene drives.
#[derive(Default)]
pub struct SoundBank {
    /// Looping hum of the magic circle.
    pub circle:  SoundSlot,
    /// Background music, started once.
    pub ambient: SoundSlot,
    /// Looping wind that follows fingertip speed.
    pub wind:    SoundSlot,
    /// One-shot played when a circle breaks.
    pub shatter: SoundSlot,
}

impl SoundBank {
    /// A bank with no sounds at all; every call is a no-op.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Start the background loop at its configured volume.
    pub fn start_ambient(&mut self, cfg: &AudioConfig) {
        self.ambient.ensure_looping();
        self.ambient.set_volume(cfg.ambient_volume);
    }

    pub fn stop_all(&mut self) {
        self.circle.stop();
        self.ambient.stop();
        self.wind.stop();
        self.shatter.stop();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Circle loop — strongest hand drives it
// ════════════════════════════════════════════════════════════════════════════

/// The loudest circle seen while walking this frame's hands.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameLoudness {
    pub any_active:         bool,
    pub strongest_alpha:    f32,
    /// Rotation velocity of the hand that set `strongest_alpha`.
    pub strongest_velocity: f32,
}

impl FrameLoudness {
    pub fn observe(&mut self, alpha: f32, velocity: f32) {
        self.any_active = true;
        if alpha > self.strongest_alpha {
            self.strongest_alpha = alpha;
            self.strongest_velocity = velocity;
        }
    }

    /// Start, tune or stop the circle loop.
    pub fn apply(&self, cfg: &AudioConfig, sounds: &mut SoundBank) {
        if self.any_active && self.strongest_alpha > cfg.circle_alpha_gate {
            sounds.circle.ensure_looping();
            sounds.circle.set_rate(cfg.circle_rate.apply(self.strongest_velocity));
            sounds.circle.set_volume(cfg.circle_volume.apply(self.strongest_alpha));
        } else {
            sounds.circle.stop();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wind — fingertip speed drives it
// ════════════════════════════════════════════════════════════════════════════

/// Remembers the last index-fingertip position to measure speed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionTrail {
    last_tip: Option<Point>,
}

impl MotionTrail {
    /// Record `tip` and return the distance from the previous one.
    pub fn speed(&mut self, tip: Point) -> Option<f32> {
        let speed = self.last_tip.map(|last| last.distance(tip));
        self.last_tip = Some(tip);
        speed
    }
}

/// Fade level of the wind loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindTracker {
    pub fade: f32,
}

impl WindTracker {
    /// React to a fingertip moving `speed` px this frame.
    pub fn gust(&mut self, speed: f32, cfg: &AudioConfig, sounds: &mut SoundBank) {
        if speed > cfg.wind_speed_gate {
            sounds.wind.ensure_looping();
            self.fade = cfg.wind_fade.apply(speed);
            sounds.wind.set_rate(cfg.wind_rate.apply(speed));
        }
    }

    /// End-of-frame decay toward silence; pushes the level to the sound.
    pub fn settle(&mut self, cfg: &AudioConfig, sounds: &mut SoundBank) {
        self.fade = lerp(self.fade, 0.0, cfg.wind_decay);
        sounds.wind.set_volume(self.fade);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MemorySound — in-process stand-in
// ════════════════════════════════════════════════════════════════════════════

/// A [`Sound`] that only records its state, for tests and headless
/// harnesses that want to inspect what the scene asked for.
#[derive(Clone, Debug, PartialEq)]
pub struct MemorySound {
    pub ready:   bool,
    pub playing: bool,
    pub looping: bool,
    pub volume:  f32,
    pub rate:    f32,
    /// Number of `play`/`start_loop` calls.
    pub starts:  u32,
    pub stops:   u32,
}

impl Default for MemorySound {
    fn default() -> Self {
        MemorySound { ready: true, playing: false, looping: false, volume: 1.0, rate: 1.0, starts: 0, stops: 0 }
    }
}

impl Sound for MemorySound {
    fn is_ready(&self) -> bool { self.ready }
    fn play(&mut self) {
        self.playing = true;
        self.looping = false;
        self.starts += 1;
    }
    fn start_loop(&mut self) {
        self.playing = true;
        self.looping = true;
        self.starts += 1;
    }
    fn stop(&mut self) {
        self.playing = false;
        self.looping = false;
        self.stops += 1;
    }
    fn is_playing(&self) -> bool { self.playing }
    fn set_volume(&mut self, volume: f32) { self.volume = volume; }
    fn set_rate(&mut self, rate: f32) { self.rate = rate; }
}

/// Shared-state handle so tests can observe a sound after handing it to a
/// [`SoundBank`].
#[derive(Clone, Debug, Default)]
pub struct SoundProbe(std::rc::Rc<std::cell::RefCell<MemorySound>>);

impl SoundProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unready() -> Self {
        let probe = Self::default();
        probe.0.borrow_mut().ready = false;
        probe
    }

    pub fn snapshot(&self) -> MemorySound {
        self.0.borrow().clone()
    }

    pub fn slot(&self) -> SoundSlot {
        SoundSlot::new(Box::new(self.clone()))
    }
}

impl Sound for SoundProbe {
    fn is_ready(&self) -> bool { self.0.borrow().is_ready() }
    fn play(&mut self) { self.0.borrow_mut().play() }
    fn start_loop(&mut self) { self.0.borrow_mut().start_loop() }
    fn stop(&mut self) { self.0.borrow_mut().stop() }
    fn is_playing(&self) -> bool { self.0.borrow().is_playing() }
    fn set_volume(&mut self, volume: f32) { self.0.borrow_mut().set_volume(volume) }
    fn set_rate(&mut self, rate: f32) { self.0.borrow_mut().set_rate(rate) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
