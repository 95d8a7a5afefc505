//! # sigil_midi
//!
//! Plays the scene's four sounds as General MIDI voices on a live output
//! port, one channel per sound:
//!
//! | Sound | Channel | Instrument | Kind |
//! |---|---|---|---|
//! | circle  | 0 | Pad 1 (New Age) | sustained note |
//! | ambient | 1 | Pad 2 (Warm)    | sustained note |
//! | wind    | 2 | Seashore        | sustained note |
//! | shatter | 3 | Tinkle Bell     | one-shot |
//!
//! Sound controls map onto channel messages:
//!
//! * **loop** → Note On, held until stopped
//! * **play** → Note On, counted as playing for a nominal duration
//! * **volume** → Controller 7 (channel volume)
//! * **rate** → Pitch Bend, ±2 semitones full scale
//!
//! When no port can be opened every voice reports itself not ready, so the
//! scene skips it and runs silently.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use sigil_core::audio::{Sound, SoundBank, SoundSlot};

// ════════════════════════════════════════════════════════════════════════════
// General MIDI instruments used by the scene (Program 0–127)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Instrument {
    Pad1NewAge = 88,
    Pad2Warm   = 89,
    TinkleBell = 112,
    Seashore   = 122,
}

impl Instrument {
    /// Raw MIDI program number (0–127).
    pub fn program(self) -> u8 { self as u8 }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
    fn control_change(&mut self, channel: u8, controller: u8, value: u8);
    /// 14-bit bend, 8192 = centre.
    fn pitch_bend(&mut self, channel: u8, value: u16);
    /// False for the null backend.
    fn is_connected(&self) -> bool { true }
}

/// Raw channel-voice messages, shared by every backend that speaks bytes.
pub mod message {
    pub fn program_change(ch: u8, program: u8) -> [u8; 2] {
        [0xC0 | (ch & 0x0F), program & 0x7F]
    }
    pub fn note_on(ch: u8, note: u8, velocity: u8) -> [u8; 3] {
        [0x90 | (ch & 0x0F), note & 0x7F, velocity & 0x7F]
    }
    pub fn note_off(ch: u8, note: u8) -> [u8; 3] {
        [0x80 | (ch & 0x0F), note & 0x7F, 0]
    }
    pub fn control_change(ch: u8, controller: u8, value: u8) -> [u8; 3] {
        [0xB0 | (ch & 0x0F), controller & 0x7F, value & 0x7F]
    }
    pub fn pitch_bend(ch: u8, value: u16) -> [u8; 3] {
        let v = value.min(0x3FFF);
        [0xE0 | (ch & 0x0F), (v & 0x7F) as u8, (v >> 7) as u8]
    }
}

// ── midir backend ─────────────────────────────────────────────────────────

pub struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidirOut {
    fn send(&mut self, bytes: &[u8]) {
        if let Err(e) = self.conn.send(bytes) {
            log::trace!("MIDI send failed: {}", e);
        }
    }
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        self.send(&message::program_change(channel, program));
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.send(&message::note_on(channel, note, velocity));
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        self.send(&message::note_off(channel, note));
    }
    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        self.send(&message::control_change(channel, controller, value));
    }
    fn pitch_bend(&mut self, channel: u8, value: u16) {
        self.send(&message::pitch_bend(channel, value));
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullOut;

impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)            {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)           {}
    fn note_off(&mut self, _ch: u8, _n: u8)                  {}
    fn control_change(&mut self, _ch: u8, _c: u8, _v: u8)    {}
    fn pitch_bend(&mut self, _ch: u8, _v: u16)               {}
    fn is_connected(&self) -> bool { false }
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick the best one
// ════════════════════════════════════════════════════════════════════════════

/// Port-name fragments of common software synthesisers, preferred over
/// whatever port happens to come first.
const SOFTSYNTH_HINTS: [&str; 5] = ["fluid", "timidity", "microsoft", "gm", "synth"];

fn looks_like_softsynth(name: &str) -> bool {
    let name = name.to_lowercase();
    SOFTSYNTH_HINTS.iter().any(|h| name.contains(h))
}

/// Try to open a MIDI output port, preferring a softsynth.  Falls back to
/// [`NullOut`] with a warning if none can be used.
pub fn open_midi_output(client: &str) -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new(client) {
        Ok(m)  => m,
        Err(e) => {
            log::warn!("MIDI init error: {}; sound disabled", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        log::warn!("no MIDI output ports found; sound disabled");
        log::info!("start a synthesiser such as `fluidsynth` or `timidity -iA` to hear the circle");
        return Box::new(NullOut);
    }

    let port_idx = ports.iter()
        .position(|p| midi_out.port_name(p).is_ok_and(|n| looks_like_softsynth(&n)))
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    log::info!("opening MIDI port: {}", name);

    match midi_out.connect(port, "sigil-voices") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            log::warn!("failed to connect to {}: {}; sound disabled", name, e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MidiVoice — one Sound on one channel
// ════════════════════════════════════════════════════════════════════════════

/// An output shared by every voice of a bank.
pub type SharedOut = Rc<RefCell<Box<dyn MidiOut>>>;

pub fn share(out: Box<dyn MidiOut>) -> SharedOut {
    Rc::new(RefCell::new(out))
}

/// CC number for channel volume.
const CC_VOLUME: u8 = 7;
const BEND_CENTRE: f32 = 8192.0;
/// Semitones at full pitch-bend deflection (GM default range).
const BEND_RANGE: f32 = 2.0;

/// 0.0–1.0 → 0–127.
pub fn volume_to_cc(volume: f32) -> u8 {
    (volume.clamp(0.0, 1.0) * 127.0).round() as u8
}

/// Playback-rate multiplier → 14-bit pitch bend.  A rate of 2.0 would be an
/// octave up; anything past the bend range is pinned at full deflection.
pub fn rate_to_bend(rate: f32) -> u16 {
    if rate.is_nan() || rate <= 0.0 {
        return 0;
    }
    let semitones = 12.0 * rate.log2();
    let bend = BEND_CENTRE + semitones / BEND_RANGE * 8191.0;
    bend.round().clamp(0.0, 16383.0) as u16
}

/// How a voice behaves when started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Envelope {
    /// Held until stopped.
    Sustained,
    /// Counted as playing for this long after each start.
    OneShot(Duration),
}

pub struct MidiVoice {
    out:        SharedOut,
    channel:    u8,
    instrument: Instrument,
    note:       u8,
    velocity:   u8,
    envelope:   Envelope,
    /// Start of the note currently sounding.
    started:    Option<Instant>,
    prepared:   bool,
    last_cc:    Option<u8>,
    last_bend:  Option<u16>,
}

impl MidiVoice {
    pub fn new(out: SharedOut, channel: u8, instrument: Instrument, note: u8, envelope: Envelope) -> Self {
        MidiVoice {
            out,
            channel,
            instrument,
            note,
            velocity: 100,
            envelope,
            started: None,
            prepared: false,
            last_cc: None,
            last_bend: None,
        }
    }

    pub fn velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.min(127);
        self
    }

    fn start(&mut self) {
        let mut out = self.out.borrow_mut();
        if !self.prepared {
            out.program_change(self.channel, self.instrument.program());
            self.prepared = true;
        }
        if self.started.is_some() {
            out.note_off(self.channel, self.note);
        }
        out.note_on(self.channel, self.note, self.velocity);
        self.started = Some(Instant::now());
    }
}

impl Sound for MidiVoice {
    fn is_ready(&self) -> bool {
        self.out.borrow().is_connected()
    }

    fn play(&mut self) {
        self.start();
    }

    fn start_loop(&mut self) {
        self.start();
    }

    fn stop(&mut self) {
        if self.started.take().is_some() {
            self.out.borrow_mut().note_off(self.channel, self.note);
        }
    }

    fn is_playing(&self) -> bool {
        match (self.started, self.envelope) {
            (None, _)                       => false,
            (Some(_), Envelope::Sustained)  => true,
            (Some(t), Envelope::OneShot(d)) => t.elapsed() < d,
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let cc = volume_to_cc(volume);
        if self.last_cc != Some(cc) {
            self.out.borrow_mut().control_change(self.channel, CC_VOLUME, cc);
            self.last_cc = Some(cc);
        }
    }

    fn set_rate(&mut self, rate: f32) {
        let bend = rate_to_bend(rate);
        if self.last_bend != Some(bend) {
            self.out.borrow_mut().pitch_bend(self.channel, bend);
            self.last_bend = Some(bend);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// sound_bank — the scene's four voices
// ════════════════════════════════════════════════════════════════════════════

/// How long the shatter chime counts as playing.
pub const SHATTER_LENGTH: Duration = Duration::from_millis(1200);

/// Build the scene's sound bank on top of one output.
pub fn sound_bank(out: SharedOut) -> SoundBank {
    let voice = |ch, inst, note, env| MidiVoice::new(Rc::clone(&out), ch, inst, note, env);
    let slot = |v: MidiVoice| SoundSlot::new(Box::new(v));
    SoundBank {
        circle:  slot(voice(0, Instrument::Pad1NewAge, 57, Envelope::Sustained).velocity(90)),
        ambient: slot(voice(1, Instrument::Pad2Warm,   45, Envelope::Sustained).velocity(70)),
        wind:    slot(voice(2, Instrument::Seashore,   60, Envelope::Sustained)),
        shatter: slot(voice(3, Instrument::TinkleBell, 84, Envelope::OneShot(SHATTER_LENGTH)).velocity(120)),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
