//! Command line, application config and the frame loop.
//!
//! `run` wires a hand source, the [`Scene`], a sound bank and the window
//! together and drives them at the window's update rate until the user
//! quits or the hand source goes away.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use sigil_core::audio::SoundBank;
use sigil_core::{FrameMapper, FrameReport, ParamScope, Scene, SceneConfig};
use sigil_midi::{open_midi_output, share, sound_bank};

use crate::error::{AppError, Result};
use crate::raster::Raster;
use crate::tracker::{drain_latest, spawn_hand_source, HandFrame, SimHandSource, SimHands, SimInput};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// Cli
// ════════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "hand_sigil", about = "Hand-tracked magic circle", version)]
pub struct Cli {
    /// Seed for background stars and particles (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give every hand its own circle parameters instead of one shared set
    #[arg(long)]
    pub per_hand: bool,

    /// Window pixels per surface unit (the surface is 1920×1080)
    #[arg(long, default_value_t = 0.5)]
    pub scale: f32,

    /// Run without opening a MIDI port
    #[arg(long)]
    pub mute: bool,

    /// Openness ratio below which a hand counts as a fist
    #[arg(long)]
    pub fist_threshold: Option<f32>,

    /// Milliseconds a fist must be held before the circle breaks
    #[arg(long)]
    pub hold_ms: Option<u64>,

    /// Milliseconds a break lasts if the hand never opens
    #[arg(long)]
    pub break_ms: Option<u64>,

    /// Background stars per frame
    #[arg(long)]
    pub stars: Option<usize>,

    /// Use the keyboard/mouse simulation even when LeapMotion support is built in
    #[arg(long)]
    pub sim: bool,

    /// Stock settings; every tuning flag above is ignored
    #[arg(long)]
    pub quick: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand keypoints come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Keyboard and mouse drive synthetic hands.
    Simulated,
    #[cfg(feature = "leap")]
    Leap,
}

impl Default for SourceKind {
    fn default() -> Self {
        #[cfg(feature = "leap")]
        { SourceKind::Leap }
        #[cfg(not(feature = "leap"))]
        { SourceKind::Simulated }
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub scene:   SceneConfig,
    /// Window pixels per surface unit.
    pub scale:   f32,
    /// Capture frame the hand source reports keypoints in.
    pub video_w: f32,
    pub video_h: f32,
    pub seed:    Option<u64>,
    pub audio:   bool,
    pub source:  SourceKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scene:   SceneConfig::default(),
            scale:   0.5,
            video_w: 640.0,
            video_h: 480.0,
            seed:    None,
            audio:   true,
            source:  SourceKind::default(),
        }
    }
}

const SCALE_RANGE: (f32, f32) = (0.1, 2.0);

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut cfg = AppConfig { audio: !cli.mute, ..AppConfig::default() };
        if cli.sim {
            cfg.source = SourceKind::Simulated;
        }
        if cli.quick {
            return Ok(cfg);
        }

        if !(SCALE_RANGE.0..=SCALE_RANGE.1).contains(&cli.scale) {
            return Err(AppError::Config(format!(
                "--scale {} outside {}–{}", cli.scale, SCALE_RANGE.0, SCALE_RANGE.1,
            )));
        }
        cfg.scale = cli.scale;
        cfg.seed = cli.seed;

        let scene = &mut cfg.scene;
        if cli.per_hand {
            scene.scope = ParamScope::PerHand;
        }
        if let Some(t) = cli.fist_threshold {
            if !(t > 0.0 && t < 1.0) {
                return Err(AppError::Config(format!("--fist-threshold {} must be between 0 and 1", t)));
            }
            scene.fist.threshold = t;
        }
        if let Some(ms) = cli.hold_ms {
            scene.fist.hold = Duration::from_millis(ms);
        }
        if let Some(ms) = cli.break_ms {
            if ms == 0 {
                return Err(AppError::Config("--break-ms must be positive".into()));
            }
            scene.fist.break_duration = Duration::from_millis(ms);
        }
        if let Some(n) = cli.stars {
            scene.star_count = n;
        }
        Ok(cfg)
    }

    /// Window size in pixels.
    pub fn window_size(&self) -> (usize, usize) {
        (
            (self.scene.surface_w * self.scale).round().max(1.0) as usize,
            (self.scene.surface_h * self.scale).round().max(1.0) as usize,
        )
    }

    pub fn mapper(&self) -> FrameMapper {
        FrameMapper::new(self.video_w, self.video_h, self.scene.surface_w, self.scene.surface_h)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session stats (status line)
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames:     u64,
    pub breaks:     usize,
    pub recoveries: usize,
}

impl SessionStats {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.breaks += report.breaks();
        self.recoveries += report.recoveries();
    }

    pub fn status(&self, report: &FrameReport, audio: bool) -> String {
        let broken = report.hands.iter().filter(|h| h.broken).count();
        format!(
            "HANDS {}  BROKEN {}  BREAKS {}  SHARDS {}  SPARKLES {}  SOUND {}",
            report.hands.len(),
            broken,
            self.breaks,
            report.shards,
            report.sparkles,
            if audio { "ON" } else { "OFF" },
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run
// ════════════════════════════════════════════════════════════════════════════

pub fn run(cfg: AppConfig) -> Result<()> {
    let (width, height) = cfg.window_size();
    let (sim_tx, frames) = open_hand_source(&cfg)?;
    let mut vis = Visualizer::new(width, height, cfg.video_w, cfg.video_h, sim_tx)?;
    let mut raster = Raster::new(width, height, cfg.scale);

    let rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_os_rng(),
    };
    let mut scene = Scene::new(cfg.scene.clone(), cfg.mapper(), rng);

    let mut sounds = if cfg.audio {
        sound_bank(share(open_midi_output("hand_sigil")))
    } else {
        info!("audio muted");
        SoundBank::silent()
    };
    scene.start_audio(&mut sounds);

    let result = frame_loop(&mut vis, &mut raster, &mut scene, &mut sounds, &frames, cfg.audio);
    sounds.stop_all();

    let stats = result?;
    info!("{} frames, {} breaks, {} recoveries", stats.frames, stats.breaks, stats.recoveries);
    Ok(())
}

fn frame_loop(
    vis:    &mut Visualizer,
    raster: &mut Raster,
    scene:  &mut Scene<StdRng>,
    sounds: &mut SoundBank,
    frames: &Receiver<HandFrame>,
    audio:  bool,
) -> Result<SessionStats> {
    let start = Instant::now();
    let mut hands = HandFrame::new();
    let mut stats = SessionStats::default();

    while vis.is_open() {
        if !vis.poll_input() { break; }

        match drain_latest(frames) {
            Ok(Some(latest)) => hands = latest,
            Ok(None)         => {}
            Err(_) => {
                warn!("hand source disconnected");
                return Err(AppError::TrackerLost);
            }
        }

        raster.begin_frame();
        let report = scene.tick(start.elapsed(), &hands, raster, sounds);
        stats.record(&report);
        vis.present(raster, &stats.status(&report, audio))?;
    }
    Ok(stats)
}

/// Start the configured hand source.  The sender is returned only for the
/// simulation, which the window feeds with input.
fn open_hand_source(cfg: &AppConfig) -> Result<(Option<Sender<SimInput>>, Receiver<HandFrame>)> {
    match cfg.source {
        SourceKind::Simulated => {
            info!("hand source: keyboard/mouse simulation");
            let (tx, rx) = mpsc::channel();
            let hands = SimHands::new(cfg.video_w, cfg.video_h);
            Ok((Some(tx), spawn_hand_source(SimHandSource { rx, hands })))
        }
        #[cfg(feature = "leap")]
        SourceKind::Leap => {
            use crate::tracker::{spawn_leap_source, LeapProjection};
            info!("hand source: LeapMotion");
            let projection = LeapProjection { video_w: cfg.video_w, video_h: cfg.video_h, ..LeapProjection::default() };
            let frames = spawn_leap_source(projection).map_err(AppError::LeapUnavailable)?;
            Ok((None, frames))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use sigil_core::canvas::CommandList;
    use sigil_core::hand::HandPose;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("hand_sigil").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_stock_scene() {
        let cfg = AppConfig::from_cli(&parse(&[])).unwrap();
        assert_eq!(cfg.scene, SceneConfig::default());
        assert_eq!(cfg.window_size(), (960, 540));
        assert!(cfg.audio);
    }

    #[test]
    fn tuning_flags_reach_scene() {
        let cfg = AppConfig::from_cli(&parse(&[
            "--per-hand", "--fist-threshold", "0.6", "--hold-ms", "80", "--break-ms", "1500",
            "--seed", "7", "--mute", "--scale", "0.25",
        ])).unwrap();
        assert_eq!(cfg.scene.scope, ParamScope::PerHand);
        assert_eq!(cfg.scene.fist.threshold, 0.6);
        assert_eq!(cfg.scene.fist.hold, Duration::from_millis(80));
        assert_eq!(cfg.scene.fist.break_duration, Duration::from_millis(1500));
        assert_eq!(cfg.seed, Some(7));
        assert!(!cfg.audio);
        assert_eq!(cfg.window_size(), (480, 270));
    }

    #[test]
    fn bad_values_are_rejected() {
        for args in [
            &["--fist-threshold", "1.2"][..],
            &["--break-ms", "0"][..],
            &["--scale", "8"][..],
        ] {
            assert!(matches!(AppConfig::from_cli(&parse(args)), Err(AppError::Config(_))), "{:?}", args);
        }
    }

    #[test]
    fn quick_ignores_tuning_but_keeps_mute() {
        let cfg = AppConfig::from_cli(&parse(&["--quick", "--per-hand", "--scale", "8", "--mute"])).unwrap();
        assert_eq!(cfg.scene.scope, ParamScope::Shared);
        assert_eq!(cfg.scale, 0.5);
        assert!(!cfg.audio);
    }

    #[test]
    fn stats_count_breaks_across_frames() {
        let cfg = AppConfig { seed: Some(1), ..AppConfig::default() };
        let mut scene = Scene::new(cfg.scene.clone(), cfg.mapper(), StdRng::seed_from_u64(1));
        let mut canvas = CommandList::new();
        let mut sounds = SoundBank::silent();
        let fist = HandPose { curl: 1.0, ..HandPose::default() }.synthesize();
        let mut stats = SessionStats::default();

        for ms in [0u64, 20, 40, 60, 80] {
            canvas.clear();
            let report = scene.tick(Duration::from_millis(ms), &[fist.clone()], &mut canvas, &mut sounds);
            stats.record(&report);
        }
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.breaks, 1);

        canvas.clear();
        let report = scene.tick(Duration::from_millis(100), &[fist], &mut canvas, &mut sounds);
        let status = stats.status(&report, false);
        assert!(status.starts_with("HANDS 1  BROKEN 1  BREAKS 1"), "{}", status);
        assert!(status.ends_with("SOUND OFF"));
    }
}
