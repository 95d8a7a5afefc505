//! The `minifb` window: presents the raster and turns keyboard and mouse
//! into [`SimInput`] for the simulated hand source.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  status line (hands, breaks, shards, sound)              │
//! │                                                          │
//! │                    raster (scene)                        │
//! │                                                          │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use sigil_core::geometry::Point;

use crate::error::Result;
use crate::raster::Raster;
use crate::tracker::{SimControls, SimInput};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const TITLE:        &str  = "Hand Sigil";
/// HUD glyph magnification over the 3×5 font.
const GLYPH_SCALE:  usize = 2;
const HUD_MARGIN:   usize = 10;
const STATUS_COLOR: u32   = 0xFFEEDDFF;
const LEGEND_COLOR: u32   = 0xFF8877AA;
const LEGEND: &str =
    "MOUSE=move  SPACE=fist  WHEEL/UP/DOWN=spread  W/S=near/far  H=second hand  K=second fist  Q=quit";

/// Spread change per arrow-key frame and per wheel notch.
const SPREAD_STEP:  f32 = 0.03;
const WHEEL_STEP:   f32 = 0.05;
/// Span change per W/S frame, capture px.
const SPAN_STEP:    f32 = 4.0;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    /// Simulation input channel; `None` when a real tracker drives the hands.
    sim_tx:  Option<Sender<SimInput>>,
    video_w: f32,
    video_h: f32,
}

impl Visualizer {
    pub fn new(
        width:   usize,
        height:  usize,
        video_w: f32,
        video_h: f32,
        sim_tx:  Option<Sender<SimInput>>,
    ) -> Result<Self> {
        let mut window = Window::new(
            TITLE,
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, sim_tx, video_w, video_h })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse; returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if one_shot(Key::Q) || one_shot(Key::Escape) {
            return false;
        }

        let Some(tx) = &self.sim_tx else { return true; };

        if one_shot(Key::H) {
            let _ = tx.send(SimInput::ToggleSecondHand);
        }

        let down = |k: Key| self.window.is_key_down(k);
        let (w, h) = self.window.get_size();
        let pointer = self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| window_to_video(x, y, w, h, self.video_w, self.video_h))
            .unwrap_or(Point::new(self.video_w / 2.0, self.video_h / 2.0));

        let wheel = self.window.get_scroll_wheel().map(|(_, dy)| dy.signum() * WHEEL_STEP).unwrap_or(0.0);
        let mut spread_delta = wheel;
        if down(Key::Up)   { spread_delta += SPREAD_STEP; }
        if down(Key::Down) { spread_delta -= SPREAD_STEP; }

        let mut span_delta = 0.0;
        if down(Key::W) { span_delta += SPAN_STEP; }
        if down(Key::S) { span_delta -= SPAN_STEP; }

        let controls = SimControls {
            pointer,
            fist:        down(Key::Space) || self.window.get_mouse_down(MouseButton::Left),
            second_fist: down(Key::K),
            spread_delta,
            span_delta,
        };
        let _ = tx.send(SimInput::Frame(controls));
        true
    }

    /// Overlay the HUD on the raster and push it to the window.
    pub fn present(&mut self, raster: &mut Raster, status: &str) -> Result<()> {
        let (w, h) = (raster.width(), raster.height());
        let legend_y = h.saturating_sub(HUD_MARGIN + 5 * GLYPH_SCALE);
        {
            let buf = raster.buffer_mut();
            draw_label(buf, w, status, HUD_MARGIN, HUD_MARGIN, STATUS_COLOR);
            if self.sim_tx.is_some() {
                draw_label(buf, w, LEGEND, HUD_MARGIN, legend_y, LEGEND_COLOR);
            }
        }
        self.window.update_with_buffer(raster.buffer(), w, h)?;
        Ok(())
    }
}

/// Window pixel → capture coordinates.
fn window_to_video(x: f32, y: f32, win_w: usize, win_h: usize, video_w: f32, video_h: f32) -> Point {
    Point::new(
        x / win_w.max(1) as f32 * video_w,
        y / win_h.max(1) as f32 * video_h,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// HUD text
// ────────────────────────────────────────────────────────────────────────────

/// Draw `text` with the 3×5 font, magnified by [`GLYPH_SCALE`], clipped to
/// the buffer.
fn draw_label(buf: &mut [u32], width: usize, text: &str, x: usize, y: usize, color: u32) {
    let height = buf.len() / width.max(1);
    let advance = 4 * GLYPH_SCALE;
    let mut cx = x;
    for ch in text.chars() {
        if cx + advance > width { break; }
        for (row, &bits) in char_glyph(ch).iter().enumerate() {
            for col in 0..3usize {
                if bits & (1 << (2 - col)) == 0 { continue; }
                for dy in 0..GLYPH_SCALE {
                    for dx in 0..GLYPH_SCALE {
                        let px = cx + col * GLYPH_SCALE + dx;
                        let py = y + row * GLYPH_SCALE + dy;
                        if px < width && py < height {
                            buf[py * width + px] = color;
                        }
                    }
                }
            }
        }
        cx += advance;
    }
}

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_corners_map_to_capture_corners() {
        assert_eq!(window_to_video(0.0, 0.0, 960, 540, 640.0, 480.0), Point::ZERO);
        assert_eq!(window_to_video(960.0, 540.0, 960, 540, 640.0, 480.0), Point::new(640.0, 480.0));
        assert_eq!(window_to_video(480.0, 270.0, 960, 540, 640.0, 480.0), Point::new(320.0, 240.0));
    }

    #[test]
    fn label_is_magnified_and_clipped() {
        let (w, h) = (20, 12);
        let mut buf = vec![0u32; w * h];
        draw_label(&mut buf, w, "1", 0, 0, 0xFFFF_FFFF);
        // Top row of '1' is 0b010: the middle column, two pixels wide.
        assert_eq!(&buf[0..6], &[0, 0, 0xFFFF_FFFF, 0xFFFF_FFFF, 0, 0]);
        assert_eq!(buf[w + 2], 0xFFFF_FFFF);

        let mut buf = vec![0u32; w * h];
        draw_label(&mut buf, w, "8888", 0, 0, 1);
        // Only two glyphs fit in 20 px; nothing past x = 16 is touched.
        assert!((0..h).all(|y| buf[y * w + 18] == 0 && buf[y * w + 19] == 0));
    }

    #[test]
    fn lowercase_shares_uppercase_glyphs() {
        assert_eq!(char_glyph('q'), char_glyph('Q'));
        assert_ne!(char_glyph('Q'), char_glyph('?'));
    }
}
