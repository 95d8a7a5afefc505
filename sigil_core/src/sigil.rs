//! The magic circle and the broken-hand marker.
//!
//! Layers, outermost first (radii as fractions of the smoothed size):
//!
//! ```text
//!   0.725 ─ outer ring
//!   0.70  ─ 12-gon with a {12/4} star inside
//!   0.65  ─ six outer arcs
//!   0.50  ─ two moon arcs
//!   0.45 ┬  24 rune ticks
//!   0.30 ┘
//!   0.06  ─ filled core
//! ```
//!
//! Everything is drawn in a local frame translated to the hand center and
//! rotated by the current rotation angle.  Opacities are fractions of the
//! smoothed alpha.

use std::f32::consts::{PI, TAU};

use crate::canvas::{Canvas, Rgb};
use crate::geometry::Point;
use crate::smoother::AnimationParams;

/// Circles smaller than this are not drawn at all.
pub const MIN_DRAW_SIZE: f32 = 10.0;

const OUTER_ARCS:  usize = 6;
const POLY_SIDES:  usize = 12;
const STAR_STEP:   usize = 4;
const RUNE_TICKS:  usize = 24;

const ARC_COLOR:   Rgb = Rgb(190, 160, 255);
const RING_COLOR:  Rgb = Rgb(220, 200, 255);
const POLY_COLOR:  Rgb = Rgb(255, 190, 230);
const MOON_COLOR:  Rgb = Rgb(220, 235, 255);
const RUNE_COLOR:  Rgb = Rgb(255, 220, 200);
const CORE_COLOR:  Rgb = Rgb(255, 235, 250);

const GLOW_COLOR:    Rgb = Rgb(255, 220, 240);
const GLOW_ALPHA:    f32 = 160.0;
const GLOW_DIAMETER: f32 = 40.0;

/// Vertex `i` of a regular `n`-gon of radius `r` around the origin.
fn vertex(i: usize, n: usize, r: f32) -> Point {
    Point::from_angle(TAU * i as f32 / n as f32) * r
}

/// Draw one magic circle at `center` (surface px).  Returns false when the
/// circle was too small to draw.
pub fn draw_magic_circle(canvas: &mut impl Canvas, params: &AnimationParams, center: Point) -> bool {
    let size = params.size();
    if size < MIN_DRAW_SIZE {
        return false;
    }
    let alpha = params.alpha();

    canvas.push();
    canvas.translate(center.x, center.y);
    canvas.rotate(params.rotation_angle);
    canvas.no_fill();
    canvas.stroke_weight(2.0);

    canvas.stroke(ARC_COLOR, alpha * 0.35);
    let sector = TAU / OUTER_ARCS as f32;
    for i in 0..OUTER_ARCS {
        let start = i as f32 * sector;
        canvas.arc(Point::ZERO, size * 1.3, start, start + sector);
    }

    canvas.stroke(RING_COLOR, alpha * 0.3);
    canvas.ellipse(Point::ZERO, size * 1.45);

    let r = size * 0.7;
    let poly: Vec<Point> = (0..POLY_SIDES).map(|i| vertex(i, POLY_SIDES, r)).collect();
    canvas.stroke(POLY_COLOR, alpha);
    canvas.polygon(&poly);
    for i in 0..POLY_SIDES {
        canvas.line(poly[i], poly[(i + STAR_STEP) % POLY_SIDES]);
    }

    canvas.stroke(MOON_COLOR, alpha * 0.9);
    canvas.arc(Point::ZERO, size, 0.2 * PI, 0.8 * PI);
    canvas.arc(Point::ZERO, size, 1.2 * PI, 1.8 * PI);

    canvas.stroke(RUNE_COLOR, alpha * 0.75);
    for i in 0..RUNE_TICKS {
        let dir = vertex(i, RUNE_TICKS, 1.0);
        canvas.line(dir * (size * 0.3), dir * (size * 0.45));
    }

    canvas.no_stroke();
    canvas.fill(CORE_COLOR, alpha);
    canvas.ellipse(Point::ZERO, size * 0.12);

    canvas.pop();
    true
}

/// Small glowing ring marking a hand whose circle is shattered.
pub fn draw_break_glow(canvas: &mut impl Canvas, center: Point) {
    canvas.push();
    canvas.no_fill();
    canvas.stroke_weight(2.0);
    canvas.stroke(GLOW_COLOR, GLOW_ALPHA);
    canvas.ellipse(center, GLOW_DIAMETER);
    canvas.pop();
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CommandList, DrawCommand};
    use crate::config::SmoothingConfig;

    fn grown() -> AnimationParams {
        let cfg = SmoothingConfig::default();
        let mut p = AnimationParams::new(&cfg);
        for _ in 0..100 { p.track(1.0, 240.0, &cfg); }
        p
    }

    #[test]
    fn full_circle_draws_every_layer() {
        let mut c = CommandList::new();
        assert!(draw_magic_circle(&mut c, &grown(), Point::new(960.0, 540.0)));

        let arcs  = c.count(|d| matches!(d, DrawCommand::Arc { .. }));
        let lines = c.count(|d| matches!(d, DrawCommand::Line(..)));
        let polys = c.count(|d| matches!(d, DrawCommand::Polygon(p) if p.len() == 12));
        let rings = c.count(|d| matches!(d, DrawCommand::Ellipse(..)));
        assert_eq!(arcs, 6 + 2);
        assert_eq!(lines, 12 + 24);
        assert_eq!(polys, 1);
        assert_eq!(rings, 2);
        assert!(c.is_balanced());
        assert!(c.commands.contains(&DrawCommand::Translate(960.0, 540.0)));
    }

    #[test]
    fn tiny_circle_is_skipped() {
        let mut p = grown();
        p.size.value = 9.5;

        let mut c = CommandList::new();
        assert!(!draw_magic_circle(&mut c, &p, Point::ZERO));
        assert!(c.commands.is_empty());
    }

    #[test]
    fn rotation_follows_params() {
        let p = grown();
        let mut c = CommandList::new();
        draw_magic_circle(&mut c, &p, Point::ZERO);
        assert!(c.commands.contains(&DrawCommand::Rotate(p.rotation_angle)));
    }

    #[test]
    fn glow_is_one_ring() {
        let mut c = CommandList::new();
        draw_break_glow(&mut c, Point::new(5.0, 6.0));
        assert_eq!(c.shape_count(), 1);
        assert!(c.commands.contains(&DrawCommand::Ellipse(Point::new(5.0, 6.0), 40.0)));
        assert!(c.commands.contains(&DrawCommand::Stroke(Rgb(255, 220, 240), 160.0)));
    }
}
