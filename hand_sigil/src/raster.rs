//! Software rasteriser behind the core's [`Canvas`] trait.
//!
//! The scene draws on a fixed logical surface (1920×1080 by default); the
//! raster owns a smaller or larger ARGB framebuffer and scales every
//! coordinate by `scale` on the way in.  Shapes are alpha-blended over
//! whatever is already in the buffer.
//!
//! Only translation, rotation and the base scale are supported, which is
//! all the scene uses, so a transform is just an origin and an angle.

use sigil_core::canvas::{Canvas, Rgb};
use sigil_core::geometry::Point;

/// Arc segments per full turn.
const ARC_STEPS: f32 = 96.0;

// ════════════════════════════════════════════════════════════════════════════
// State
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transform {
    /// Local origin in surface coordinates.
    origin: Point,
    angle:  f32,
}

impl Transform {
    const IDENTITY: Transform = Transform { origin: Point::ZERO, angle: 0.0 };

    fn rotate(&self, p: Point) -> Point {
        let (s, c) = self.angle.sin_cos();
        Point::new(p.x * c - p.y * s, p.x * s + p.y * c)
    }

    fn apply(&self, p: Point) -> Point {
        self.origin + self.rotate(p)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Style {
    stroke: Option<(Rgb, f32)>,
    fill:   Option<(Rgb, f32)>,
    weight: f32,
}

impl Default for Style {
    fn default() -> Self {
        Style { stroke: Some((Rgb(0, 0, 0), 255.0)), fill: Some((Rgb(255, 255, 255), 255.0)), weight: 1.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Raster
// ════════════════════════════════════════════════════════════════════════════

pub struct Raster {
    width:  usize,
    height: usize,
    /// Framebuffer pixels per surface unit.
    scale:  f32,
    buf:    Vec<u32>,
    transform: Transform,
    style:     Style,
    stack:     Vec<(Transform, Style)>,
}

impl Raster {
    pub fn new(width: usize, height: usize, scale: f32) -> Self {
        Raster {
            width,
            height,
            scale,
            buf: vec![0xFF00_0000; width * height],
            transform: Transform::IDENTITY,
            style:     Style::default(),
            stack:     Vec::new(),
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn buffer(&self) -> &[u32] { &self.buf }
    pub fn buffer_mut(&mut self) -> &mut [u32] { &mut self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    /// Reset transform and style state for a new frame.  Pixels are kept;
    /// the scene paints a full background anyway.
    pub fn begin_frame(&mut self) {
        self.transform = Transform::IDENTITY;
        self.style = Style::default();
        self.stack.clear();
    }

    /// Surface point → framebuffer pixel space.
    fn device(&self, p: Point) -> Point {
        self.transform.apply(p) * self.scale
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.buf[idx] = blend(self.buf[idx], color, alpha / 255.0);
    }

    /// Blend every pixel whose centre satisfies `inside`, over the bounding
    /// box `[x0, x1] × [y0, y1]` in device space.
    fn cover(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32,
             inside: impl Fn(Point) -> bool) {
        if alpha <= 0.0 { return; }
        let xa = x0.floor().max(0.0) as i64;
        let ya = y0.floor().max(0.0) as i64;
        let xb = (x1.ceil() as i64).min(self.width as i64 - 1);
        let yb = (y1.ceil() as i64).min(self.height as i64 - 1);
        for y in ya..=yb {
            for x in xa..=xb {
                if inside(Point::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.blend_pixel(x, y, color, alpha);
                }
            }
        }
    }

    /// Stroke half-width in device pixels; never thinner than one pixel.
    fn half_width(&self) -> f32 {
        (self.style.weight * self.scale).max(1.0) / 2.0
    }

    fn stroke_segment(&mut self, a: Point, b: Point) {
        let Some((color, alpha)) = self.style.stroke else { return };
        let (a, b) = (self.device(a), self.device(b));
        let r = self.half_width();
        self.cover(
            a.x.min(b.x) - r, a.y.min(b.y) - r,
            a.x.max(b.x) + r, a.y.max(b.y) + r,
            color, alpha,
            |p| segment_distance(p, a, b) <= r,
        );
    }
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 == 0.0 { return p.distance(a); }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Even-odd point-in-polygon test.
fn contains(poly: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = poly.len().wrapping_sub(1);
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Blend `color` over an opaque ARGB pixel with opacity `t` (0–1).
fn blend(dst: u32, color: Rgb, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |d: u32, s: u8| (d as f32 * (1.0 - t) + s as f32 * t).round() as u32;
    let r = mix((dst >> 16) & 0xFF, color.0);
    let g = mix((dst >> 8) & 0xFF, color.1);
    let b = mix(dst & 0xFF, color.2);
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

impl Canvas for Raster {
    fn push(&mut self) {
        self.stack.push((self.transform, self.style));
    }

    fn pop(&mut self) {
        if let Some((t, s)) = self.stack.pop() {
            self.transform = t;
            self.style = s;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.origin = self.transform.apply(Point::new(dx, dy));
    }

    fn rotate(&mut self, angle: f32) {
        self.transform.angle += angle;
    }

    fn stroke(&mut self, color: Rgb, alpha: f32) { self.style.stroke = Some((color, alpha)); }
    fn no_stroke(&mut self)                      { self.style.stroke = None; }
    fn stroke_weight(&mut self, weight: f32)     { self.style.weight = weight; }
    fn fill(&mut self, color: Rgb, alpha: f32)   { self.style.fill = Some((color, alpha)); }
    fn no_fill(&mut self)                        { self.style.fill = None; }

    fn line(&mut self, a: Point, b: Point) {
        self.stroke_segment(a, b);
    }

    fn ellipse(&mut self, center: Point, diameter: f32) {
        let c = self.device(center);
        let r = diameter * self.scale / 2.0;

        if let Some((color, alpha)) = self.style.fill {
            // Sub-pixel dots still light their own pixel.
            let rr = r.max(0.5);
            self.cover(c.x - rr, c.y - rr, c.x + rr, c.y + rr, color, alpha, |p| p.distance(c) <= rr);
        }
        if let Some((color, alpha)) = self.style.stroke {
            let hw = self.half_width();
            let outer = r + hw;
            self.cover(c.x - outer, c.y - outer, c.x + outer, c.y + outer, color, alpha,
                       |p| (p.distance(c) - r).abs() <= hw);
        }
    }

    fn arc(&mut self, center: Point, diameter: f32, start: f32, stop: f32) {
        let r = diameter / 2.0;
        let sweep = stop - start;
        let steps = ((sweep.abs() / std::f32::consts::TAU) * ARC_STEPS).ceil().max(1.0) as usize;
        let at = |i: usize| center + Point::from_angle(start + sweep * i as f32 / steps as f32) * r;
        for i in 0..steps {
            self.stroke_segment(at(i), at(i + 1));
        }
    }

    fn polygon(&mut self, points: &[Point]) {
        if points.len() < 2 { return; }
        if let Some((color, alpha)) = self.style.fill {
            let dev: Vec<Point> = points.iter().map(|&p| self.device(p)).collect();
            let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
            for p in &dev {
                x0 = x0.min(p.x); y0 = y0.min(p.y);
                x1 = x1.max(p.x); y1 = y1.max(p.y);
            }
            self.cover(x0, y0, x1, y1, color, alpha, |p| contains(&dev, p));
        }
        for i in 0..points.len() {
            self.stroke_segment(points[i], points[(i + 1) % points.len()]);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
