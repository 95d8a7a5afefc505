//! 2-D points, linear range mapping and interpolation helpers.

use std::ops::{Add, AddAssign, Mul, Sub};

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A point (or displacement) in a 2-D pixel coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Unit vector at `angle` radians (0 = +x, counter-clockwise in maths
    /// convention, clockwise on a y-down screen).
    pub fn from_angle(angle: f32) -> Self {
        Point { x: angle.cos(), y: angle.sin() }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Arithmetic mean of a set of points.  `None` for an empty slice.
    pub fn mean(points: &[Point]) -> Option<Point> {
        if points.is_empty() { return None; }
        let n = points.len() as f32;
        let sum = points.iter().fold(Point::ZERO, |acc, &p| acc + p);
        Some(Point::new(sum.x / n, sum.y / n))
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point { Point::new(self.x + rhs.x, self.y + rhs.y) }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point { Point::new(self.x - rhs.x, self.y - rhs.y) }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, k: f32) -> Point { Point::new(self.x * k, self.y * k) }
}

// ════════════════════════════════════════════════════════════════════════════
// Range mapping
// ════════════════════════════════════════════════════════════════════════════

/// Linear interpolation from `a` toward `b` by fraction `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Re-map `v` from `[in_lo, in_hi]` onto `[out_lo, out_hi]` without clamping.
///
/// A zero-width input range maps everything onto `out_lo`.
pub fn map_range(v: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    let span = in_hi - in_lo;
    if span == 0.0 { return out_lo; }
    out_lo + (v - in_lo) / span * (out_hi - out_lo)
}

/// A clamped linear mapping between two ranges.
///
/// The output is always inside the output range, whichever direction it
/// runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearMap {
    pub in_lo:  f32,
    pub in_hi:  f32,
    pub out_lo: f32,
    pub out_hi: f32,
}

impl LinearMap {
    pub const fn new(in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> Self {
        LinearMap { in_lo, in_hi, out_lo, out_hi }
    }

    pub fn apply(&self, v: f32) -> f32 {
        let (lo, hi) = if self.out_lo <= self.out_hi {
            (self.out_lo, self.out_hi)
        } else {
            (self.out_hi, self.out_lo)
        };
        map_range(v, self.in_lo, self.in_hi, self.out_lo, self.out_hi).clamp(lo, hi)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame mapping — detector coordinates → render surface
// ════════════════════════════════════════════════════════════════════════════

/// Scales points from the capture frame (where the detector reports
/// keypoints) onto the render surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMapper {
    pub video_w:   f32,
    pub video_h:   f32,
    pub surface_w: f32,
    pub surface_h: f32,
}

impl FrameMapper {
    pub fn new(video_w: f32, video_h: f32, surface_w: f32, surface_h: f32) -> Self {
        FrameMapper { video_w, video_h, surface_w, surface_h }
    }

    pub fn to_surface(&self, p: Point) -> Point {
        Point::new(
            map_range(p.x, 0.0, self.video_w, 0.0, self.surface_w),
            map_range(p.y, 0.0, self.video_h, 0.0, self.surface_h),
        )
    }
}

impl Default for FrameMapper {
    fn default() -> Self {
        FrameMapper::new(640.0, 480.0, 1920.0, 1080.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
