//! Drawing primitives consumed by the scene.
//!
//! The [`Canvas`] trait is the whole rendering surface the core needs:
//! stroke/fill/alpha state, a handful of shapes and a push/pop transform
//! stack.  The binary rasterises into a framebuffer; tests use
//! [`CommandList`], which just records what was asked for.
//!
//! Alpha values are on a 0–255 scale; ellipse sizes are diameters.

use crate::geometry::Point;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Component-wise linear blend, `t` = 0 → `self`, `t` = 1 → `other`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub trait Canvas {
    /// Save transform and style state.
    fn push(&mut self);
    /// Restore the state saved by the matching [`Canvas::push`].
    fn pop(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, angle: f32);

    fn stroke(&mut self, color: Rgb, alpha: f32);
    fn no_stroke(&mut self);
    fn stroke_weight(&mut self, weight: f32);
    fn fill(&mut self, color: Rgb, alpha: f32);
    fn no_fill(&mut self);

    fn line(&mut self, a: Point, b: Point);
    fn ellipse(&mut self, center: Point, diameter: f32);
    /// Open arc of a circle from `start` to `stop` radians (clockwise on a
    /// y-down surface).
    fn arc(&mut self, center: Point, diameter: f32, start: f32, stop: f32);
    /// Closed polygon through `points`.
    fn polygon(&mut self, points: &[Point]);
}

// ════════════════════════════════════════════════════════════════════════════
// CommandList — recording canvas
// ════════════════════════════════════════════════════════════════════════════

/// One recorded canvas call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Push,
    Pop,
    Translate(f32, f32),
    Rotate(f32),
    Stroke(Rgb, f32),
    NoStroke,
    StrokeWeight(f32),
    Fill(Rgb, f32),
    NoFill,
    Line(Point, Point),
    Ellipse(Point, f32),
    Arc { center: Point, diameter: f32, start: f32, stop: f32 },
    Polygon(Vec<Point>),
}

impl DrawCommand {
    /// True for calls that put pixels on the surface.
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            DrawCommand::Line(..) | DrawCommand::Ellipse(..)
                | DrawCommand::Arc { .. } | DrawCommand::Polygon(..)
        )
    }
}

/// A [`Canvas`] that records every call instead of drawing.
#[derive(Clone, Debug, Default)]
pub struct CommandList {
    pub commands: Vec<DrawCommand>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    pub fn shape_count(&self) -> usize {
        self.count(DrawCommand::is_shape)
    }

    /// True if every `Push` has a matching `Pop` in order.
    pub fn is_balanced(&self) -> bool {
        let mut depth = 0i32;
        for c in &self.commands {
            match c {
                DrawCommand::Push => depth += 1,
                DrawCommand::Pop  => depth -= 1,
                _ => {}
            }
            if depth < 0 { return false; }
        }
        depth == 0
    }
}

impl Canvas for CommandList {
    fn push(&mut self)                     { self.commands.push(DrawCommand::Push); }
    fn pop(&mut self)                      { self.commands.push(DrawCommand::Pop); }
    fn translate(&mut self, dx: f32, dy: f32) { self.commands.push(DrawCommand::Translate(dx, dy)); }
    fn rotate(&mut self, angle: f32)       { self.commands.push(DrawCommand::Rotate(angle)); }
    fn stroke(&mut self, c: Rgb, a: f32)   { self.commands.push(DrawCommand::Stroke(c, a)); }
    fn no_stroke(&mut self)                { self.commands.push(DrawCommand::NoStroke); }
    fn stroke_weight(&mut self, w: f32)    { self.commands.push(DrawCommand::StrokeWeight(w)); }
    fn fill(&mut self, c: Rgb, a: f32)     { self.commands.push(DrawCommand::Fill(c, a)); }
    fn no_fill(&mut self)                  { self.commands.push(DrawCommand::NoFill); }
    fn line(&mut self, a: Point, b: Point) { self.commands.push(DrawCommand::Line(a, b)); }
    fn ellipse(&mut self, center: Point, diameter: f32) {
        self.commands.push(DrawCommand::Ellipse(center, diameter));
    }
    fn arc(&mut self, center: Point, diameter: f32, start: f32, stop: f32) {
        self.commands.push(DrawCommand::Arc { center, diameter, start, stop });
    }
    fn polygon(&mut self, points: &[Point]) {
        self.commands.push(DrawCommand::Polygon(points.to_vec()));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
