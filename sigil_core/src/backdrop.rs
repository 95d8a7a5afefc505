//! Night-sky background: a vertical gradient and a scatter of faint stars
//! that are re-sampled every frame so they twinkle.

use rand::Rng;

use crate::canvas::{Canvas, Rgb};
use crate::geometry::Point;

pub const SKY_TOP:    Rgb = Rgb(18, 10, 32);
pub const SKY_BOTTOM: Rgb = Rgb(90, 45, 110);
const STAR_COLOR:     Rgb = Rgb(255, 255, 255);

/// Paint the full `width` × `height` surface.
pub fn draw_background<R: Rng>(
    canvas: &mut impl Canvas,
    width: f32,
    height: f32,
    star_count: usize,
    rng: &mut R,
) {
    canvas.push();
    canvas.stroke_weight(1.0);
    let rows = height.max(0.0) as usize;
    for y in 0..rows {
        let t = y as f32 / height;
        canvas.stroke(SKY_TOP.lerp(SKY_BOTTOM, t), 255.0);
        canvas.line(Point::new(0.0, y as f32), Point::new(width, y as f32));
    }

    canvas.no_stroke();
    for _ in 0..star_count {
        let at = Point::new(rng.random_range(0.0..width), rng.random_range(0.0..height));
        canvas.fill(STAR_COLOR, rng.random_range(5.0..18.0));
        canvas.ellipse(at, rng.random_range(1.0..2.0));
    }
    canvas.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CommandList, DrawCommand};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn one_line_per_row_then_stars() {
        let mut c = CommandList::new();
        let mut rng = StdRng::seed_from_u64(9);
        draw_background(&mut c, 320.0, 180.0, 90, &mut rng);

        assert_eq!(c.count(|d| matches!(d, DrawCommand::Line(..))), 180);
        assert_eq!(c.count(|d| matches!(d, DrawCommand::Ellipse(..))), 90);
        assert!(c.is_balanced());
        assert!(c.commands.contains(&DrawCommand::Stroke(SKY_TOP, 255.0)));

        for d in &c.commands {
            if let DrawCommand::Ellipse(p, dia) = d {
                assert!(p.x >= 0.0 && p.x < 320.0 && p.y >= 0.0 && p.y < 180.0);
                assert!((1.0..2.0).contains(dia));
            }
            if let DrawCommand::Fill(_, a) = d {
                assert!((5.0..18.0).contains(a));
            }
        }
    }
}
