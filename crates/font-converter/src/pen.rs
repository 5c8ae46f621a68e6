//! Outline pen that records TrueType contours.

use kurbo::{CubicBez, Point};
use skrifa::outline::OutlinePen;
use read_fonts::tables::glyf::CurvePoint;
use write_fonts::tables::glyf::Contour;

/// Collects quadratic contours from a skrifa outline.
///
/// Cubic segments are approximated with quadratic splines within
/// `tolerance` font units. Finished contours are reversed, turning the
/// counter-clockwise outer contours of PostScript outlines into the clockwise
/// contours TrueType expects.
#[derive(Debug)]
pub struct QuadraticPen {
    tolerance: f64,
    contours: Vec<Contour>,
    current: Vec<CurvePoint>,
    last: Point,
}

impl QuadraticPen {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance, contours: Vec::new(), current: Vec::new(), last: Point::ZERO }
    }

    /// Finish the open contour, if any, and return every contour drawn.
    pub fn into_contours(mut self) -> Vec<Contour> {
        self.finish_contour();
        self.contours
    }

    fn push(&mut self, x: f64, y: f64, on_curve: bool) {
        let point = CurvePoint::new(round(x), round(y), on_curve);
        if on_curve && self.current.last() == Some(&point) {
            return;
        }
        self.current.push(point);
    }

    fn finish_contour(&mut self) {
        let mut points = std::mem::take(&mut self.current);
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 2 {
            return;
        }
        points.reverse();
        self.contours.push(points.into());
    }
}

fn round(value: f64) -> i16 {
    value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

impl OutlinePen for QuadraticPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.finish_contour();
        self.last = Point::new(x.into(), y.into());
        self.push(x.into(), y.into(), true);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.last = Point::new(x.into(), y.into());
        self.push(x.into(), y.into(), true);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.push(cx0.into(), cy0.into(), false);
        self.last = Point::new(x.into(), y.into());
        self.push(x.into(), y.into(), true);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let end = Point::new(x.into(), y.into());
        let cubic = CubicBez::new(
            self.last,
            Point::new(cx0.into(), cy0.into()),
            Point::new(cx1.into(), cy1.into()),
            end,
        );
        for (_, _, quad) in cubic.to_quads(self.tolerance) {
            self.push(quad.p1.x, quad.p1.y, false);
            self.push(quad.p2.x, quad.p2.y, true);
        }
        self.last = end;
    }

    fn close(&mut self) {
        self.finish_contour();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(contour: &Contour) -> Vec<(i16, i16, bool)> {
        contour.iter().map(|p| (p.x, p.y, p.on_curve)).collect()
    }

    #[test]
    fn test_lines_are_reversed() {
        let mut pen = QuadraticPen::new(1.0);
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.line_to(100.0, 100.0);
        pen.line_to(0.0, 0.0);
        pen.close();

        let contours = pen.into_contours();
        assert_eq!(contours.len(), 1);
        assert_eq!(
            points(&contours[0]),
            vec![(100, 100, true), (100, 0, true), (0, 0, true)]
        );
    }

    #[test]
    fn test_cubic_becomes_quadratic() {
        let mut pen = QuadraticPen::new(1.0);
        pen.move_to(0.0, 0.0);
        pen.curve_to(0.0, 500.0, 500.0, 1000.0, 1000.0, 1000.0);
        pen.line_to(1000.0, 0.0);
        pen.close();

        let contours = pen.into_contours();
        let pts = points(&contours[0]);
        assert!(pts.iter().any(|p| !p.2), "expected off-curve points");
        assert!(pts.contains(&(1000, 1000, true)));
        assert_eq!(pts.last(), Some(&(0, 0, true)));
    }

    #[test]
    fn test_degenerate_contours_dropped() {
        let mut pen = QuadraticPen::new(1.0);
        pen.move_to(10.0, 10.0);
        pen.close();
        pen.move_to(20.0, 20.0);
        pen.line_to(20.2, 20.1);
        pen.close();
        assert!(pen.into_contours().is_empty());
    }

    #[test]
    fn test_unclosed_contour_kept() {
        let mut pen = QuadraticPen::new(1.0);
        pen.move_to(0.0, 0.0);
        pen.line_to(0.0, 50.0);
        pen.line_to(50.0, 50.0);
        assert_eq!(pen.into_contours().len(), 1);
    }
}
