use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Point, Rect};
use crate::shape::surface::{DrawSurface, StrokeStyle};

/// Flattening tolerance used when turning circles into paths.
const PATH_TOLERANCE: f64 = 0.1;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Stroke colours offered by the markup palette.
pub enum ShapeColor {
    /// Pure red, the default pen.
    #[default]
    Red,
    /// Pure blue.
    Blue,
    /// Pure yellow.
    Yellow,
}

impl ShapeColor {
    /// Straight (non-premultiplied) RGBA8.
    pub fn rgba8(self) -> [u8; 4] {
        match self {
            ShapeColor::Red => [255, 0, 0, 255],
            ShapeColor::Blue => [0, 0, 255, 255],
            ShapeColor::Yellow => [255, 255, 0, 255],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// One drawable markup primitive, in the coordinate space of the surface it was captured on.
///
/// Shapes are values: every transform returns a new shape.
pub enum Shape {
    /// Circle outline around `center`.
    Circle {
        /// Centre point.
        center: Point,
        /// Radius in surface pixels; zero is allowed.
        radius: f64,
        /// Stroke colour.
        color: ShapeColor,
    },
    /// Straight segment.
    Line {
        /// Anchor point.
        start: Point,
        /// Release point.
        end: Point,
        /// Stroke colour.
        color: ShapeColor,
    },
    /// Two connected segments: start, via-point, end.
    Polyline {
        /// `[start, via, end]`.
        points: [Point; 3],
        /// Stroke colour.
        color: ShapeColor,
    },
}

impl Shape {
    pub fn color(&self) -> ShapeColor {
        match *self {
            Shape::Circle { color, .. } => color,
            Shape::Line { color, .. } => color,
            Shape::Polyline { color, .. } => color,
        }
    }

    /// Remap coordinates by per-axis factors.
    ///
    /// Points scale component-wise. The radius scales by the geometric mean `sqrt(sx * sy)`, which
    /// equals the factor for uniform scaling and keeps repeated scaling composable:
    /// `s.scale(a, b).scale(c, d) == s.scale(a * c, b * d)`.
    pub fn scale(&self, sx: f64, sy: f64) -> Shape {
        let p = |pt: Point| Point::new(pt.x * sx, pt.y * sy);
        match *self {
            Shape::Circle {
                center,
                radius,
                color,
            } => Shape::Circle {
                center: p(center),
                radius: radius * (sx * sy).abs().sqrt(),
                color,
            },
            Shape::Line { start, end, color } => Shape::Line {
                start: p(start),
                end: p(end),
                color,
            },
            Shape::Polyline { points, color } => Shape::Polyline {
                points: points.map(p),
                color,
            },
        }
    }

    /// Stroke outline of the shape.
    pub fn to_path(&self) -> BezPath {
        match *self {
            Shape::Circle { center, radius, .. } => {
                kurbo::Circle::new(center, radius.max(0.0)).to_path(PATH_TOLERANCE)
            }
            Shape::Line { start, end, .. } => segment_path(start, end),
            Shape::Polyline { points, .. } => {
                let mut path = BezPath::new();
                path.move_to(points[0]);
                path.line_to(points[1]);
                path.line_to(points[2]);
                path
            }
        }
    }

    /// Axis-aligned bounds of the geometry, ignoring stroke width.
    pub fn bounds(&self) -> Rect {
        match *self {
            Shape::Circle { center, radius, .. } => {
                let r = radius.max(0.0);
                Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
            }
            Shape::Line { start, end, .. } => Rect::from_points(start, end),
            Shape::Polyline { points, .. } => {
                Rect::from_points(points[0], points[1]).union_pt(points[2])
            }
        }
    }

    /// Stroke this shape onto `surface` in its own colour.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S, line_width: f64) {
        surface.stroke_path(&self.to_path(), StrokeStyle::new(self.color(), line_width));
    }
}

/// Open path for the segment `a -> b`.
pub fn segment_path(a: Point, b: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(a);
    path.line_to(b);
    path
}

#[cfg(test)]
#[path = "../../tests/unit/shape/model.rs"]
mod tests;
