//! Bounding boxes and rectangle predicates for hit-testing.

use crate::model::{Element, Geometry};
use crate::path::{PointList, path_bounds};
use kurbo::{Point, Rect};

/// Rough advance width of a glyph relative to the font size.
const TEXT_WIDTH_FACTOR: f64 = 0.6;

/// Untransformed bounds of a geometry in its own coordinate space.
pub fn geometry_bounds(shape: &Geometry) -> Option<Rect> {
    match shape {
        Geometry::Rect {
            x,
            y,
            width,
            height,
        } => Some(Rect::new(*x, *y, x + width, y + height)),
        Geometry::Circle { cx, cy, r } => Some(Rect::new(cx - r, cy - r, cx + r, cy + r)),
        Geometry::Ellipse { cx, cy, rx, ry } => {
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        Geometry::Line { x1, y1, x2, y2 } => Some(Rect::new(
            x1.min(*x2),
            y1.min(*y2),
            x1.max(*x2),
            y1.max(*y2),
        )),
        Geometry::Polygon { points } | Geometry::Polyline { points } => {
            PointList::parse(points).ok().and_then(|list| list.bounds())
        }
        Geometry::Path { d } => path_bounds(d),
        Geometry::Text {
            x,
            y,
            content,
            font_size,
            ..
        } => {
            // Text is anchored at its baseline
            let width = content.chars().count() as f64 * font_size * TEXT_WIDTH_FACTOR;
            Some(Rect::new(*x, y - font_size, x + width, *y))
        }
    }
}

/// Axis-aligned bounds of an element in scene coordinates.
pub fn element_bounds(element: &Element) -> Option<Rect> {
    let local = geometry_bounds(&element.shape)?;
    match element.transform {
        Some(transform) if !transform.is_identity() => {
            Some(transform.to_affine().transform_rect_bbox(local))
        }
        _ => Some(local),
    }
}

/// Union of the bounds of every element; `None` when nothing is measurable.
pub fn selection_bounds<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .into_iter()
        .filter_map(element_bounds)
        .reduce(|acc, r| acc.union(r))
}

/// Inclusive containment test.
pub fn point_in_rect(point: Point, rect: Rect) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Rectangles intersect unless one lies strictly left, right, above or below the other.
pub fn rect_intersects(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || b.x1 < a.x0 || a.y1 < b.y0 || b.y1 < a.y0)
}

/// Rectangle spanned by two arbitrary corners.
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Snap the direction from `start` to `end` to the nearest 45° while keeping its length.
pub fn snap_to_45(start: Point, end: Point) -> Point {
    let delta = end - start;
    let length = delta.hypot();
    if length == 0.0 {
        return end;
    }
    let step = std::f64::consts::FRAC_PI_4;
    let angle = (delta.atan2() / step).round() * step;
    Point::new(start.x + length * angle.cos(), start.y + length * angle.sin())
}
