//! Shape construction from pointer gestures.
//!
//! Everything here is stateless: a tool kind, two scene points, the active
//! [`DrawingProperties`] and the modifier-derived [`DrawOptions`] go in, a
//! finished [`Element`] comes out.

use crate::error::EditorResult;
use crate::geometry::{midpoint, snap_to_45};
use crate::model::{Element, Geometry, Style};
use crate::path::{PathData, PointList};
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

pub const MIN_STROKE_WIDTH: f64 = 1.0;
pub const MAX_STROKE_WIDTH: f64 = 50.0;

/// Sides used by the polygon tool.
pub const DEFAULT_POLYGON_SIDES: usize = 6;
/// Points used by the star tool.
pub const DEFAULT_STAR_POINTS: usize = 5;
/// Inner radius of the star tool relative to the outer radius.
pub const STAR_INNER_RATIO: f64 = 0.5;
/// Rotation in degrees that puts the first vertex straight up.
const POINT_UP: f64 = -90.0;

/// Stroke applied to freehand paths when the active style has none.
const FALLBACK_STROKE: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillType {
    #[default]
    Solid,
    Gradient,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

impl StrokeType {
    /// Dash pattern for this stroke style.
    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            StrokeType::Dashed => Some("10 5"),
            StrokeType::Dotted => Some("2 2"),
            StrokeType::Solid | StrokeType::None => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

impl LineCap {
    fn as_str(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

impl LineJoin {
    fn as_str(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

/// Style applied to newly drawn shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingProperties {
    pub fill: String,
    pub fill_opacity: f64,
    pub fill_type: FillType,
    pub stroke: String,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub stroke_type: StrokeType,
    pub stroke_linecap: LineCap,
    pub stroke_linejoin: LineJoin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

impl Default for DrawingProperties {
    fn default() -> Self {
        Self {
            fill: "#000000".to_string(),
            fill_opacity: 1.0,
            fill_type: FillType::Solid,
            stroke: "#000000".to_string(),
            stroke_width: 2.0,
            stroke_opacity: 1.0,
            stroke_type: StrokeType::Solid,
            stroke_linecap: LineCap::Round,
            stroke_linejoin: LineJoin::Round,
            stroke_dasharray: None,
        }
    }
}

impl DrawingProperties {
    pub fn set_fill_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        self.fill_type = if color == "none" {
            FillType::None
        } else {
            FillType::Solid
        };
        self.fill = color;
    }

    pub fn set_stroke_color(&mut self, color: impl Into<String>) {
        let color = color.into();
        if color == "none" {
            self.stroke_type = StrokeType::None;
        } else if self.stroke_type == StrokeType::None {
            self.stroke_type = StrokeType::Solid;
        }
        self.stroke = color;
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_stroke_opacity(&mut self, opacity: f64) {
        self.stroke_opacity = opacity.clamp(0.0, 1.0);
    }

    /// Switch stroke style; the dash pattern follows.
    pub fn set_stroke_style(&mut self, style: StrokeType) {
        self.stroke_type = style;
        self.stroke_dasharray = style.dasharray().map(str::to_string);
    }

    pub fn toggle_fill(&mut self) {
        if self.fill_type == FillType::None {
            self.set_fill_color("#000000");
        } else {
            self.set_fill_color("none");
        }
    }

    pub fn toggle_stroke(&mut self) {
        if self.stroke_type == StrokeType::None {
            self.set_stroke_color("#000000");
        } else {
            self.set_stroke_color("none");
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Map to element style. A `none` fill or stroke type wins over the stored color.
    pub fn to_style(&self) -> Style {
        Style {
            fill: Some(if self.fill_type == FillType::None {
                "none".to_string()
            } else {
                self.fill.clone()
            }),
            fill_opacity: Some(self.fill_opacity),
            stroke: Some(if self.stroke_type == StrokeType::None {
                "none".to_string()
            } else {
                self.stroke.clone()
            }),
            stroke_width: Some(self.stroke_width),
            stroke_opacity: Some(self.stroke_opacity),
            stroke_linecap: Some(self.stroke_linecap.as_str().to_string()),
            stroke_linejoin: Some(self.stroke_linejoin.as_str().to_string()),
            stroke_dasharray: self.stroke_dasharray.clone(),
            ..Style::default()
        }
    }
}

/// Modifier-driven construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawOptions {
    /// Square, circle, equilateral triangle or 45° line (Shift).
    pub constrain_proportions: bool,
    /// Anchor the shape's center at the start point (Alt).
    pub draw_from_center: bool,
}

/// Build the element a two-point gesture produces with the given tool.
/// Tools that do not draw from two points yield `None`.
pub fn draw_shape(
    tool: ToolKind,
    start: Point,
    end: Point,
    properties: &DrawingProperties,
    options: DrawOptions,
) -> Option<Element> {
    let style = properties.to_style();
    match tool {
        ToolKind::Rectangle => Some(draw_rectangle(start, end, style, options)),
        ToolKind::Circle | ToolKind::Ellipse => Some(draw_ellipse(start, end, style, options)),
        ToolKind::Line => Some(draw_line(start, end, style, options)),
        ToolKind::Triangle => Some(draw_triangle(start, end, style, options)),
        ToolKind::Polygon => Some(draw_polygon(
            start,
            start.distance(end),
            DEFAULT_POLYGON_SIDES,
            POINT_UP,
            style,
        )),
        ToolKind::Star => {
            let outer = start.distance(end);
            Some(draw_star(
                start,
                outer,
                outer * STAR_INNER_RATIO,
                DEFAULT_STAR_POINTS,
                POINT_UP,
                style,
            ))
        }
        _ => None,
    }
}

pub fn draw_rectangle(start: Point, end: Point, style: Style, options: DrawOptions) -> Element {
    let mut x = start.x.min(end.x);
    let mut y = start.y.min(end.y);
    let mut width = (end.x - start.x).abs();
    let mut height = (end.y - start.y).abs();

    if options.constrain_proportions {
        let size = width.min(height);
        width = size;
        height = size;
        if end.x < start.x {
            x = start.x - width;
        }
        if end.y < start.y {
            y = start.y - height;
        }
    }

    if options.draw_from_center {
        x = start.x - width / 2.0;
        y = start.y - height / 2.0;
    }

    Element::with_style(
        Geometry::Rect {
            x,
            y,
            width,
            height,
        },
        style,
    )
}

/// Circle when the radii come out equal, ellipse otherwise.
pub fn draw_ellipse(start: Point, end: Point, style: Style, options: DrawOptions) -> Element {
    let center = if options.draw_from_center {
        start
    } else {
        midpoint(start, end)
    };
    let mut rx = (end.x - start.x).abs() / 2.0;
    let mut ry = (end.y - start.y).abs() / 2.0;

    if options.constrain_proportions {
        let r = rx.min(ry);
        rx = r;
        ry = r;
    }

    let shape = if rx == ry {
        Geometry::Circle {
            cx: center.x,
            cy: center.y,
            r: rx,
        }
    } else {
        Geometry::Ellipse {
            cx: center.x,
            cy: center.y,
            rx,
            ry,
        }
    };
    Element::with_style(shape, style)
}

pub fn draw_line(start: Point, end: Point, mut style: Style, options: DrawOptions) -> Element {
    let end = if options.constrain_proportions {
        snap_to_45(start, end)
    } else {
        end
    };
    style.fill = Some("none".to_string());
    Element::with_style(
        Geometry::Line {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        },
        style,
    )
}

/// Regular polygon with vertices every `360 / sides` degrees from `rotation`.
pub fn draw_polygon(
    center: Point,
    radius: f64,
    sides: usize,
    rotation: f64,
    style: Style,
) -> Element {
    let step = 360.0 / sides.max(1) as f64;
    let points = (0..sides)
        .map(|i| polar(center, radius, rotation + i as f64 * step))
        .collect();
    Element::with_style(
        Geometry::Polygon {
            points: PointList(points).to_string(),
        },
        style,
    )
}

/// Star with `points` tips, alternating outer and inner radius.
pub fn draw_star(
    center: Point,
    outer_radius: f64,
    inner_radius: f64,
    points: usize,
    rotation: f64,
    style: Style,
) -> Element {
    let step = 180.0 / points.max(1) as f64;
    let vertices = (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            polar(center, radius, rotation + i as f64 * step)
        })
        .collect();
    Element::with_style(
        Geometry::Polygon {
            points: PointList(vertices).to_string(),
        },
        style,
    )
}

/// Apex at the top middle of the drag box, base along its bottom edge.
pub fn draw_triangle(start: Point, end: Point, style: Style, options: DrawOptions) -> Element {
    let x = start.x.min(end.x);
    let y = start.y.min(end.y);
    let mut width = (end.x - start.x).abs();
    let mut height = (end.y - start.y).abs();

    if options.constrain_proportions {
        let size = width.min(height);
        width = size;
        height = size * 3f64.sqrt() / 2.0;
    }

    let vertices = vec![
        Point::new(x + width / 2.0, y),
        Point::new(x, y + height),
        Point::new(x + width, y + height),
    ];
    Element::with_style(
        Geometry::Polygon {
            points: PointList(vertices).to_string(),
        },
        style,
    )
}

/// Freehand path from sampled points. Fails with `InsufficientInput` below two points.
pub fn path_from_points(points: &[Point], properties: &DrawingProperties) -> EditorResult<Element> {
    let data = PathData::from_points(points)?;
    let mut style = properties.to_style();
    style.fill = Some("none".to_string());
    if !style.has_stroke() {
        style.stroke = Some(FALLBACK_STROKE.to_string());
    }
    Ok(Element::with_style(
        Geometry::Path {
            d: data.to_string(),
        },
        style,
    ))
}

fn polar(center: Point, radius: f64, degrees: f64) -> Point {
    let angle = degrees.to_radians();
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::model::ShapeKind;

    fn props() -> DrawingProperties {
        DrawingProperties::default()
    }

    fn constrained() -> DrawOptions {
        DrawOptions {
            constrain_proportions: true,
            ..DrawOptions::default()
        }
    }

    #[test]
    fn test_rectangle_basic() {
        let el = draw_shape(
            ToolKind::Rectangle,
            Point::new(10.0, 10.0),
            Point::new(110.0, 60.0),
            &props(),
            DrawOptions::default(),
        )
        .unwrap();
        assert_eq!(
            el.shape,
            Geometry::Rect {
                x: 10.0,
                y: 10.0,
                width: 100.0,
                height: 50.0
            }
        );
    }

    #[test]
    fn test_rectangle_constrained_up_left() {
        let el = draw_rectangle(
            Point::new(100.0, 100.0),
            Point::new(40.0, 70.0),
            Style::default(),
            constrained(),
        );
        assert_eq!(
            el.shape,
            Geometry::Rect {
                x: 70.0,
                y: 70.0,
                width: 30.0,
                height: 30.0
            }
        );
    }

    #[test]
    fn test_rectangle_constrained_is_square_any_direction() {
        let starts = [(0.0, 0.0), (50.0, 50.0)];
        let ends = [(13.0, 77.0), (-20.0, 5.0), (90.0, -3.0)];
        for s in starts {
            for e in ends {
                let el = draw_rectangle(s.into(), e.into(), Style::default(), constrained());
                if let Geometry::Rect { width, height, .. } = el.shape {
                    assert!((width - height).abs() < f64::EPSILON);
                } else {
                    panic!("expected rect");
                }
            }
        }
    }

    #[test]
    fn test_rectangle_from_center() {
        let el = draw_rectangle(
            Point::new(50.0, 50.0),
            Point::new(70.0, 60.0),
            Style::default(),
            DrawOptions {
                draw_from_center: true,
                ..DrawOptions::default()
            },
        );
        assert_eq!(
            el.shape,
            Geometry::Rect {
                x: 40.0,
                y: 45.0,
                width: 20.0,
                height: 10.0
            }
        );
    }

    #[test]
    fn test_ellipse_from_midpoint() {
        let el = draw_ellipse(
            Point::new(0.0, 0.0),
            Point::new(40.0, 20.0),
            Style::default(),
            DrawOptions::default(),
        );
        assert_eq!(
            el.shape,
            Geometry::Ellipse {
                cx: 20.0,
                cy: 10.0,
                rx: 20.0,
                ry: 10.0
            }
        );
    }

    #[test]
    fn test_constrained_ellipse_is_circle() {
        let el = draw_shape(
            ToolKind::Ellipse,
            Point::new(0.0, 0.0),
            Point::new(40.0, 20.0),
            &props(),
            constrained(),
        )
        .unwrap();
        assert_eq!(el.kind(), ShapeKind::Circle);
        assert_eq!(
            el.shape,
            Geometry::Circle {
                cx: 20.0,
                cy: 10.0,
                r: 10.0
            }
        );
    }

    #[test]
    fn test_equal_radii_emit_circle() {
        let el = draw_ellipse(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Style::default(),
            DrawOptions::default(),
        );
        assert_eq!(el.kind(), ShapeKind::Circle);
    }

    #[test]
    fn test_line_has_no_fill() {
        let el = draw_shape(
            ToolKind::Line,
            Point::new(0.0, 0.0),
            Point::new(10.0, 3.0),
            &props(),
            DrawOptions::default(),
        )
        .unwrap();
        assert_eq!(el.style.fill.as_deref(), Some("none"));
    }

    #[test]
    fn test_line_snaps_to_45() {
        let el = draw_line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 11.0),
            Style::default(),
            constrained(),
        );
        if let Geometry::Line { x2, y2, .. } = el.shape {
            assert!((x2 - y2).abs() < 1e-9);
            assert!(((x2 * x2 + y2 * y2).sqrt() - (221.0f64).sqrt()).abs() < 1e-9);
        } else {
            panic!("expected line");
        }
    }

    #[test]
    fn test_polygon_vertices() {
        let el = draw_polygon(Point::new(0.0, 0.0), 10.0, 4, 0.0, Style::default());
        let Geometry::Polygon { points } = &el.shape else {
            panic!("expected polygon");
        };
        let pts = PointList::parse(points).unwrap();
        assert_eq!(pts.points().len(), 4);
        assert!((pts.points()[0].x - 10.0).abs() < 1e-9);
        assert!((pts.points()[1].y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_star_alternates_radius() {
        let el = draw_star(Point::ZERO, 10.0, 4.0, 5, 0.0, Style::default());
        let Geometry::Polygon { points } = &el.shape else {
            panic!("expected polygon");
        };
        let pts = PointList::parse(points).unwrap();
        assert_eq!(pts.points().len(), 10);
        for (i, p) in pts.points().iter().enumerate() {
            let r = p.to_vec2().hypot();
            let expected = if i % 2 == 0 { 10.0 } else { 4.0 };
            assert!((r - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_equilateral_triangle() {
        let el = draw_triangle(
            Point::new(0.0, 0.0),
            Point::new(20.0, 40.0),
            Style::default(),
            constrained(),
        );
        let Geometry::Polygon { points } = &el.shape else {
            panic!("expected polygon");
        };
        let pts = PointList::parse(points).unwrap();
        let [a, b, c] = [pts.points()[0], pts.points()[1], pts.points()[2]];
        assert!((a.distance(b) - b.distance(c)).abs() < 1e-9);
        assert!((a.distance(c) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_type_none_overrides_color() {
        let mut p = props();
        p.fill = "#ff0000".to_string();
        p.fill_type = FillType::None;
        assert_eq!(p.to_style().fill.as_deref(), Some("none"));
    }

    #[test]
    fn test_path_from_points_requires_two() {
        let result = path_from_points(&[Point::ZERO], &props());
        assert!(matches!(
            result,
            Err(EditorError::InsufficientInput { .. })
        ));
    }

    #[test]
    fn test_path_from_points_defaults_stroke() {
        let mut p = props();
        p.set_stroke_color("none");
        let el = path_from_points(&[Point::ZERO, Point::new(1.0, 1.0)], &p).unwrap();
        assert_eq!(el.style.fill.as_deref(), Some("none"));
        assert_eq!(el.style.stroke.as_deref(), Some(FALLBACK_STROKE));
        assert_eq!(
            el.shape,
            Geometry::Path {
                d: "M 0 0 L 1 1".to_string()
            }
        );
    }

    #[test]
    fn test_property_clamps() {
        let mut p = props();
        p.set_stroke_width(200.0);
        assert!((p.stroke_width - MAX_STROKE_WIDTH).abs() < f64::EPSILON);
        p.set_stroke_width(0.0);
        assert!((p.stroke_width - MIN_STROKE_WIDTH).abs() < f64::EPSILON);
        p.set_fill_opacity(-1.0);
        assert!(p.fill_opacity.abs() < f64::EPSILON);
        p.set_stroke_opacity(3.0);
        assert!((p.stroke_opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stroke_style_dasharray() {
        let mut p = props();
        p.set_stroke_style(StrokeType::Dashed);
        assert_eq!(p.stroke_dasharray.as_deref(), Some("10 5"));
        p.set_stroke_style(StrokeType::Dotted);
        assert_eq!(p.stroke_dasharray.as_deref(), Some("2 2"));
        p.set_stroke_style(StrokeType::Solid);
        assert_eq!(p.stroke_dasharray, None);
    }

    #[test]
    fn test_toggles() {
        let mut p = props();
        p.toggle_fill();
        assert_eq!(p.fill_type, FillType::None);
        assert_eq!(p.fill, "none");
        p.toggle_fill();
        assert_eq!(p.fill, "#000000");
        p.toggle_stroke();
        assert_eq!(p.to_style().stroke.as_deref(), Some("none"));
    }

    #[test]
    fn test_non_drawing_tools_yield_nothing() {
        assert!(
            draw_shape(
                ToolKind::Select,
                Point::ZERO,
                Point::new(5.0, 5.0),
                &props(),
                DrawOptions::default()
            )
            .is_none()
        );
    }
}
