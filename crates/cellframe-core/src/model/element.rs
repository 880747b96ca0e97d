//! Vector elements: the shapes drawn on a frame.

use crate::error::{EditorError, EditorResult};
use crate::path::{PathData, PointList};
use chrono::{DateTime, Utc};
use kurbo::{Affine, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Discriminant of [`Geometry`], handy for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Circle,
    Ellipse,
    Line,
    Polygon,
    Polyline,
    Path,
    Text,
}

/// Shape-specific geometric attributes, tagged by shape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    /// Closed point list, `"x,y x,y ..."`.
    Polygon { points: String },
    /// Open point list, `"x,y x,y ..."`.
    Polyline { points: String },
    /// SVG path data.
    Path { d: String },
    #[serde(rename_all = "camelCase")]
    Text {
        x: f64,
        y: f64,
        content: String,
        #[serde(default = "default_font_size")]
        font_size: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font_family: Option<String>,
    },
}

fn default_font_size() -> f64 {
    16.0
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Rect { .. } => ShapeKind::Rect,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Ellipse { .. } => ShapeKind::Ellipse,
            Geometry::Line { .. } => ShapeKind::Line,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
            Geometry::Polyline { .. } => ShapeKind::Polyline,
            Geometry::Path { .. } => ShapeKind::Path,
            Geometry::Text { .. } => ShapeKind::Text,
        }
    }

    /// Return a copy shifted by `(dx, dy)`.
    ///
    /// Point lists are re-parsed and every pair is shifted. Path data is
    /// tokenized and only absolute commands move; relative commands are
    /// already expressed as offsets.
    pub fn translated(&self, dx: f64, dy: f64) -> EditorResult<Geometry> {
        let moved = match self {
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => Geometry::Rect {
                x: x + dx,
                y: y + dy,
                width: *width,
                height: *height,
            },
            Geometry::Circle { cx, cy, r } => Geometry::Circle {
                cx: cx + dx,
                cy: cy + dy,
                r: *r,
            },
            Geometry::Ellipse { cx, cy, rx, ry } => Geometry::Ellipse {
                cx: cx + dx,
                cy: cy + dy,
                rx: *rx,
                ry: *ry,
            },
            Geometry::Line { x1, y1, x2, y2 } => Geometry::Line {
                x1: x1 + dx,
                y1: y1 + dy,
                x2: x2 + dx,
                y2: y2 + dy,
            },
            Geometry::Polygon { points } => Geometry::Polygon {
                points: PointList::parse(points)?.translated(dx, dy).to_string(),
            },
            Geometry::Polyline { points } => Geometry::Polyline {
                points: PointList::parse(points)?.translated(dx, dy).to_string(),
            },
            Geometry::Path { d } => {
                let mut data = PathData::parse(d)?;
                data.translate(dx, dy);
                Geometry::Path { d: data.to_string() }
            }
            Geometry::Text {
                x,
                y,
                content,
                font_size,
                font_family,
            } => Geometry::Text {
                x: x + dx,
                y: y + dy,
                content: content.clone(),
                font_size: *font_size,
                font_family: font_family.clone(),
            },
        };
        Ok(moved)
    }

    /// Set new radii on a circle or ellipse. The shape kind is kept: a
    /// circle resized unequally stays a circle using the mean radius.
    pub fn set_radii(&mut self, new_rx: f64, new_ry: f64) -> EditorResult<()> {
        match self {
            Geometry::Circle { r, .. } => {
                *r = (new_rx.abs() + new_ry.abs()) / 2.0;
                Ok(())
            }
            Geometry::Ellipse { rx, ry, .. } => {
                *rx = new_rx.abs();
                *ry = new_ry.abs();
                Ok(())
            }
            other => Err(EditorError::InvalidArgument(format!(
                "{:?} has no radii",
                other.kind()
            ))),
        }
    }
}

/// Common presentation attributes. Absent values fall back to the renderer's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_linecap: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_linejoin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Style {
    /// True when the element is rendered (`display` is not `none`).
    pub fn is_displayed(&self) -> bool {
        self.display.as_deref() != Some("none")
    }

    /// True when stroke is present and not `none`.
    pub fn has_stroke(&self) -> bool {
        matches!(self.stroke.as_deref(), Some(s) if s != "none" && !s.is_empty())
    }
}

/// Affine transform attributes, composed as translate · rotate · skew · scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in degrees.
    pub rotate: f64,
    /// Skew angles in degrees.
    pub skew_x: f64,
    pub skew_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
        }
    }
}

impl Transform {
    pub fn to_affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.translate_x, self.translate_y))
            * Affine::rotate(self.rotate.to_radians())
            * Affine::skew(self.skew_x.to_radians().tan(), self.skew_y.to_radians().tan())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    pub fn is_identity(&self) -> bool {
        *self == Transform::default()
    }
}

/// A vector shape on a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    #[serde(default = "Uuid::new_v4")]
    pub id: ElementId,
    #[serde(flatten)]
    pub shape: Geometry,
    #[serde(default)]
    pub style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Element {
    pub fn new(shape: Geometry) -> Self {
        Self::with_style(shape, Style::default())
    }

    pub fn with_style(shape: Geometry, style: Style) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            shape,
            style,
            transform: None,
            hidden: false,
            locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Hidden, locked or `display: none` elements are skipped by hit-testing.
    pub fn is_selectable(&self) -> bool {
        !self.hidden && !self.locked && self.style.is_displayed()
    }

    /// Axis-aligned bounds in scene coordinates, or `None` when the
    /// geometry cannot be measured.
    pub fn bounds(&self) -> Option<Rect> {
        crate::geometry::element_bounds(self)
    }

    /// Structural copy with a fresh id and fresh timestamps.
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Same element with every attribute except the id and timestamps.
    pub fn same_content(&self, other: &Element) -> bool {
        self.shape == other.shape
            && self.style == other.style
            && self.transform == other.transform
            && self.hidden == other.hidden
            && self.locked == other.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_translate() {
        let g = Geometry::Rect {
            x: 10.0,
            y: 20.0,
            width: 5.0,
            height: 5.0,
        };
        let moved = g.translated(3.0, -4.0).unwrap();
        assert_eq!(
            moved,
            Geometry::Rect {
                x: 13.0,
                y: 16.0,
                width: 5.0,
                height: 5.0
            }
        );
    }

    #[test]
    fn test_line_translate_moves_both_ends() {
        let g = Geometry::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
        };
        let moved = g.translated(1.0, 2.0).unwrap();
        assert_eq!(
            moved,
            Geometry::Line {
                x1: 1.0,
                y1: 2.0,
                x2: 11.0,
                y2: 12.0
            }
        );
    }

    #[test]
    fn test_polygon_translate() {
        let g = Geometry::Polygon {
            points: "0,0 10,0 5,8".to_string(),
        };
        let moved = g.translated(1.0, 1.0).unwrap();
        assert_eq!(
            moved,
            Geometry::Polygon {
                points: "1,1 11,1 6,9".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_polygon_translate_fails() {
        let g = Geometry::Polygon {
            points: "0,0 nope".to_string(),
        };
        assert!(matches!(
            g.translated(1.0, 1.0),
            Err(EditorError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_circle_stays_circle_on_resize() {
        let mut g = Geometry::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 10.0,
        };
        g.set_radii(10.0, 20.0).unwrap();
        assert_eq!(g.kind(), ShapeKind::Circle);
        if let Geometry::Circle { r, .. } = g {
            assert!((r - 15.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_selectable_flags() {
        let mut el = Element::new(Geometry::Rect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        });
        assert!(el.is_selectable());
        el.style.display = Some("none".to_string());
        assert!(!el.is_selectable());
        el.style.display = None;
        el.locked = true;
        assert!(!el.is_selectable());
    }

    #[test]
    fn test_missing_id_is_generated() {
        let json = r#"{"type":"circle","cx":1,"cy":2,"r":3}"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert!(!el.id.is_nil());
        assert_eq!(el.kind(), ShapeKind::Circle);
    }

    #[test]
    fn test_duplicate_has_new_id() {
        let el = Element::new(Geometry::Circle {
            cx: 1.0,
            cy: 1.0,
            r: 1.0,
        });
        let copy = el.duplicate();
        assert_ne!(copy.id, el.id);
        assert!(copy.same_content(&el));
    }

    #[test]
    fn test_transform_affine_translation() {
        let t = Transform {
            translate_x: 5.0,
            translate_y: 7.0,
            ..Transform::default()
        };
        let p = t.to_affine() * kurbo::Point::new(1.0, 1.0);
        assert!((p.x - 6.0).abs() < 1e-10);
        assert!((p.y - 8.0).abs() < 1e-10);
    }
}
