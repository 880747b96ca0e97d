//! Camera module for pan/zoom transforms.
//!
//! Screen points arrive in client coordinates. They are first made relative
//! to the canvas origin, then mapped through the inverse of
//! `translate(offset) · scale(zoom)` into scene coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
/// Share of the viewport the content fills after fit-to-screen.
pub const FIT_MARGIN: f64 = 0.9;
/// Wheel delta that changes the zoom level by 1.0.
const WHEEL_DIVISOR: f64 = 1000.0;

/// View transform for the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Position of the canvas element in client coordinates.
    pub origin: Point,
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level, 1.0 = 100%.
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Scene to canvas-local screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Canvas-local screen to scene transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a client-space point to scene coordinates.
    pub fn screen_to_scene(&self, screen_point: Point) -> Point {
        self.inverse_transform() * (screen_point - self.origin.to_vec2())
    }

    /// Convert a scene point to client-space coordinates.
    pub fn scene_to_screen(&self, scene_point: Point) -> Point {
        self.transform() * scene_point + self.origin.to_vec2()
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom, keeping the given client point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.set_zoom_at(screen_point, self.zoom * factor);
    }

    /// Set an absolute zoom level, keeping the given client point fixed.
    pub fn set_zoom_at(&mut self, screen_point: Point, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let new_zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let scene_point = self.screen_to_scene(screen_point);
        self.zoom = new_zoom;

        // Shift so the scene point lands back under the pointer
        let drifted = self.scene_to_screen(scene_point);
        self.offset += screen_point - drifted;
    }

    /// Wheel zoom: scrolling up by 1000 units adds 1.0 to the zoom level.
    pub fn wheel(&mut self, screen_point: Point, delta_y: f64) {
        self.set_zoom_at(screen_point, self.zoom - delta_y / WHEEL_DIVISOR);
    }

    /// Reset pan and zoom. The canvas origin is kept.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Zoom so the content fills the viewport (with margin) and center it.
    pub fn fit_to_screen(&mut self, viewport: Size, content: Size) {
        self.fit_to_screen_with_margin(viewport, content, FIT_MARGIN);
    }

    /// Fit with a custom share of the viewport left for the content.
    pub fn fit_to_screen_with_margin(&mut self, viewport: Size, content: Size, margin: f64) {
        if content.is_zero_area()
            || viewport.is_zero_area()
            || !content.is_finite()
            || !viewport.is_finite()
            || !margin.is_finite()
        {
            self.reset();
            return;
        }
        let scale_x = viewport.width / content.width * margin;
        let scale_y = viewport.height / content.height * margin;
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);
        self.offset = Vec2::new(
            (viewport.width - content.width * self.zoom) / 2.0,
            (viewport.height - content.height * self.zoom) / 2.0,
        );
    }

    /// Scene rectangle currently visible in a viewport of the given size.
    pub fn visible_scene_rect(&self, viewport: Size) -> Rect {
        let inverse = self.inverse_transform();
        Rect::from_points(
            inverse * Point::ZERO,
            inverse * Point::new(viewport.width, viewport.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_scene_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let scene = camera.screen_to_scene(screen);
        assert!((scene.x - screen.x).abs() < f64::EPSILON);
        assert!((scene.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_scene_with_origin_offset_and_zoom() {
        let mut camera = Camera::new();
        camera.origin = Point::new(20.0, 10.0);
        camera.offset = Vec2::new(30.0, 40.0);
        camera.zoom = 2.0;
        let scene = camera.screen_to_scene(Point::new(150.0, 250.0));
        assert!((scene.x - 50.0).abs() < 1e-10);
        assert!((scene.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.origin = Point::new(8.0, 64.0);
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = camera.scene_to_screen(camera.screen_to_scene(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_zoom_ignored() {
        let mut camera = Camera::new();
        camera.set_zoom_at(Point::ZERO, 2.0);
        camera.set_zoom_at(Point::new(10.0, 10.0), f64::NAN);
        camera.wheel(Point::new(10.0, 10.0), f64::NAN);
        camera.zoom_at(Point::ZERO, f64::INFINITY);
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
        assert!(camera.offset.x.is_finite() && camera.offset.y.is_finite());

        camera.fit_to_screen(Size::new(f64::NAN, 600.0), Size::new(800.0, 600.0));
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_keeps_pointer_fixed() {
        let mut camera = Camera::new();
        let pointer = Point::new(200.0, 150.0);
        let before = camera.screen_to_scene(pointer);
        camera.zoom_at(pointer, 2.0);
        let after = camera.screen_to_scene(pointer);
        assert!((before.x - after.x).abs() < 1e-10);
        assert!((before.y - after.y).abs() < 1e-10);
    }

    #[test]
    fn test_wheel_zoom_step() {
        let mut camera = Camera::new();
        camera.wheel(Point::ZERO, -100.0);
        assert!((camera.zoom - 1.1).abs() < 1e-10);
        camera.wheel(Point::ZERO, 300.0);
        assert!((camera.zoom - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan_by(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
        camera.reset();
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn test_fit_to_screen() {
        let mut camera = Camera::new();
        camera.fit_to_screen(Size::new(1000.0, 1000.0), Size::new(1920.0, 1080.0));
        let expected = 1000.0 / 1920.0 * FIT_MARGIN;
        assert!((camera.zoom - expected).abs() < 1e-10);
        let center = camera.scene_to_screen(Point::new(960.0, 540.0));
        assert!((center.x - 500.0).abs() < 1e-9);
        assert!((center.y - 500.0).abs() < 1e-9);
    }
}
