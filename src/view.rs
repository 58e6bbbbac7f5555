//! Pan/zoom view transform.
//!
//! The canvas draws image content translated by `pan` and then scaled by
//! `zoom`, so a screen point maps to image space as
//! `(client - canvas_origin - pan) / zoom`. [`ViewTransform::screen_to_image`]
//! is the only place this conversion happens.

use crate::constants::zoom as zoom_const;
use crate::geometry::Point;

/// Represents pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan: Point,
}

impl ViewTransform {
    /// Create a new transform, clamping zoom to the supported range.
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan: Point::new(pan_x, pan_y),
        }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Map a device pointer position to image coordinates.
    pub fn screen_to_image(&self, client: Point, canvas_origin: Point) -> Point {
        Point::new(
            (client.x - canvas_origin.x - self.pan.x) / self.zoom,
            (client.y - canvas_origin.y - self.pan.y) / self.zoom,
        )
    }

    /// Map an image point back to device coordinates.
    pub fn image_to_screen(&self, image: Point, canvas_origin: Point) -> Point {
        Point::new(
            image.x * self.zoom + self.pan.x + canvas_origin.x,
            image.y * self.zoom + self.pan.y + canvas_origin.y,
        )
    }

    /// Zoom to `new_zoom` keeping the image point under the cursor fixed.
    ///
    /// The algorithm:
    /// 1. Find the image-space point under the cursor
    /// 2. After zooming, adjust pan so that same point stays under cursor
    pub fn zoom_to_cursor(&self, new_zoom: f32, cursor: Point, canvas_origin: Point) -> Self {
        let new_zoom = clamp_zoom(new_zoom);
        let anchor = self.screen_to_image(cursor, canvas_origin);
        let rel_x = cursor.x - canvas_origin.x;
        let rel_y = cursor.y - canvas_origin.y;
        Self {
            zoom: new_zoom,
            pan: Point::new(rel_x - anchor.x * new_zoom, rel_y - anchor.y * new_zoom),
        }
    }

    /// Apply a pan delta to the transform.
    pub fn pan_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            zoom: self.zoom,
            pan: Point::new(self.pan.x + dx, self.pan.y + dy),
        }
    }

    /// Zoom in by one step, capped at the maximum zoom.
    pub fn zoom_in(&self) -> Self {
        Self {
            zoom: (self.zoom * zoom_const::FACTOR).min(zoom_const::MAX),
            pan: self.pan,
        }
    }

    /// Zoom out by one step, floored at the minimum zoom.
    pub fn zoom_out(&self) -> Self {
        Self {
            zoom: (self.zoom / zoom_const::FACTOR).max(zoom_const::MIN),
            pan: self.pan,
        }
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Clamp a zoom level to `[MIN, MAX]`.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() {
        zoom.clamp(zoom_const::MIN, zoom_const::MAX)
    } else {
        1.0
    }
}
