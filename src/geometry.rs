//! Region geometry: normalization, hit-testing, resize handles and transforms.
//!
//! Everything here is a pure function over `[x1, y1, x2, y2]` coordinates.
//! Drag operations always start from the region as it was at pointer-down, so
//! rounding never compounds across move events.

use serde::{Deserialize, Serialize};

/// Two-point rectangle `[x1, y1, x2, y2]` in image pixels.
pub type Coordinates = [f32; 4];

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One of the eight resize handles of a selected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Nw,
    Ne,
    Se,
    Sw,
    N,
    E,
    S,
    W,
}

impl Handle {
    /// All handles, in hit-test priority order (corners first).
    pub fn all() -> &'static [Handle] {
        &[
            Handle::Nw,
            Handle::Ne,
            Handle::Se,
            Handle::Sw,
            Handle::N,
            Handle::E,
            Handle::S,
            Handle::W,
        ]
    }

    /// Position of this handle on the given (un-normalized) coordinates.
    pub fn position(&self, coords: Coordinates) -> Point {
        let [x1, y1, x2, y2] = coords;
        let mid_x = (x1 + x2) / 2.0;
        let mid_y = (y1 + y2) / 2.0;
        match self {
            Handle::Nw => Point::new(x1, y1),
            Handle::Ne => Point::new(x2, y1),
            Handle::Se => Point::new(x2, y2),
            Handle::Sw => Point::new(x1, y2),
            Handle::N => Point::new(mid_x, y1),
            Handle::E => Point::new(x2, mid_y),
            Handle::S => Point::new(mid_x, y2),
            Handle::W => Point::new(x1, mid_y),
        }
    }
}

/// Normalize to `[x_min, y_min, x_max, y_max]`.
pub fn normalize(coords: Coordinates) -> Coordinates {
    let [x1, y1, x2, y2] = coords;
    [x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)]
}

/// Check if a point lies inside the rectangle (edges inclusive), in either
/// corner order.
pub fn contains(coords: Coordinates, point: Point) -> bool {
    let [x_min, y_min, x_max, y_max] = normalize(coords);
    point.x >= x_min && point.x <= x_max && point.y >= y_min && point.y <= y_max
}

/// Whether the rectangle has zero width or height.
pub fn is_degenerate(coords: Coordinates) -> bool {
    let [x1, y1, x2, y2] = coords;
    x1 == x2 || y1 == y2
}

/// Find the handle under `point`.
///
/// A handle matches when both axis distances are below `threshold / zoom`, so
/// the clickable area has a constant size on screen.
pub fn handle_at(coords: Coordinates, point: Point, threshold: f32, zoom: f32) -> Option<Handle> {
    let size = threshold / zoom;
    Handle::all().iter().copied().find(|handle| {
        let p = handle.position(coords);
        (point.x - p.x).abs() < size && (point.y - p.y).abs() < size
    })
}

/// Resize `original` by dragging `handle` to `pointer`.
///
/// Corner handles replace one x and one y value, edge handles a single value.
pub fn resize(original: Coordinates, handle: Handle, pointer: Point) -> Coordinates {
    let [x1, y1, x2, y2] = original;
    let (px, py) = (pointer.x, pointer.y);
    match handle {
        Handle::Nw => [px, py, x2, y2],
        Handle::Ne => [x1, py, px, y2],
        Handle::Se => [x1, y1, px, py],
        Handle::Sw => [px, y1, x2, py],
        Handle::N => [x1, py, x2, y2],
        Handle::E => [x1, y1, px, y2],
        Handle::S => [x1, y1, x2, py],
        Handle::W => [px, y1, x2, y2],
    }
}

/// Translate `original` by `(dx, dy)`: even indices are x, odd indices are y.
pub fn move_by(original: Coordinates, dx: f32, dy: f32) -> Coordinates {
    let mut moved = original;
    for (index, value) in moved.iter_mut().enumerate() {
        *value += if index % 2 == 0 { dx } else { dy };
    }
    moved
}
