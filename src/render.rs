//! Canvas renderer.
//!
//! Rendering is a pure function from editor state to a [`Scene`]: an ordered
//! list of 2D canvas commands that any backend can replay. Every state change
//! produces a complete clear-and-redraw scene; there is no incremental update.
//!
//! Draw order, back to front:
//! clear, pan/zoom transform, image, grid, regions, selection handles,
//! in-progress region, then the screen-space ruler.

use crate::color::Color;
use crate::constants::{canvas, region as region_const};
use crate::geometry::{Coordinates, Handle, Point};
use crate::model::{Region, RegionType};
use crate::source_image::LoadedImage;
use crate::view::ViewTransform;

const GRID_COLOR: Color = Color::from_u32(0xDDDDDD);
const HANDLE_STROKE_COLOR: Color = Color::from_u32(0x0066CC);
const RULER_COLOR: Color = Color::from_u32(0x333333);
const ERROR_COLOR: Color = Color::from_u32(0xDC2626);

/// Rectangle in canvas drawing terms: origin plus signed size, so a region
/// dragged "backwards" keeps a negative width exactly like a 2D canvas call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn from_coordinates(coords: Coordinates) -> Self {
        let [x1, y1, x2, y2] = coords;
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Square of side `size` centered on `center`.
    pub fn centered(center: Point, size: f32) -> Self {
        Self {
            x: center.x - size / 2.0,
            y: center.y - size / 2.0,
            width: size,
            height: size,
        }
    }
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the whole canvas.
    Clear { width: u32, height: u32 },
    /// Translate then scale all following commands until the matching pop.
    PushTransform { translate: Point, scale: f32 },
    PopTransform,
    /// Draw the reference image with its top-left corner at the origin.
    Image { width: u32, height: u32 },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    FillRect {
        rect: CanvasRect,
        color: Color,
        alpha: f32,
    },
    StrokeRect {
        rect: CanvasRect,
        color: Color,
        alpha: f32,
        width: f32,
        /// Dash and gap lengths; `None` draws a solid line.
        dash: Option<[f32; 2]>,
    },
    /// Text with its baseline starting at `position`, rotated by `rotation` radians.
    Text {
        position: Point,
        text: String,
        color: Color,
        size: f32,
        rotation: f32,
    },
}

/// The output of one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Iterate over the commands in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All text strings in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A region being drawn but not yet committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub coordinates: Coordinates,
    pub region_type: RegionType,
}

/// Everything the renderer reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub image: Option<&'a LoadedImage>,
    /// Shown in place of the image when loading failed.
    pub load_error: Option<&'a str>,
    pub regions: &'a [Region],
    pub selected: Option<&'a str>,
    pub preview: Option<Preview>,
    pub view: ViewTransform,
    pub show_grid: bool,
    pub show_ruler: bool,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// Produce a full redraw of `state`.
pub fn render(state: &RenderState<'_>) -> Scene {
    let mut scene = Scene::default();
    scene.push(DrawCommand::Clear {
        width: state.canvas_width,
        height: state.canvas_height,
    });

    let Some(image) = state.image else {
        if let Some(message) = state.load_error {
            scene.push(DrawCommand::Text {
                position: Point::new(canvas::RULER_OFFSET, 2.0 * canvas::RULER_OFFSET),
                text: message.to_string(),
                color: ERROR_COLOR,
                size: region_const::LABEL_FONT_SIZE,
                rotation: 0.0,
            });
        }
        return scene;
    };

    let zoom = state.view.zoom;
    scene.push(DrawCommand::PushTransform {
        translate: state.view.pan,
        scale: zoom,
    });
    scene.push(DrawCommand::Image {
        width: image.width,
        height: image.height,
    });

    if state.show_grid {
        draw_grid(&mut scene, image, zoom);
    }

    for region in state.regions.iter().filter(|r| r.visible) {
        draw_region(&mut scene, region, zoom);
    }

    if let Some(selected) = state
        .selected
        .and_then(|id| state.regions.iter().find(|r| r.id == id))
        .filter(|r| r.visible)
    {
        draw_handles(&mut scene, selected.coordinates, zoom);
    }

    if let Some(preview) = state.preview {
        draw_preview(&mut scene, preview, zoom);
    }

    scene.push(DrawCommand::PopTransform);

    if state.show_ruler {
        draw_ruler(&mut scene, state.canvas_width, state.canvas_height);
    }

    scene
}

fn draw_grid(scene: &mut Scene, image: &LoadedImage, zoom: f32) {
    let width = image.width as f32;
    let height = image.height as f32;
    let line_width = 1.0 / zoom;

    let mut x = 0.0;
    while x < width {
        scene.push(DrawCommand::Line {
            from: Point::new(x, 0.0),
            to: Point::new(x, height),
            color: GRID_COLOR,
            width: line_width,
        });
        x += canvas::GRID_SPACING;
    }

    let mut y = 0.0;
    while y < height {
        scene.push(DrawCommand::Line {
            from: Point::new(0.0, y),
            to: Point::new(width, y),
            color: GRID_COLOR,
            width: line_width,
        });
        y += canvas::GRID_SPACING;
    }
}

fn draw_region(scene: &mut Scene, region: &Region, zoom: f32) {
    let rect = CanvasRect::from_coordinates(region.coordinates);
    scene.push(DrawCommand::FillRect {
        rect,
        color: region.fill_color,
        alpha: region.opacity,
    });
    scene.push(DrawCommand::StrokeRect {
        rect,
        color: region.color,
        alpha: region.opacity,
        width: region.stroke_width / zoom,
        dash: None,
    });

    let [x1, y1, _, _] = region.coordinates;
    scene.push(DrawCommand::Text {
        position: Point::new(x1, y1 - region_const::LABEL_OFFSET / zoom),
        text: region.label(),
        color: region.color,
        size: region_const::LABEL_FONT_SIZE / zoom,
        rotation: 0.0,
    });
}

fn draw_handles(scene: &mut Scene, coords: Coordinates, zoom: f32) {
    let size = region_const::HANDLE_SIZE / zoom;
    for handle in Handle::all() {
        let rect = CanvasRect::centered(handle.position(coords), size);
        scene.push(DrawCommand::FillRect {
            rect,
            color: Color::WHITE,
            alpha: 1.0,
        });
        scene.push(DrawCommand::StrokeRect {
            rect,
            color: HANDLE_STROKE_COLOR,
            alpha: 1.0,
            width: region_const::HANDLE_STROKE / zoom,
            dash: None,
        });
    }
}

fn draw_preview(scene: &mut Scene, preview: Preview, zoom: f32) {
    let style = preview.region_type.style();
    let rect = CanvasRect::from_coordinates(preview.coordinates);
    let dash = region_const::PREVIEW_DASH / zoom;
    scene.push(DrawCommand::FillRect {
        rect,
        color: style.fill_color,
        alpha: style.opacity,
    });
    scene.push(DrawCommand::StrokeRect {
        rect,
        color: style.color,
        alpha: style.opacity,
        width: region_const::PREVIEW_STROKE / zoom,
        dash: Some([dash, dash]),
    });
}

/// Tick labels every `RULER_SPACING` screen pixels along the top and left edges.
fn draw_ruler(scene: &mut Scene, canvas_width: u32, canvas_height: u32) {
    let mut x = 0.0;
    while x < canvas_width as f32 {
        scene.push(DrawCommand::Text {
            position: Point::new(x, canvas::RULER_OFFSET),
            text: format!("{}", x as u32),
            color: RULER_COLOR,
            size: canvas::RULER_FONT_SIZE,
            rotation: 0.0,
        });
        x += canvas::RULER_SPACING;
    }

    let mut y = 0.0;
    while y < canvas_height as f32 {
        scene.push(DrawCommand::Text {
            position: Point::new(canvas::RULER_OFFSET, y),
            text: format!("{}", y as u32),
            color: RULER_COLOR,
            size: canvas::RULER_FONT_SIZE,
            rotation: -std::f32::consts::FRAC_PI_2,
        });
        y += canvas::RULER_SPACING;
    }
}
