//! The region editor: session state and every operation on it.
//!
//! [`RegionEditor`] owns the reference image, the region list and its undo
//! history, the current tool and the view. Pointer and keyboard input are fed
//! in by the host; the editor answers with a [`Scene`] from [`RegionEditor::render`]
//! and with callbacks on its [`EditorHost`].
//!
//! The region list is never edited in place. Every change builds a new list and
//! swaps it in, and operations that finish an edit commit that list to history.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use web_time::{SystemTime, UNIX_EPOCH};

use crate::constants::canvas::MARGIN;
use crate::constants::zoom as zoom_const;
use crate::constants::region::{DEFAULT_OPTIONS, HANDLE_SIZE};
use crate::geometry::{self, Point};
use crate::history::{HistoryConfig, RegionHistory, Snapshot};
use crate::host::{EditorHost, NullHost};
use crate::input::{
    CursorStyle, EditorAction, Interaction, KeyEvent, PointerButton, PointerEvent, cursor_style,
};
use crate::keybindings::KeyBindings;
use crate::model::{Region, RegionType, Tool, auto_name, parse_options};
use crate::render::{self, Preview, RenderState, Scene};
use crate::source_image::{ImageError, LoadedImage};
use crate::view::{ViewTransform, clamp_zoom};

/// Load state of the reference image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageState {
    /// Nothing loaded yet; the canvas is not interactive.
    #[default]
    Empty,
    Ready(LoadedImage),
    /// The first image failed to decode. Holds the error message.
    Failed(String),
}

/// Behaviour switches for an editor, usually built from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub history: HistoryConfig,
    /// Drop zero-width or zero-height drags instead of creating a region.
    pub discard_degenerate_regions: bool,
    pub keybindings: KeyBindings,
    pub default_region_type: RegionType,
    pub default_options: String,
    pub show_grid: bool,
    pub show_ruler: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            discard_degenerate_regions: false,
            keybindings: KeyBindings::default(),
            default_region_type: RegionType::default(),
            default_options: DEFAULT_OPTIONS.to_string(),
            show_grid: false,
            show_ruler: false,
        }
    }
}

/// Properties applied to the next drawn region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawProps {
    pub region_type: RegionType,
    /// Comma-separated options for multiple choice regions.
    pub options: String,
}

/// Region ids: `"{type}_{unix_millis}"`, bumped so two regions created in the
/// same millisecond still differ.
#[derive(Debug, Default)]
struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    fn next(&mut self, region_type: RegionType) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let millis = now.max(self.last.saturating_add(1));
        self.last = millis;
        format!("{}_{}", region_type.key(), millis)
    }
}

/// An editing session over one reference image.
pub struct RegionEditor {
    image: ImageState,
    regions: Snapshot,
    history: RegionHistory,
    selected: Option<String>,
    tool: Tool,
    props: DrawProps,
    interaction: Interaction,
    view: ViewTransform,
    show_grid: bool,
    show_ruler: bool,
    canvas_origin: Point,
    ids: IdGenerator,
    settings: EditorSettings,
    host: Box<dyn EditorHost>,
    /// Last value sent through `on_unsaved_changes`.
    unsaved_signalled: bool,
}

impl Default for RegionEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl RegionEditor {
    /// Create an editor with no host attached.
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_host(settings, NullHost)
    }

    pub fn with_host(settings: EditorSettings, host: impl EditorHost + 'static) -> Self {
        Self {
            image: ImageState::Empty,
            regions: Snapshot::from(Vec::new()),
            history: RegionHistory::with_config(settings.history),
            selected: None,
            tool: Tool::default(),
            props: DrawProps {
                region_type: settings.default_region_type,
                options: settings.default_options.clone(),
            },
            interaction: Interaction::Idle,
            view: ViewTransform::identity(),
            show_grid: settings.show_grid,
            show_ruler: settings.show_ruler,
            canvas_origin: Point::default(),
            ids: IdGenerator::default(),
            settings,
            host: Box::new(host),
            unsaved_signalled: false,
        }
    }

    // =========================================================================
    // Image
    // =========================================================================

    /// Decode `bytes` and start a fresh session on it.
    ///
    /// On failure an already loaded session is left untouched; with nothing
    /// loaded the editor moves to [`ImageState::Failed`].
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), ImageError> {
        match LoadedImage::from_bytes(bytes) {
            Ok(image) => {
                self.set_image(image);
                Ok(())
            }
            Err(err) => {
                log::warn!("Failed to load reference image: {}", err);
                if !matches!(self.image, ImageState::Ready(_)) {
                    self.image = ImageState::Failed(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Replace the image, dropping every region and all history.
    pub fn set_image(&mut self, image: LoadedImage) {
        log::info!("Editing {}x{} reference image", image.width, image.height);
        self.image = ImageState::Ready(image);
        self.selected = None;
        self.interaction = Interaction::Idle;
        self.view = ViewTransform::identity();
        self.replace_regions(Snapshot::from(Vec::new()));
        self.history.reset(Arc::clone(&self.regions));
    }

    pub fn image_state(&self) -> &ImageState {
        &self.image
    }

    /// The loaded image, if ready.
    pub fn image(&self) -> Option<&LoadedImage> {
        match &self.image {
            ImageState::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Canvas size in pixels: the image plus room for the rulers.
    pub fn canvas_size(&self) -> (u32, u32) {
        match self.image() {
            Some(image) => (
                image.width.saturating_add(MARGIN),
                image.height.saturating_add(MARGIN),
            ),
            None => (MARGIN, MARGIN),
        }
    }

    /// Screen position of the canvas' top-left corner.
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.canvas_origin = origin;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selected.as_deref().and_then(|id| self.region(id))
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn draw_props(&self) -> &DrawProps {
        &self.props
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn history(&self) -> &RegionHistory {
        &self.history
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn show_ruler(&self) -> bool {
        self.show_ruler
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Whether the host was last told there is unsaved work.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_signalled
    }

    pub fn cursor_style(&self) -> CursorStyle {
        cursor_style(self.tool, &self.interaction)
    }

    // =========================================================================
    // Tool and draw properties
    // =========================================================================

    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            log::debug!("Tool: {} -> {}", self.tool.name(), tool.name());
        }
        self.tool = tool;
    }

    /// Type for the next drawn region.
    pub fn set_draw_type(&mut self, region_type: RegionType) {
        self.props.region_type = region_type;
    }

    /// Options string for the next drawn multiple choice region.
    pub fn set_draw_options(&mut self, options: impl Into<String>) {
        self.props.options = options.into();
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    fn to_image(&self, client: Point) -> Point {
        self.view.screen_to_image(client, self.canvas_origin)
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        if event.button != PointerButton::Primary || self.image().is_none() {
            return;
        }
        let point = self.to_image(event.position);
        match self.tool {
            Tool::Hand => {
                self.interaction = Interaction::Panning {
                    last: event.position,
                };
            }
            Tool::Rectangle => {
                self.interaction = Interaction::Drawing {
                    start: point,
                    current: point,
                };
            }
            Tool::Select | Tool::Move => match self.grab_selected(point) {
                Some(interaction) => self.interaction = interaction,
                None => self.select_at(point),
            },
        }
        log::debug!("Pointer down ({}): {}", self.tool.name(), self.interaction.name());
    }

    /// Start resizing or moving the selected region if `point` hits it.
    fn grab_selected(&self, point: Point) -> Option<Interaction> {
        let region = self.selected_region()?;
        if !region.visible {
            return None;
        }
        if region.locked {
            log::debug!("Region {} is locked", region.id);
            return None;
        }
        let id = region.id.clone();
        let original = region.coordinates;
        if let Some(handle) = geometry::handle_at(original, point, HANDLE_SIZE, self.view.zoom) {
            return Some(Interaction::Resizing {
                id,
                handle,
                original,
            });
        }
        region.contains(point).then_some(Interaction::Moving {
            id,
            start: point,
            original,
        })
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let point = self.to_image(event.position);
        match self.interaction.clone() {
            Interaction::Idle => {}
            Interaction::Panning { last } => {
                self.view = self
                    .view
                    .pan_by(event.position.x - last.x, event.position.y - last.y);
                self.interaction = Interaction::Panning {
                    last: event.position,
                };
            }
            Interaction::Resizing {
                id,
                handle,
                original,
            } => {
                let coordinates = geometry::resize(original, handle, point);
                self.update_region(&id, |r| r.coordinates = coordinates);
            }
            Interaction::Moving {
                id,
                start,
                original,
            } => {
                let coordinates = geometry::move_by(original, point.x - start.x, point.y - start.y);
                self.update_region(&id, |r| r.coordinates = coordinates);
            }
            Interaction::Drawing { start, .. } => {
                self.interaction = Interaction::Drawing {
                    start,
                    current: point,
                };
            }
        }
    }

    /// Finish the active interaction. A drawn region ends at the last
    /// `pointer_move` position, the corner the preview showed.
    pub fn pointer_up(&mut self, _event: PointerEvent) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Panning { .. } => {}
            Interaction::Resizing { id, .. } | Interaction::Moving { id, .. } => {
                log::debug!("Finished dragging {}", id);
                self.commit();
            }
            Interaction::Drawing { start, current } => self.finish_drawing(start, current),
        }
    }

    fn finish_drawing(&mut self, start: Point, end: Point) {
        let coordinates = [start.x, start.y, end.x, end.y];
        if self.settings.discard_degenerate_regions && geometry::is_degenerate(coordinates) {
            log::debug!("Discarding zero-area region {:?}", coordinates);
            return;
        }

        let region_type = self.props.region_type;
        let region = Region::new(
            self.ids.next(region_type),
            auto_name(region_type, &self.regions),
            region_type,
            coordinates,
            &self.props.options,
        );
        log::debug!("Created {} '{}' at {:?}", region.id, region.name, coordinates);
        let id = region.id.clone();

        let mut regions = self.regions.to_vec();
        regions.push(region);
        self.replace_regions(regions.into());
        self.commit();
        self.selected = Some(id);
        self.set_tool(Tool::Select);
    }

    /// The region being drawn, for rendering.
    pub fn preview(&self) -> Option<Preview> {
        match self.interaction {
            Interaction::Drawing { start, current } => Some(Preview {
                coordinates: [start.x, start.y, current.x, current.y],
                region_type: self.props.region_type,
            }),
            _ => None,
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select the region with `id`, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .and_then(|id| self.region(id))
            .map(|region| region.id.clone());
    }

    /// Select the topmost visible region containing the image point, or nothing.
    pub fn select_at(&mut self, point: Point) {
        self.selected = self
            .regions
            .iter()
            .rev()
            .find(|r| r.visible && r.contains(point))
            .map(|r| r.id.clone());
        log::debug!("Selected {:?}", self.selected);
    }

    // =========================================================================
    // Region edits
    // =========================================================================

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected.take() else {
            return false;
        };
        let regions: Vec<Region> = self.regions.iter().filter(|r| r.id != id).cloned().collect();
        if regions.len() == self.regions.len() {
            return false;
        }
        log::debug!("Deleted {}", id);
        if self.interaction_target() == Some(id.as_str()) {
            self.interaction = Interaction::Idle;
        }
        self.replace_regions(regions.into());
        self.commit();
        true
    }

    pub fn rename_selected(&mut self, name: &str) -> bool {
        self.edit_selected(|r| r.name = name.to_string())
    }

    /// Retype the selected region and give it a fresh name for its new type.
    pub fn set_selected_type(&mut self, region_type: RegionType) -> bool {
        let Some(id) = self.selected.clone() else {
            return false;
        };
        let others: Vec<Region> = self.regions.iter().filter(|r| r.id != id).cloned().collect();
        let name = auto_name(region_type, &others);
        let default_options = self.props.options.clone();
        self.edit_selected(|r| {
            r.set_type(region_type, &default_options);
            r.name = name;
        })
    }

    /// Replace the options of the selected multiple choice region.
    pub fn set_selected_options(&mut self, options: &str) -> bool {
        if !self
            .selected_region()
            .is_some_and(|r| r.region_type.has_options())
        {
            return false;
        }
        let options = parse_options(options);
        self.edit_selected(|r| r.options = Some(options))
    }

    pub fn set_selected_stroke_width(&mut self, width: f32) -> bool {
        if !width.is_finite() || width <= 0.0 {
            log::debug!("Ignoring stroke width {}", width);
            return false;
        }
        self.edit_selected(|r| r.stroke_width = width)
    }

    /// Show or hide a region. Not recorded in history.
    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        self.update_region(id, |r| r.visible = !r.visible)
    }

    /// Lock or unlock a region. Not recorded in history.
    pub fn toggle_lock(&mut self, id: &str) -> bool {
        self.update_region(id, |r| r.locked = !r.locked)
    }

    /// Region being dragged by the active interaction.
    fn interaction_target(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::Resizing { id, .. } | Interaction::Moving { id, .. } => Some(id.as_str()),
            _ => None,
        }
    }

    /// Apply `edit` to the selected region and commit.
    fn edit_selected<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut Region),
    {
        let Some(id) = self.selected.clone() else {
            log::debug!("No region selected");
            return false;
        };
        if !self.update_region(&id, edit) {
            return false;
        }
        self.commit();
        true
    }

    /// Swap in a copy of the list with region `id` edited. Does not commit.
    fn update_region<F>(&mut self, id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut Region),
    {
        let Some(index) = self.regions.iter().position(|r| r.id == id) else {
            return false;
        };
        let mut regions = self.regions.to_vec();
        edit(&mut regions[index]);
        self.replace_regions(regions.into());
        true
    }

    fn replace_regions(&mut self, regions: Snapshot) {
        self.regions = regions;
        let has_unsaved = !self.regions.is_empty();
        if has_unsaved != self.unsaved_signalled {
            self.unsaved_signalled = has_unsaved;
            self.host.on_unsaved_changes(has_unsaved);
        }
    }

    fn commit(&mut self) {
        self.history.commit(Arc::clone(&self.regions));
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.interaction = Interaction::Idle;
        self.replace_regions(snapshot);
        if self.selected_region().is_none() {
            self.selected = None;
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn zoom_in(&mut self) {
        self.view = self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view = self.view.zoom_out();
    }

    /// Zoom to `zoom`, keeping the image point under `cursor` in place.
    pub fn zoom_at(&mut self, zoom: f32, cursor: Point) {
        if (clamp_zoom(zoom) - self.view.zoom).abs() < zoom_const::CHANGE_THRESHOLD {
            return;
        }
        self.view = self.view.zoom_to_cursor(zoom, cursor, self.canvas_origin);
    }

    pub fn reset_view(&mut self) {
        self.view = ViewTransform::identity();
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    pub fn toggle_ruler(&mut self) {
        self.show_ruler = !self.show_ruler;
    }

    // =========================================================================
    // Save, keyboard, rendering
    // =========================================================================

    /// Hand the regions and image to the host. Does nothing without an image.
    pub fn save(&mut self) -> bool {
        let ImageState::Ready(image) = &self.image else {
            log::warn!("Save ignored: no image loaded");
            return false;
        };
        log::info!("Saving {} regions", self.regions.len());
        self.host.on_save(&self.regions, image);
        self.unsaved_signalled = false;
        self.host.on_unsaved_changes(false);
        true
    }

    /// Run the shortcut bound to `event`. Returns whether it was handled.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        match self.settings.keybindings.action_for(event) {
            Some(action) => {
                self.apply(action);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, action: EditorAction) {
        log::debug!("Action: {:?}", action);
        match action {
            EditorAction::DeleteSelected => {
                self.delete_selected();
            }
            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }
            EditorAction::Save => {
                self.save();
            }
            EditorAction::Cancel => {
                self.selected = None;
                self.set_tool(Tool::Select);
            }
            EditorAction::SetTool(tool) => self.set_tool(tool),
            EditorAction::ToggleGrid => self.toggle_grid(),
            EditorAction::ToggleRuler => self.toggle_ruler(),
            EditorAction::ZoomIn => self.zoom_in(),
            EditorAction::ZoomOut => self.zoom_out(),
        }
    }

    /// Full redraw of the current state.
    pub fn render(&self) -> Scene {
        let (canvas_width, canvas_height) = self.canvas_size();
        let load_error = match &self.image {
            ImageState::Failed(message) => Some(message.as_str()),
            _ => None,
        };
        render::render(&RenderState {
            image: self.image(),
            load_error,
            regions: &self.regions,
            selected: self.selected.as_deref(),
            preview: self.preview(),
            view: self.view,
            show_grid: self.show_grid,
            show_ruler: self.show_ruler,
            canvas_width,
            canvas_height,
        })
    }
}
