//! sheetmark session replay driver.
//!
//! Loads a reference image, replays a scripted editing session against a
//! mounted editor and writes the template configuration whenever the session
//! saves.
//!
//! ```text
//! sheetmark <image> <session.json> [--name NAME] [--out FILE] [--config FILE]
//! sheetmark --init-config [--config FILE]
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = driver::run(std::env::args().skip(1)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// No filesystem or stdout on WASM; hosts embed the library directly.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod driver {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use serde::Deserialize;

    use sheetmark::editor::{EditorSettings, RegionEditor};
    use sheetmark::error::{EditorError, Result};
    use sheetmark::geometry::Point;
    use sheetmark::host::{EditorHost, KeyboardHub, MountedEditor};
    use sheetmark::input::{Key, KeyEvent, Modifiers, PointerButton, PointerEvent};
    use sheetmark::model::{Region, RegionType, Tool};
    use sheetmark::source_image::LoadedImage;
    use sheetmark::template::{TemplateConfig, TemplateError};
    use sheetmark::EditorConfig;

    const USAGE: &str = "usage: sheetmark <image> <session.json> [--name NAME] [--out FILE] [--config FILE]
       sheetmark --init-config [--config FILE]";

    /// What the command line asks for.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Command {
        /// Replay a session against an image.
        Replay(Args),
        /// Write a default config file, to `path` or the default location.
        InitConfig { path: Option<PathBuf> },
    }

    /// Parsed command line.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Args {
        pub image: PathBuf,
        pub session: PathBuf,
        pub name: String,
        pub out: Option<PathBuf>,
        pub config: Option<PathBuf>,
    }

    impl Command {
        pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
            let mut positional = Vec::new();
            let mut name = None;
            let mut out = None;
            let mut config = None;
            let mut init_config = false;

            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                let slot = match arg.as_str() {
                    "--name" => &mut name,
                    "--out" => &mut out,
                    "--config" => &mut config,
                    "--init-config" => {
                        init_config = true;
                        continue;
                    }
                    "-h" | "--help" => return Err(EditorError::Usage(USAGE.to_string())),
                    flag if flag.starts_with("--") => {
                        return Err(EditorError::Usage(format!("unknown option {}\n{}", flag, USAGE)));
                    }
                    _ => {
                        positional.push(arg);
                        continue;
                    }
                };
                let value = args
                    .next()
                    .ok_or_else(|| EditorError::Usage(format!("{} needs a value\n{}", arg, USAGE)))?;
                *slot = Some(value);
            }

            if init_config {
                if !positional.is_empty() || name.is_some() || out.is_some() {
                    return Err(EditorError::Usage(format!(
                        "--init-config takes only --config\n{}",
                        USAGE
                    )));
                }
                return Ok(Command::InitConfig {
                    path: config.map(PathBuf::from),
                });
            }

            let [image, session]: [String; 2] = positional
                .try_into()
                .map_err(|_| EditorError::Usage(USAGE.to_string()))?;
            let image = PathBuf::from(image);
            let name = name.unwrap_or_else(|| {
                image
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "template".to_string())
            });

            Ok(Command::Replay(Args {
                image,
                session: PathBuf::from(session),
                name,
                out: out.map(PathBuf::from),
                config: config.map(PathBuf::from),
            }))
        }
    }

    /// One scripted input. Pointer positions are device coordinates.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(tag = "step", rename_all = "snake_case")]
    pub enum SessionStep {
        CanvasOrigin {
            x: f32,
            y: f32,
        },
        PointerDown {
            x: f32,
            y: f32,
            #[serde(default)]
            button: PointerButton,
        },
        PointerMove {
            x: f32,
            y: f32,
        },
        PointerUp {
            x: f32,
            y: f32,
        },
        /// Down, move and up in one step.
        Drag {
            from: [f32; 2],
            to: [f32; 2],
        },
        Key {
            key: Key,
            #[serde(default)]
            modifiers: Modifiers,
        },
        Tool {
            tool: Tool,
        },
        DrawType {
            region_type: RegionType,
        },
        DrawOptions {
            options: String,
        },
        Rename {
            name: String,
        },
        Retype {
            region_type: RegionType,
        },
        SetOptions {
            options: String,
        },
        StrokeWidth {
            width: f32,
        },
        ToggleVisibility,
        ToggleLock,
        ZoomIn,
        ZoomOut,
        ZoomAt {
            zoom: f32,
            x: f32,
            y: f32,
        },
        ResetView,
        ToggleGrid,
        ToggleRuler,
        Undo,
        Redo,
        Delete,
        Save,
    }

    /// Writes the template configuration on every save.
    struct TemplateWriter {
        name: String,
        out: Option<PathBuf>,
        saves: Rc<RefCell<usize>>,
        error: Rc<RefCell<Option<TemplateError>>>,
    }

    impl TemplateWriter {
        fn write(&self, regions: &[Region]) -> std::result::Result<(), TemplateError> {
            let config = TemplateConfig::from_regions(&self.name, regions);
            match &self.out {
                Some(path) => config.write_to(path),
                None => {
                    println!("{}", config.to_json()?);
                    Ok(())
                }
            }
        }
    }

    impl EditorHost for TemplateWriter {
        fn on_save(&mut self, regions: &[Region], image: &LoadedImage) {
            log::info!(
                "Saving template '{}' for {}x{} {} image",
                self.name,
                image.width,
                image.height,
                image.mime_type
            );
            *self.saves.borrow_mut() += 1;
            if let Err(e) = self.write(regions) {
                log::error!("Failed to write template: {}", e);
                *self.error.borrow_mut() = Some(e);
            }
        }

        fn on_unsaved_changes(&mut self, has_unsaved: bool) {
            log::debug!("Unsaved changes: {}", has_unsaved);
        }
    }

    fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig> {
        match path {
            Some(path) => Ok(EditorConfig::load_from(path)?),
            None => Ok(EditorConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    fn init_config(path: Option<PathBuf>) -> Result<()> {
        let config = EditorConfig::default();
        let path = match path {
            Some(path) => {
                config.save_to(&path)?;
                path
            }
            None => config.save_to_default_path()?,
        };
        println!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    pub fn parse_session(json: &str) -> Result<Vec<SessionStep>> {
        serde_json::from_str(json).map_err(|e| EditorError::Session(e.to_string()))
    }

    pub fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
        let args = match Command::parse(args)? {
            Command::Replay(args) => args,
            Command::InitConfig { path } => return init_config(path),
        };
        let config = load_config(args.config.as_ref())?;

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let steps = parse_session(&std::fs::read_to_string(&args.session)?)?;
        let image = std::fs::read(&args.image)?;

        let saves = Rc::new(RefCell::new(0));
        let error = Rc::new(RefCell::new(None));
        let writer = TemplateWriter {
            name: args.name.clone(),
            out: args.out.clone(),
            saves: Rc::clone(&saves),
            error: Rc::clone(&error),
        };

        let mut editor = RegionEditor::with_host(EditorSettings::from(&config), writer);
        editor.load_image(&image)?;

        let hub = KeyboardHub::new();
        let mounted = MountedEditor::mount(editor, &hub);
        log::info!("Replaying {} steps from {:?}", steps.len(), args.session);
        replay(&mounted, &hub, steps);
        mounted.unmount();

        if let Some(e) = error.borrow_mut().take() {
            return Err(e.into());
        }
        if *saves.borrow() == 0 {
            log::warn!("Session never saved; no template written");
        }
        Ok(())
    }

    pub fn replay(mounted: &MountedEditor, hub: &KeyboardHub, steps: Vec<SessionStep>) {
        for (index, step) in steps.into_iter().enumerate() {
            log::debug!("Step {}: {:?}", index + 1, step);
            match step {
                SessionStep::Key { key, modifiers } => {
                    if !hub.dispatch(&KeyEvent::new(key, modifiers)) {
                        log::debug!("Key {:?} is not bound", key);
                    }
                }
                step => apply(&mut mounted.editor().borrow_mut(), step),
            }
        }
    }

    fn apply(editor: &mut RegionEditor, step: SessionStep) {
        match step {
            SessionStep::CanvasOrigin { x, y } => editor.set_canvas_origin(Point::new(x, y)),
            SessionStep::PointerDown { x, y, button } => editor.pointer_down(PointerEvent {
                position: Point::new(x, y),
                button,
            }),
            SessionStep::PointerMove { x, y } => editor.pointer_move(PointerEvent::at(x, y)),
            SessionStep::PointerUp { x, y } => editor.pointer_up(PointerEvent::at(x, y)),
            SessionStep::Drag { from, to } => {
                editor.pointer_down(PointerEvent::at(from[0], from[1]));
                editor.pointer_move(PointerEvent::at(to[0], to[1]));
                editor.pointer_up(PointerEvent::at(to[0], to[1]));
            }
            SessionStep::Key { key, modifiers } => {
                editor.handle_key(&KeyEvent::new(key, modifiers));
            }
            SessionStep::Tool { tool } => editor.set_tool(tool),
            SessionStep::DrawType { region_type } => {
                log::info!("Drawing {} regions", region_type.label());
                editor.set_draw_type(region_type);
            }
            SessionStep::DrawOptions { options } => editor.set_draw_options(options),
            SessionStep::Rename { name } => {
                editor.rename_selected(&name);
            }
            SessionStep::Retype { region_type } => {
                editor.set_selected_type(region_type);
            }
            SessionStep::SetOptions { options } => {
                editor.set_selected_options(&options);
            }
            SessionStep::StrokeWidth { width } => {
                editor.set_selected_stroke_width(width);
            }
            SessionStep::ToggleVisibility => {
                if let Some(id) = editor.selected_id().map(str::to_string) {
                    editor.toggle_visibility(&id);
                }
            }
            SessionStep::ToggleLock => {
                if let Some(id) = editor.selected_id().map(str::to_string) {
                    editor.toggle_lock(&id);
                }
            }
            SessionStep::ZoomIn => editor.zoom_in(),
            SessionStep::ZoomOut => editor.zoom_out(),
            SessionStep::ZoomAt { zoom, x, y } => editor.zoom_at(zoom, Point::new(x, y)),
            SessionStep::ResetView => editor.reset_view(),
            SessionStep::ToggleGrid => editor.toggle_grid(),
            SessionStep::ToggleRuler => editor.toggle_ruler(),
            SessionStep::Undo => {
                editor.undo();
            }
            SessionStep::Redo => {
                editor.redo();
            }
            SessionStep::Delete => {
                editor.delete_selected();
            }
            SessionStep::Save => {
                editor.save();
            }
        }
    }

}
