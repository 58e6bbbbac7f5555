use std::cell::RefCell;
use std::rc::Rc;

use image::ImageFormat;

use super::*;
use crate::color::Color;
use crate::geometry::Handle;
use crate::host::{KeyboardHub, MountedEditor};
use crate::input::{Key, Modifiers};
use crate::render::DrawCommand;
use crate::source_image::tests::encoded;

#[derive(Debug, Clone, PartialEq)]
enum HostEvent {
    Saved { regions: usize, width: u32 },
    Unsaved(bool),
}

#[derive(Clone, Default)]
struct RecordingHost {
    events: Rc<RefCell<Vec<HostEvent>>>,
}

impl EditorHost for RecordingHost {
    fn on_save(&mut self, regions: &[Region], image: &LoadedImage) {
        self.events.borrow_mut().push(HostEvent::Saved {
            regions: regions.len(),
            width: image.width,
        });
    }

    fn on_unsaved_changes(&mut self, has_unsaved: bool) {
        self.events.borrow_mut().push(HostEvent::Unsaved(has_unsaved));
    }
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn coords_eq(a: [f32; 4], b: [f32; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| approx_eq(*x, *y))
}

fn loaded_editor() -> RegionEditor {
    loaded_editor_with(EditorSettings::default())
}

fn loaded_editor_with(settings: EditorSettings) -> RegionEditor {
    let mut editor = RegionEditor::new(settings);
    editor
        .load_image(&encoded(300, 200, ImageFormat::Png))
        .expect("load test image");
    editor
}

fn drag(editor: &mut RegionEditor, from: (f32, f32), to: (f32, f32)) {
    editor.pointer_down(PointerEvent::at(from.0, from.1));
    editor.pointer_move(PointerEvent::at(to.0, to.1));
    editor.pointer_up(PointerEvent::at(to.0, to.1));
}

fn draw(editor: &mut RegionEditor, region_type: RegionType, from: (f32, f32), to: (f32, f32)) {
    editor.set_draw_type(region_type);
    editor.set_tool(Tool::Rectangle);
    drag(editor, from, to);
}

#[test]
fn test_n_draws_give_n_unique_ids() {
    let mut editor = loaded_editor();
    for i in 0..8 {
        let offset = i as f32 * 10.0;
        draw(
            &mut editor,
            RegionType::AnswerArea,
            (offset, offset),
            (offset + 20.0, offset + 15.0),
        );
    }
    assert_eq!(editor.regions().len(), 8);
    let mut ids: Vec<&str> = editor.regions().iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert!(ids.iter().all(|id| id.starts_with("answer_area_")));
}

#[test]
fn test_question_area_scenario() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::QuestionArea, (10.0, 10.0), (110.0, 60.0));

    assert_eq!(editor.regions().len(), 1);
    let region = &editor.regions()[0];
    assert!(coords_eq(region.bounds(), [10.0, 10.0, 110.0, 60.0]));
    assert_eq!(region.name, "q1");
    assert_eq!(region.color, Color::from_u32(0xF59E0B));
    assert_eq!(region.fill_color, region.color);
    assert!(approx_eq(region.opacity, 0.15));
    assert_eq!(region.options, None);

    // Finishing a draw selects the region and returns to the select tool
    assert_eq!(editor.selected_id(), Some(region.id.as_str()));
    assert_eq!(editor.tool(), Tool::Select);
}

#[test]
fn test_two_multiple_choice_draws() {
    let mut editor = loaded_editor();
    editor.set_draw_options("A, B, C, D");
    draw(&mut editor, RegionType::MultipleChoice, (0.0, 0.0), (50.0, 50.0));
    draw(&mut editor, RegionType::MultipleChoice, (60.0, 0.0), (110.0, 50.0));

    let names: Vec<&str> = editor.regions().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["mc1", "mc2"]);
    for region in editor.regions() {
        assert_eq!(
            region.options.as_deref(),
            Some(&["A", "B", "C", "D"].map(String::from)[..])
        );
    }
}

#[test]
fn test_draw_commits_previewed_corner() {
    let mut editor = loaded_editor();
    editor.pointer_down(PointerEvent::at(10.0, 10.0));
    editor.pointer_move(PointerEvent::at(110.0, 60.0));
    assert_eq!(
        editor.preview().map(|p| p.coordinates),
        Some([10.0, 10.0, 110.0, 60.0])
    );

    // Release lands elsewhere with no move in between
    editor.pointer_up(PointerEvent::at(250.0, 190.0));
    assert_eq!(editor.regions().len(), 1);
    assert!(coords_eq(editor.regions()[0].coordinates, [10.0, 10.0, 110.0, 60.0]));
}

#[test]
fn test_new_editor_starts_drawing() {
    let editor = RegionEditor::default();
    assert_eq!(editor.tool(), Tool::Rectangle);
}

#[test]
fn test_backwards_draw_keeps_raw_coordinates() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::EssayArea, (100.0, 80.0), (20.0, 10.0));
    let region = &editor.regions()[0];
    assert!(coords_eq(region.coordinates, [100.0, 80.0, 20.0, 10.0]));
    assert!(coords_eq(region.bounds(), [20.0, 10.0, 100.0, 80.0]));
}

#[test]
fn test_undo_redo_round_trip() {
    let mut editor = loaded_editor();
    for i in 0..4 {
        let x = i as f32 * 30.0;
        draw(&mut editor, RegionType::ShortAnswer, (x, 0.0), (x + 20.0, 20.0));
    }
    let before = editor.regions().to_vec();

    for _ in 0..4 {
        assert!(editor.undo());
    }
    assert!(editor.regions().is_empty());
    assert!(!editor.undo());

    for _ in 0..4 {
        assert!(editor.redo());
    }
    assert_eq!(editor.regions(), &before[..]);
    assert!(!editor.redo());
}

#[test]
fn test_first_draw_is_undoable() {
    let mut editor = loaded_editor();
    assert!(!editor.can_undo());
    draw(&mut editor, RegionType::Signature, (0.0, 0.0), (10.0, 10.0));
    assert!(editor.can_undo());
    editor.undo();
    assert!(editor.regions().is_empty());
    assert_eq!(editor.selected_id(), None);
}

#[test]
fn test_new_commit_discards_redo() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::MathArea, (0.0, 0.0), (10.0, 10.0));
    draw(&mut editor, RegionType::MathArea, (20.0, 0.0), (30.0, 10.0));
    editor.undo();
    assert!(editor.can_redo());
    draw(&mut editor, RegionType::MathArea, (40.0, 0.0), (50.0, 10.0));
    assert!(!editor.can_redo());
    let names: Vec<&str> = editor.regions().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["math1", "math2"]);
}

#[test]
fn test_resize_se_and_nw_handles() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::AnswerArea, (10.0, 20.0), (110.0, 80.0));
    let id = editor.regions()[0].id.clone();

    // se handle at (110, 80); jitter through intermediate positions
    editor.pointer_down(PointerEvent::at(111.0, 81.0));
    assert!(matches!(
        editor.interaction(),
        Interaction::Resizing {
            handle: Handle::Se,
            ..
        }
    ));
    editor.pointer_move(PointerEvent::at(150.0, 150.0));
    editor.pointer_move(PointerEvent::at(123.0, 99.0));
    editor.pointer_up(PointerEvent::at(123.0, 99.0));
    let coords = editor.region(&id).map(|r| r.coordinates);
    assert_eq!(coords, Some([10.0, 20.0, 123.0, 99.0]));

    editor.pointer_down(PointerEvent::at(10.0, 20.0));
    editor.pointer_move(PointerEvent::at(5.0, 7.0));
    editor.pointer_up(PointerEvent::at(5.0, 7.0));
    let coords = editor.region(&id).map(|r| r.coordinates);
    assert_eq!(coords, Some([5.0, 7.0, 123.0, 99.0]));

    editor.undo();
    let coords = editor.region(&id).map(|r| r.coordinates);
    assert_eq!(coords, Some([10.0, 20.0, 123.0, 99.0]));
}

#[test]
fn test_move_applies_uniform_delta() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::StudentId, (10.0, 10.0), (60.0, 40.0));

    editor.pointer_down(PointerEvent::at(30.0, 25.0));
    assert!(matches!(editor.interaction(), Interaction::Moving { .. }));
    assert_eq!(editor.cursor_style(), CursorStyle::Move);
    editor.pointer_move(PointerEvent::at(31.0, 26.0));
    editor.pointer_move(PointerEvent::at(37.0, 21.0));
    editor.pointer_up(PointerEvent::at(37.0, 21.0));

    assert_eq!(editor.regions()[0].coordinates, [17.0, 6.0, 67.0, 36.0]);
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn test_pointer_mapping_uses_origin_pan_and_zoom() {
    let mut editor = loaded_editor();
    editor.set_canvas_origin(Point::new(100.0, 50.0));
    editor.zoom_at(2.0, Point::new(100.0, 50.0));
    draw(&mut editor, RegionType::AnswerArea, (120.0, 70.0), (220.0, 150.0));
    assert!(coords_eq(editor.regions()[0].coordinates, [10.0, 10.0, 60.0, 50.0]));
}

#[test]
fn test_handle_hit_area_scales_with_zoom() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::AnswerArea, (10.0, 10.0), (110.0, 60.0));
    editor.zoom_at(4.0, Point::default());

    // 6 image units from the se corner is 24 screen pixels: outside the handle
    editor.pointer_down(PointerEvent::at(104.0 * 4.0, 54.0 * 4.0));
    assert!(matches!(editor.interaction(), Interaction::Moving { .. }));
    editor.pointer_up(PointerEvent::at(104.0 * 4.0, 54.0 * 4.0));

    editor.pointer_down(PointerEvent::at(109.0 * 4.0, 59.0 * 4.0));
    assert!(matches!(editor.interaction(), Interaction::Resizing { .. }));
}

#[test]
fn test_select_picks_topmost_visible_region() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::QuestionArea, (0.0, 0.0), (100.0, 100.0));
    draw(&mut editor, RegionType::AnswerArea, (50.0, 50.0), (150.0, 150.0));
    let bottom = editor.regions()[0].id.clone();
    let top = editor.regions()[1].id.clone();

    editor.select(None);
    editor.pointer_down(PointerEvent::at(75.0, 75.0));
    editor.pointer_up(PointerEvent::at(75.0, 75.0));
    assert_eq!(editor.selected_id(), Some(top.as_str()));

    editor.toggle_visibility(&top);
    editor.select(None);
    editor.pointer_down(PointerEvent::at(75.0, 75.0));
    assert_eq!(editor.selected_id(), Some(bottom.as_str()));

    editor.pointer_up(PointerEvent::at(75.0, 75.0));
    editor.select(None);
    editor.pointer_down(PointerEvent::at(250.0, 180.0));
    assert_eq!(editor.selected_id(), None);
}

#[test]
fn test_select_hits_swapped_corners() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::StudentName, (90.0, 70.0), (10.0, 10.0));
    editor.select(None);
    editor.select_at(Point::new(50.0, 40.0));
    assert!(editor.selected_id().is_some());
}

#[test]
fn test_locked_region_is_not_moved() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::StudentInfo, (10.0, 10.0), (60.0, 40.0));
    let id = editor.regions()[0].id.clone();
    assert!(editor.toggle_lock(&id));

    drag(&mut editor, (30.0, 25.0), (80.0, 70.0));
    drag(&mut editor, (60.0, 40.0), (90.0, 90.0));
    assert_eq!(editor.regions()[0].coordinates, [10.0, 10.0, 60.0, 40.0]);
    assert_eq!(editor.selected_id(), Some(id.as_str()));
}

#[test]
fn test_visibility_and_lock_are_not_undoable() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::StudentInfo, (10.0, 10.0), (60.0, 40.0));
    let id = editor.regions()[0].id.clone();
    let len = editor.history().len();
    editor.toggle_visibility(&id);
    editor.toggle_lock(&id);
    assert_eq!(editor.history().len(), len);
    assert!(!editor.regions()[0].visible);
    assert!(editor.regions()[0].locked);
}

#[test]
fn test_retype_to_and_from_multiple_choice() {
    let mut editor = loaded_editor();
    editor.set_draw_options("1, 2, 3");
    draw(&mut editor, RegionType::AnswerArea, (0.0, 0.0), (40.0, 40.0));
    draw(&mut editor, RegionType::MultipleChoice, (50.0, 0.0), (90.0, 40.0));
    let first = editor.regions()[0].id.clone();
    editor.select(Some(&first));

    assert!(editor.set_selected_type(RegionType::MultipleChoice));
    let region = &editor.regions()[0];
    assert_eq!(region.name, "mc2");
    assert_eq!(region.options, Some(vec!["1".into(), "2".into(), "3".into()]));
    assert_eq!(region.color, RegionType::MultipleChoice.style().color);

    assert!(editor.set_selected_type(RegionType::AnswerArea));
    let region = &editor.regions()[0];
    assert_eq!(region.name, "ans1");
    assert_eq!(region.options, None);

    editor.undo();
    assert_eq!(editor.regions()[0].region_type, RegionType::MultipleChoice);
}

#[test]
fn test_rename_options_and_stroke_width_commit() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::MultipleChoice, (0.0, 0.0), (40.0, 40.0));
    let len = editor.history().len();

    assert!(editor.rename_selected("Part A"));
    assert!(editor.set_selected_options("x, y"));
    assert!(editor.set_selected_stroke_width(4.0));
    assert!(!editor.set_selected_stroke_width(0.0));
    assert_eq!(editor.history().len(), len + 3);

    let region = &editor.regions()[0];
    assert_eq!(region.label(), "Part A [x, y]");
    assert!(approx_eq(region.stroke_width, 4.0));

    editor.undo();
    editor.undo();
    assert_eq!(editor.regions()[0].name, "Part A");
    assert_eq!(
        editor.regions()[0].options,
        Some(vec!["A".into(), "B".into(), "C".into(), "D".into()])
    );
}

#[test]
fn test_options_edit_requires_multiple_choice() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::EssayArea, (0.0, 0.0), (40.0, 40.0));
    assert!(!editor.set_selected_options("A, B"));
    assert_eq!(editor.regions()[0].options, None);
}

#[test]
fn test_delete_selected() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::Signature, (0.0, 0.0), (40.0, 40.0));
    assert!(editor.delete_selected());
    assert!(editor.regions().is_empty());
    assert_eq!(editor.selected_id(), None);
    assert!(!editor.delete_selected());

    editor.undo();
    assert_eq!(editor.regions().len(), 1);
}

#[test]
fn test_delete_during_drag_ends_the_drag() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::AnswerArea, (10.0, 10.0), (60.0, 60.0));
    editor.pointer_down(PointerEvent::at(30.0, 30.0));
    editor.pointer_move(PointerEvent::at(50.0, 40.0));
    assert!(matches!(editor.interaction(), Interaction::Moving { .. }));

    assert!(editor.handle_key(&KeyEvent::new(Key::Delete, Modifiers::NONE)));
    assert!(matches!(editor.interaction(), Interaction::Idle));
    editor.pointer_move(PointerEvent::at(70.0, 70.0));
    editor.pointer_up(PointerEvent::at(70.0, 70.0));
    assert!(editor.regions().is_empty());
    assert_eq!(editor.history().len(), 3);

    assert!(editor.undo());
    assert_eq!(editor.regions().len(), 1);
    assert!(coords_eq(editor.regions()[0].coordinates, [10.0, 10.0, 60.0, 60.0]));
}

#[test]
fn test_degenerate_region_accepted_by_default() {
    let mut editor = loaded_editor();
    editor.set_tool(Tool::Rectangle);
    editor.pointer_down(PointerEvent::at(30.0, 30.0));
    editor.pointer_up(PointerEvent::at(30.0, 30.0));
    assert_eq!(editor.regions().len(), 1);
}

#[test]
fn test_degenerate_region_discarded_when_configured() {
    let mut editor = loaded_editor_with(EditorSettings {
        discard_degenerate_regions: true,
        ..EditorSettings::default()
    });
    editor.set_tool(Tool::Rectangle);
    editor.pointer_down(PointerEvent::at(30.0, 30.0));
    editor.pointer_up(PointerEvent::at(30.0, 90.0));
    assert!(editor.regions().is_empty());
    assert!(!editor.can_undo());
    assert_eq!(editor.tool(), Tool::Rectangle);
}

#[test]
fn test_panning_moves_view_without_history() {
    let mut editor = loaded_editor();
    editor.set_tool(Tool::Hand);
    drag(&mut editor, (10.0, 10.0), (40.0, 25.0));
    assert_eq!(editor.view().pan, Point::new(30.0, 15.0));
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.cursor_style(), CursorStyle::Grab);
}

#[test]
fn test_pointer_ignored_without_image_or_with_secondary_button() {
    let mut editor = RegionEditor::default();
    editor.set_tool(Tool::Rectangle);
    drag(&mut editor, (0.0, 0.0), (10.0, 10.0));
    assert!(editor.regions().is_empty());

    let mut editor = loaded_editor();
    editor.set_tool(Tool::Rectangle);
    editor.pointer_down(PointerEvent {
        position: Point::new(0.0, 0.0),
        button: PointerButton::Secondary,
    });
    assert!(!editor.interaction().is_active());
}

#[test]
fn test_zoom_is_clamped() {
    let mut editor = loaded_editor();
    for _ in 0..40 {
        editor.zoom_in();
    }
    assert!(approx_eq(editor.view().zoom, 5.0));
    for _ in 0..80 {
        editor.zoom_out();
    }
    assert!(approx_eq(editor.view().zoom, 0.1));
    editor.reset_view();
    assert_eq!(editor.view(), ViewTransform::identity());
}

#[test]
fn test_load_failure_states() {
    let mut editor = RegionEditor::default();
    assert!(editor.load_image(b"not an image").is_err());
    assert!(matches!(editor.image_state(), ImageState::Failed(_)));
    let scene = editor.render();
    assert_eq!(scene.texts().count(), 1);

    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::AnswerArea, (0.0, 0.0), (10.0, 10.0));
    assert!(editor.load_image(b"still not an image").is_err());
    assert!(matches!(editor.image_state(), ImageState::Ready(_)));
    assert_eq!(editor.regions().len(), 1);
}

#[test]
fn test_new_image_resets_session() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::AnswerArea, (0.0, 0.0), (10.0, 10.0));
    editor
        .load_image(&encoded(64, 32, ImageFormat::Jpeg))
        .expect("load jpeg");
    assert!(editor.regions().is_empty());
    assert!(!editor.can_undo());
    assert_eq!(editor.selected_id(), None);
    assert_eq!(editor.canvas_size(), (264, 232));
}

#[test]
fn test_unsaved_signal_and_save() {
    let host = RecordingHost::default();
    let events = Rc::clone(&host.events);
    let mut editor = RegionEditor::with_host(EditorSettings::default(), host);
    assert!(!editor.save());

    editor
        .load_image(&encoded(300, 200, ImageFormat::Png))
        .expect("load test image");
    draw(&mut editor, RegionType::AnswerArea, (0.0, 0.0), (10.0, 10.0));
    draw(&mut editor, RegionType::AnswerArea, (20.0, 0.0), (30.0, 10.0));
    assert!(editor.has_unsaved_changes());
    assert!(editor.save());
    assert!(!editor.has_unsaved_changes());
    editor.undo();
    editor.undo();

    assert_eq!(
        *events.borrow(),
        vec![
            HostEvent::Unsaved(true),
            HostEvent::Saved {
                regions: 2,
                width: 300
            },
            HostEvent::Unsaved(false),
            HostEvent::Unsaved(true),
            HostEvent::Unsaved(false),
        ]
    );
}

#[test]
fn test_keyboard_shortcuts() {
    let mut editor = loaded_editor();
    assert!(editor.handle_key(&KeyEvent::char('r')));
    assert_eq!(editor.tool(), Tool::Rectangle);
    drag(&mut editor, (0.0, 0.0), (10.0, 10.0));

    assert!(editor.handle_key(&KeyEvent::new(Key::Delete, Modifiers::NONE)));
    assert!(editor.regions().is_empty());
    assert!(editor.handle_key(&KeyEvent::command('z')));
    assert_eq!(editor.regions().len(), 1);
    assert!(editor.handle_key(&KeyEvent::command('y')));
    assert!(editor.regions().is_empty());

    editor.handle_key(&KeyEvent::char('h'));
    assert!(editor.handle_key(&KeyEvent::new(Key::Escape, Modifiers::NONE)));
    assert_eq!(editor.tool(), Tool::Select);
    assert_eq!(editor.selected_id(), None);

    assert!(editor.handle_key(&KeyEvent::char('g')));
    assert!(editor.show_grid());
    assert!(!editor.handle_key(&KeyEvent::char('q')));
}

#[test]
fn test_mounted_editor_stops_receiving_keys_after_unmount() {
    let hub = KeyboardHub::new();
    let mounted = MountedEditor::mount(loaded_editor(), &hub);
    {
        let mut editor = mounted.editor().borrow_mut();
        draw(&mut editor, RegionType::AnswerArea, (0.0, 0.0), (10.0, 10.0));
    }

    assert!(hub.dispatch(&KeyEvent::new(Key::Delete, Modifiers::NONE)));
    assert!(mounted.editor().borrow().regions().is_empty());

    let editor = Rc::clone(mounted.editor());
    mounted.unmount();
    assert_eq!(hub.listener_count(), 0);
    assert!(!hub.dispatch(&KeyEvent::command('z')));
    assert!(editor.borrow().regions().is_empty());
}

#[test]
fn test_render_shows_preview_and_handles() {
    let mut editor = loaded_editor();
    draw(&mut editor, RegionType::AnswerArea, (10.0, 10.0), (50.0, 50.0));
    let handles = editor
        .render()
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { color, .. } if *color == Color::WHITE))
        .count();
    assert_eq!(handles, 8);

    editor.set_tool(Tool::Rectangle);
    editor.pointer_down(PointerEvent::at(100.0, 100.0));
    editor.pointer_move(PointerEvent::at(140.0, 120.0));
    assert_eq!(
        editor.preview().map(|p| p.coordinates),
        Some([100.0, 100.0, 140.0, 120.0])
    );
    let dashed = editor
        .render()
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokeRect { dash: Some(_), .. }))
        .count();
    assert_eq!(dashed, 1);
}
