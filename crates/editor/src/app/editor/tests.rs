use std::path::{Path, PathBuf};

use editor_engine::{
    ConsoleReply, InputSnapshot, PointPx, PointerEvent, Rect, Scene, SceneCommand, Surface, BLACK,
};
use serde_json::Value;

use super::store::{BlockId, TextureState};
use super::EditorScene;
use crate::app::config::EditorConfig;

const GREEN: [u8; 4] = [0, 255, 0, 255];

fn editor() -> EditorScene {
    let mut editor = EditorScene::new(EditorConfig::default());
    editor.load();
    editor
}

fn run(editor: &mut EditorScene, line: &str) -> ConsoleReply {
    let tokens: Vec<String> = line.split_whitespace().map(ToString::to_string).collect();
    let (name, args) = tokens.split_first().expect("command name");
    editor.execute_console_command(name, args)
}

fn run_with_path(editor: &mut EditorScene, name: &str, leading: &[&str], path: &Path) -> ConsoleReply {
    let mut args: Vec<String> = leading.iter().map(ToString::to_string).collect();
    args.push(path.display().to_string());
    editor.execute_console_command(name, &args)
}

fn tick(editor: &mut EditorScene, key: &str) -> SceneCommand {
    editor.update(&InputSnapshot::empty().with_key_down(key, true))
}

fn block_rect(editor: &EditorScene, id: u64) -> Rect {
    editor.store.block(BlockId(id)).expect("block").rect
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(2, 2, image::Rgba(GREEN))
        .save(&path)
        .expect("write png");
    path
}

fn render(editor: &mut EditorScene) -> Surface {
    let layout = EditorConfig::default().layout();
    let mut surface = Surface::new(layout.framebuffer_width, layout.framebuffer_height);
    editor.render(&mut surface);
    surface
}

#[test]
fn controllable_block_never_enters_adjacent_collision_block() {
    let mut editor = editor();
    assert!(!run(&mut editor, "block a 0 0 100 100 block red").is_error());
    assert!(!run(&mut editor, "block b 100 0 100 100 collision blue").is_error());
    run(&mut editor, "controllable 0 on");

    for _ in 0..30 {
        assert_eq!(tick(&mut editor, "d"), SceneCommand::None);
    }
    assert_eq!(block_rect(&editor, 0).x, 0);

    tick(&mut editor, "s");
    assert_eq!(block_rect(&editor, 0), Rect::new(0, 5, 100, 100));
}

#[test]
fn narrower_block_advances_until_next_step_would_overlap() {
    let mut editor = editor();
    run(&mut editor, "block a 0 0 50 100 block red");
    run(&mut editor, "block b 100 0 100 100 collision blue");
    run(&mut editor, "controllable 0 on");

    let mut positions = Vec::new();
    for _ in 0..15 {
        tick(&mut editor, "d");
        positions.push(block_rect(&editor, 0).x);
    }
    assert_eq!(&positions[..3], &[5, 10, 15]);
    assert_eq!(*positions.last().expect("positions"), 50);
}

#[test]
fn left_tick_at_origin_keeps_block_in_scene() {
    let mut editor = editor();
    run(&mut editor, "block a 0 0 10 10 block red");
    run(&mut editor, "controllable 0 on");
    tick(&mut editor, "a");
    tick(&mut editor, "arrowleft");
    assert_eq!(block_rect(&editor, 0).x, 0);
}

#[test]
fn camera_follows_locked_block_as_it_moves() {
    let mut editor = editor();
    run(&mut editor, "block p 1000 1000 100 100 block red");
    run(&mut editor, "camlock 0 on");
    assert_eq!(editor.mapper.offset(), PointPx::new(650, 750));

    run(&mut editor, "controllable 0 on");
    tick(&mut editor, "d");
    assert_eq!(editor.mapper.offset(), PointPx::new(655, 750));

    run(&mut editor, "camlock 0 off");
    tick(&mut editor, "d");
    assert_eq!(editor.mapper.offset(), PointPx::new(655, 750));
}

#[test]
fn viewport_press_hit_tests_through_the_camera_offset() {
    let mut editor = editor();
    run(&mut editor, "block p 1000 1000 100 100 block red");
    run(&mut editor, "camlock 0 on");

    editor.handle_pointer(PointerEvent::down(PointPx::new(360, 260)));
    assert_eq!(editor.store.selected(), Some(BlockId(0)));
    assert_eq!(editor.pointer.dragged, Some(BlockId(0)));
}

#[test]
fn drag_recenters_block_on_pointer_and_leaving_viewport_releases() {
    let mut editor = editor();
    run(&mut editor, "block a 100 100 50 50 block red");

    editor.handle_pointer(PointerEvent::down(PointPx::new(120, 120)));
    assert_eq!(editor.store.selected(), Some(BlockId(0)));

    editor.handle_pointer(PointerEvent::moved(PointPx::new(300, 200)));
    assert_eq!(block_rect(&editor, 0), Rect::new(275, 175, 50, 50));

    editor.handle_pointer(PointerEvent::moved(PointPx::new(900, 100)));
    assert_eq!(editor.pointer.dragged, None);
    editor.handle_pointer(PointerEvent::moved(PointPx::new(400, 400)));
    assert_eq!(block_rect(&editor, 0), Rect::new(275, 175, 50, 50));
    assert_eq!(editor.store.selected(), Some(BlockId(0)));
}

#[test]
fn releasing_pointer_ends_drag() {
    let mut editor = editor();
    run(&mut editor, "block a 0 0 50 50 block red");
    editor.handle_pointer(PointerEvent::down(PointPx::new(10, 10)));
    editor.handle_pointer(PointerEvent::up(PointPx::new(10, 10)));
    editor.handle_pointer(PointerEvent::moved(PointPx::new(300, 300)));
    assert_eq!(block_rect(&editor, 0), Rect::new(0, 0, 50, 50));
}

#[test]
fn press_on_empty_viewport_clears_selection() {
    let mut editor = editor();
    run(&mut editor, "block a 0 0 50 50 block red");
    run(&mut editor, "select 0");
    editor.handle_pointer(PointerEvent::down(PointPx::new(500, 500)));
    assert_eq!(editor.store.selected(), None);
    assert_eq!(editor.pointer.dragged, None);
}

#[test]
fn far_away_block_can_be_followed_pressed_and_dragged() {
    let mut editor = editor();
    assert!(!run(&mut editor, "block far 1200000000 0 10 10 block red").is_error());
    run(&mut editor, "camlock 0 on");
    assert_eq!(editor.mapper.offset(), PointPx::new(1_199_999_605, -295));

    editor.handle_pointer(PointerEvent::down(PointPx::new(400, 300)));
    assert_eq!(editor.store.selected(), Some(BlockId(0)));
    editor.handle_pointer(PointerEvent::moved(PointPx::new(410, 300)));
    assert_eq!(block_rect(&editor, 0), Rect::new(1_200_000_010, 0, 10, 10));

    let surface = render(&mut editor);
    assert_eq!(surface.pixel(1, 1), Some([255, 255, 255, 255]));
}

#[test]
fn block_reaching_past_the_pixel_range_is_refused() {
    let mut editor = editor();
    let reply = run(&mut editor, "block far 2147483000 0 1000 10 block red");
    assert!(reply.is_error());
    assert!(editor.store.blocks().is_empty());
}

#[test]
fn huge_selected_and_dragged_block_renders_its_visible_outline() {
    let mut editor = editor();
    run(&mut editor, "block wide 0 0 1500000000 10 block red");
    run(&mut editor, "select 0");
    let surface = render(&mut editor);
    assert_eq!(surface.pixel(0, 0), Some(BLACK));
    assert_eq!(surface.pixel(799, 0), Some(BLACK));
    assert_eq!(surface.pixel(400, 5), Some([255, 0, 0, 255]));

    editor.handle_pointer(PointerEvent::down(PointPx::new(100, 5)));
    editor.handle_pointer(PointerEvent::moved(PointPx::new(100, 5)));
    assert_eq!(block_rect(&editor, 0).x, -749_999_900);
    render(&mut editor);
}

#[test]
fn minimap_drag_sets_offset_from_scaled_pointer() {
    let mut editor = editor();
    let minimap = EditorConfig::default().layout().minimap;

    editor.handle_pointer(PointerEvent::down(PointPx::new(minimap.x + 10, 20)));
    assert_eq!(editor.mapper.offset(), PointPx::new(0, 0));

    editor.handle_pointer(PointerEvent::moved(PointPx::new(minimap.x + 40, 30)));
    assert_eq!(editor.mapper.offset(), PointPx::new(200, 150));
    assert_eq!(editor.mapper.minimap_indicator(), Rect::new(40, 30, 160, 120));

    editor.handle_pointer(PointerEvent::moved(PointPx::new(700, 30)));
    editor.handle_pointer(PointerEvent::moved(PointPx::new(minimap.x + 60, 60)));
    assert_eq!(editor.mapper.offset(), PointPx::new(200, 150));
}

#[test]
fn minimap_motion_without_press_is_ignored() {
    let mut editor = editor();
    let minimap = EditorConfig::default().layout().minimap;
    editor.handle_pointer(PointerEvent::moved(PointPx::new(minimap.x + 40, 30)));
    assert_eq!(editor.mapper.offset(), PointPx::new(0, 0));
}

#[test]
fn redraw_is_requested_only_after_visible_changes() {
    let mut editor = editor();
    assert!(editor.needs_redraw());
    render(&mut editor);
    assert!(!editor.needs_redraw());

    editor.update(&InputSnapshot::empty());
    assert!(!editor.needs_redraw());

    run(&mut editor, "block a 0 0 10 10 block red");
    assert!(editor.needs_redraw());
    render(&mut editor);

    run(&mut editor, "controllable 0 on");
    render(&mut editor);
    tick(&mut editor, "s");
    assert!(editor.needs_redraw());
}

#[test]
fn dropped_file_textures_selected_block() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_png(dir.path(), "grass.png");
    let mut editor = editor();
    run(&mut editor, "block a 0 0 10 10 block red");
    run(&mut editor, "select 0");

    editor.handle_file_dropped(&png);
    assert!(matches!(
        editor.store.block(BlockId(0)).expect("block").texture,
        TextureState::Pending(_)
    ));
    editor.wait_for_decodes();

    assert!(matches!(
        editor.store.block(BlockId(0)).expect("block").texture,
        TextureState::Loaded(_)
    ));
    render(&mut editor);
    assert_eq!(editor.pipeline.scene_surface().pixel(5, 5), Some(GREEN));
}

#[test]
fn dropped_file_without_selection_becomes_background() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_png(dir.path(), "tile.png");
    let mut editor = editor();

    editor.handle_file_dropped(&png);
    editor.wait_for_decodes();

    assert_eq!(editor.store.background().map(|bitmap| bitmap.width()), Some(2));
    render(&mut editor);
    assert_eq!(editor.pipeline.scene_surface().pixel(1999, 1999), Some(GREEN));
}

#[test]
fn unsupported_texture_falls_back_to_color() {
    let mut editor = editor();
    run(&mut editor, "block a 0 0 10 10 block red");
    let reply = run(&mut editor, "texture 0 notes.txt");
    assert!(!reply.is_error());

    editor.wait_for_decodes();
    assert!(matches!(
        editor.store.block(BlockId(0)).expect("block").texture,
        TextureState::None
    ));
}

#[test]
fn deleting_block_while_decode_is_in_flight_leaves_scene_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let png = write_png(dir.path(), "crate.png");
    let mut editor = editor();
    run(&mut editor, "block a 0 0 10 10 block red");
    run(&mut editor, "block b 20 0 10 10 block blue");

    assert!(!run_with_path(&mut editor, "texture", &["0"], &png).is_error());
    run(&mut editor, "delete 0");
    let revision = editor.store.revision();

    editor.wait_for_decodes();
    assert_eq!(editor.store.revision(), revision);
    assert_eq!(editor.store.blocks().len(), 1);
    assert!(editor.store.block(BlockId(0)).is_none());
}

#[test]
fn block_form_errors_are_reported_per_field() {
    let mut editor = editor();
    let reply = run(&mut editor, "block a x 0 0 0 block purple");
    assert!(reply.is_error());
    assert_eq!(reply.output().len(), 4);
    assert_eq!(reply.output()[0], "error: x: expected an integer, got \"x\"");
    assert!(editor.store.blocks().is_empty());
}

#[test]
fn commands_on_unknown_ids_report_errors() {
    let mut editor = editor();
    assert_eq!(
        run(&mut editor, "delete 9").output(),
        &["error: no block with id 9".to_string()]
    );
    assert!(run(&mut editor, "camlock x on").is_error());
    assert!(run(&mut editor, "controllable 0 maybe").is_error());
}

#[test]
fn list_and_dump_describe_the_scene() {
    let mut editor = editor();
    run(&mut editor, "block wall 5 6 7 8 collision blue");
    run(&mut editor, "entity hero 1 2 3 4 player movement=random health=12");
    run(&mut editor, "select 0");

    let list = run(&mut editor, "list");
    assert_eq!(
        list.output(),
        &["0 'wall' at (5, 6) 7x8 collision [selected] texture=none".to_string()]
    );
    let entities = run(&mut editor, "entities");
    assert_eq!(
        entities.output(),
        &["0 'hero' player at (1, 2) 3x4 movement=random health=12 attack=- direction=-".to_string()]
    );

    let dump = run(&mut editor, "dump");
    let json: Value = serde_json::from_str(&dump.output().join("\n")).expect("dump json");
    assert_eq!(json["blocks"][0]["type"], "collision");
    assert_eq!(json["blocks"][0]["color"], "blue");
    assert_eq!(json["selected"], 0);
    assert_eq!(json["viewport_offset"], serde_json::json!([0, 0]));
    assert_eq!(json["entities"][0]["type"], "player");
    assert_eq!(json["entities"][0]["movement"], "random");
    assert!(json["entities"][0]["direction"].is_null());
}

#[test]
fn declared_commands_cover_editor_operations() {
    let editor = editor();
    let names: Vec<&str> = editor
        .console_commands()
        .iter()
        .map(|spec| spec.name)
        .collect();
    for expected in [
        "block",
        "entity",
        "background",
        "texture",
        "list",
        "entities",
        "select",
        "controllable",
        "camlock",
        "delete",
        "dump",
    ] {
        assert!(names.contains(&expected), "missing {expected}");
    }
}

#[test]
fn title_reports_block_count_and_view() {
    let mut editor = editor();
    run(&mut editor, "block a 0 0 10 10 block red");
    assert_eq!(
        editor.debug_title().as_deref(),
        Some("Scene Editor | 1 blocks | view 0,0")
    );
}
