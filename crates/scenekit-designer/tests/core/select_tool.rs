use scenekit_designer::{
    EditorSettings, EditorState, ElementId, ElementKind, ElementPatch, Geometry, HandleKind,
    PointerEvent, ResizeHandle, SceneStore, SelectMode,
};
use std::f64::consts::FRAC_PI_2;

fn editor() -> EditorState {
    EditorState::new(EditorSettings::default())
}

fn add_rect(editor: &mut EditorState, x: f64, y: f64, w: f64, h: f64) -> ElementId {
    editor.create_element(
        ElementKind::Rectangle,
        x,
        y,
        ElementPatch::new().with_size(w, h),
    )
}

fn geometry(editor: &EditorState, id: ElementId) -> Geometry {
    editor.scene().element(id).unwrap().geometry
}

fn select_mode(editor: &EditorState) -> SelectMode {
    editor.tools().select_tool().unwrap().mode()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_drag_emits_move_command() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 10.0, 10.0, 100.0, 50.0);
    let depth = editor.history().undo_depth();

    editor.pointer_down(PointerEvent::at(20.0, 20.0).on(id));
    assert_eq!(select_mode(&editor), SelectMode::Dragging);
    editor.pointer_move(PointerEvent::at(25.0, 30.0));
    assert_eq!(geometry(&editor, id).position().x, 15.0);
    editor.pointer_up(PointerEvent::at(30.0, 35.0));

    assert_eq!(geometry(&editor, id), Geometry::new(20.0, 25.0, 100.0, 50.0));
    assert_eq!(editor.history().undo_depth(), depth + 1);
    assert_eq!(editor.history().undo_description().as_deref(), Some("Move"));
    assert_eq!(select_mode(&editor), SelectMode::Idle);

    assert!(editor.undo());
    assert_eq!(geometry(&editor, id), Geometry::new(10.0, 10.0, 100.0, 50.0));
}

#[test]
fn test_click_without_movement_records_nothing() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let b = add_rect(&mut editor, 20.0, 0.0, 10.0, 10.0);
    let depth = editor.history().undo_depth();

    editor.pointer_down(PointerEvent::at(5.0, 5.0).on(a));
    editor.pointer_up(PointerEvent::at(5.0, 5.0));

    assert_eq!(editor.history().undo_depth(), depth);
    assert_eq!(editor.selection(), &[a]);
    assert!(!editor.scene().is_selected(b));
}

#[test]
fn test_drag_moves_whole_selection() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let b = add_rect(&mut editor, 20.0, 0.0, 10.0, 10.0);
    editor.select(Some(a), false);
    editor.select(Some(b), true);

    editor.pointer_down(PointerEvent::at(25.0, 5.0).on(b));
    editor.pointer_up(PointerEvent::at(35.0, 15.0));

    assert_eq!(geometry(&editor, a).position().x, 10.0);
    assert_eq!(geometry(&editor, b).position().y, 10.0);
}

#[test]
fn test_additive_click_toggles_off() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    assert_eq!(editor.selection(), &[a]);

    editor.pointer_down(PointerEvent::at(5.0, 5.0).on(a).additive());
    assert!(editor.selection().is_empty());
    assert_eq!(select_mode(&editor), SelectMode::Idle);
}

#[test]
fn test_locked_element_is_not_dragged() {
    let mut editor = editor();
    let id = editor.create_element(
        ElementKind::Rectangle,
        0.0,
        0.0,
        ElementPatch::new().with_size(10.0, 10.0).with_locked(true),
    );
    let depth = editor.history().undo_depth();

    editor.pointer_down(PointerEvent::at(5.0, 5.0).on(id));
    editor.pointer_move(PointerEvent::at(50.0, 50.0));
    editor.pointer_up(PointerEvent::at(50.0, 50.0));

    assert_eq!(geometry(&editor, id).position().x, 0.0);
    assert_eq!(editor.history().undo_depth(), depth);
    assert_eq!(editor.selection(), &[id]);
}

#[test]
fn test_marquee_replaces_selection() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let b = add_rect(&mut editor, 20.0, 20.0, 10.0, 10.0);
    let _c = add_rect(&mut editor, 100.0, 100.0, 10.0, 10.0);
    let depth = editor.history().undo_depth();

    editor.pointer_down(PointerEvent::at(-5.0, -5.0));
    editor.pointer_move(PointerEvent::at(25.0, 25.0));
    assert_eq!(
        editor.tools().select_tool().unwrap().marquee_rect(),
        Some(Geometry::new(-5.0, -5.0, 30.0, 30.0))
    );
    editor.pointer_up(PointerEvent::at(25.0, 25.0));

    assert_eq!(editor.selection(), &[a, b]);
    assert_eq!(editor.history().undo_depth(), depth);
}

#[test]
fn test_marquee_drawn_backwards() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    editor.select(None, false);

    editor.pointer_down(PointerEvent::at(15.0, 15.0));
    editor.pointer_up(PointerEvent::at(5.0, 5.0));
    assert_eq!(editor.selection(), &[a]);
}

#[test]
fn test_additive_marquee_extends_selection() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let c = add_rect(&mut editor, 100.0, 100.0, 10.0, 10.0);
    assert_eq!(editor.selection(), &[c]);

    editor.pointer_down(PointerEvent::at(-1.0, -1.0).additive());
    editor.pointer_up(PointerEvent::at(5.0, 5.0));
    assert_eq!(editor.selection(), &[c, a]);
}

#[test]
fn test_click_on_empty_canvas_clears_selection() {
    let mut editor = editor();
    add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    assert_eq!(editor.selection().len(), 1);

    editor.pointer_down(PointerEvent::at(500.0, 500.0));
    editor.pointer_up(PointerEvent::at(500.0, 500.0));
    assert!(editor.selection().is_empty());
}

#[test]
fn test_stray_events_are_ignored() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let depth = editor.history().undo_depth();

    editor.pointer_move(PointerEvent::at(40.0, 40.0));
    editor.pointer_up(PointerEvent::at(40.0, 40.0));

    assert_eq!(geometry(&editor, id), Geometry::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(editor.selection(), &[id]);
    assert_eq!(editor.history().undo_depth(), depth);
}

#[test]
fn test_single_resize_from_handle() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);

    assert!(editor.on_handle_pointer_down(
        HandleKind::Resize(ResizeHandle::BottomRight),
        PointerEvent::at(100.0, 100.0),
    ));
    assert_eq!(select_mode(&editor), SelectMode::Transforming);
    editor.pointer_move(PointerEvent::at(110.0, 95.0));
    editor.pointer_up(PointerEvent::at(120.0, 90.0));

    assert_eq!(geometry(&editor, id), Geometry::new(0.0, 0.0, 120.0, 90.0));
    assert_eq!(
        editor.history().undo_description().as_deref(),
        Some("Transform")
    );
    assert_eq!(
        editor.selection_bounds(),
        Some(Geometry::new(0.0, 0.0, 120.0, 90.0))
    );

    editor.undo();
    assert_eq!(geometry(&editor, id), Geometry::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_resize_below_minimum_is_clamped() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);

    editor.on_handle_pointer_down_named("tl", PointerEvent::at(0.0, 0.0));
    editor.pointer_up(PointerEvent::at(300.0, 300.0));

    assert_eq!(geometry(&editor, id), Geometry::new(95.0, 95.0, 5.0, 5.0));
}

#[test]
fn test_group_resize_preserves_layout() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let b = add_rect(&mut editor, 20.0, 20.0, 10.0, 10.0);
    editor.select(Some(a), true);
    assert_eq!(
        editor.selection_bounds(),
        Some(Geometry::new(0.0, 0.0, 30.0, 30.0))
    );

    editor.on_handle_pointer_down(
        HandleKind::Resize(ResizeHandle::BottomRight),
        PointerEvent::at(30.0, 30.0),
    );
    editor.pointer_up(PointerEvent::at(60.0, 60.0));

    let ga = geometry(&editor, a);
    let gb = geometry(&editor, b);
    assert!(close(ga.x, 0.0) && close(ga.y, 0.0) && close(ga.width, 20.0));
    assert!(close(gb.x, 40.0) && close(gb.y, 40.0) && close(gb.height, 20.0));

    // One command covers the whole group.
    editor.undo();
    assert_eq!(geometry(&editor, a), Geometry::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(geometry(&editor, b), Geometry::new(20.0, 20.0, 10.0, 10.0));
}

#[test]
fn test_rotate_handle_snaps() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);

    // Grab straight above the center, then sweep 44 degrees clockwise.
    editor.on_handle_pointer_down(HandleKind::Rotate, PointerEvent::at(50.0, -20.0));
    let angle = (-90f64 + 44.0).to_radians();
    editor.pointer_up(PointerEvent::at(
        50.0 + 70.0 * angle.cos(),
        50.0 + 70.0 * angle.sin(),
    ));

    let g = geometry(&editor, id);
    assert!(close(g.rotation, 45f64.to_radians()));
    assert!(close(g.x, 0.0) && close(g.width, 100.0));
}

#[test]
fn test_rotate_without_snap_passes_through() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);

    editor.on_handle_pointer_down(HandleKind::Rotate, PointerEvent::at(50.0, -20.0));
    let angle = (-90f64 + 30.0).to_radians();
    editor.pointer_up(PointerEvent::at(
        50.0 + 70.0 * angle.cos(),
        50.0 + 70.0 * angle.sin(),
    ));

    assert!(close(geometry(&editor, id).rotation, 30f64.to_radians()));
}

#[test]
fn test_rotate_across_half_turn_stays_small() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 100.0);
    let at = |degrees: f64| {
        let angle = degrees.to_radians();
        PointerEvent::at(50.0 + 70.0 * angle.cos(), 50.0 + 70.0 * angle.sin())
    };

    // 3 degrees across the left-hand branch cut snaps back to upright.
    editor.on_handle_pointer_down(HandleKind::Rotate, at(178.0));
    editor.pointer_up(at(-179.0));
    assert!(close(geometry(&editor, id).rotation, 0.0));

    // Unsnapped, the sweep is +20 degrees, not -340.
    editor.on_handle_pointer_down(HandleKind::Rotate, at(170.0));
    editor.pointer_up(at(-170.0));
    assert!(close(geometry(&editor, id).rotation, 20f64.to_radians()));
}

#[test]
fn test_group_rotate_is_rigid() {
    let mut editor = editor();
    let a = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let b = add_rect(&mut editor, 20.0, 0.0, 10.0, 10.0);
    editor.select(Some(a), true);

    editor.on_handle_pointer_down(HandleKind::Rotate, PointerEvent::at(15.0, -20.0));
    editor.pointer_up(PointerEvent::at(40.0, 5.0));

    let ga = geometry(&editor, a);
    let gb = geometry(&editor, b);
    assert!(close(ga.center().x, 15.0) && close(ga.center().y, -5.0));
    assert!(close(gb.center().x, 15.0) && close(gb.center().y, 15.0));
    assert!(close(ga.rotation, FRAC_PI_2) && close(gb.rotation, FRAC_PI_2));
}

#[test]
fn test_handle_grab_requires_selection() {
    let mut editor = editor();
    add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    editor.select(None, false);

    assert!(!editor.on_handle_pointer_down(HandleKind::Rotate, PointerEvent::at(0.0, 0.0)));
    assert_eq!(select_mode(&editor), SelectMode::Idle);
}

#[test]
fn test_unknown_handle_is_ignored() {
    let mut editor = editor();
    add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    assert!(!editor.on_handle_pointer_down_named("middle", PointerEvent::at(0.0, 0.0)));
    assert_eq!(select_mode(&editor), SelectMode::Idle);
}

#[test]
fn test_transform_without_change_records_nothing() {
    let mut editor = editor();
    add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let depth = editor.history().undo_depth();

    editor.on_handle_pointer_down_named("r", PointerEvent::at(10.0, 5.0));
    editor.pointer_up(PointerEvent::at(10.0, 5.0));
    assert_eq!(editor.history().undo_depth(), depth);
}

#[test]
fn test_cancel_restores_drag() {
    let mut editor = editor();
    let id = add_rect(&mut editor, 0.0, 0.0, 10.0, 10.0);
    let depth = editor.history().undo_depth();

    editor.pointer_down(PointerEvent::at(5.0, 5.0).on(id));
    editor.pointer_move(PointerEvent::at(50.0, 50.0));
    editor.pointer_cancel();

    assert_eq!(geometry(&editor, id), Geometry::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(editor.history().undo_depth(), depth);
    assert_eq!(select_mode(&editor), SelectMode::Idle);
}
