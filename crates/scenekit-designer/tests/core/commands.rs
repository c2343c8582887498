use scenekit_designer::commands::{MoveEntry, TransformEntry};
use scenekit_designer::{
    Command, CreateElement, DeleteElements, DuplicateElements, Element, ElementId, ElementKind,
    ElementPatch, Geometry, MoveElements, Point, Scene, SceneCommand, SceneStore,
    TransformElements, UpdateElement,
};

fn scene_with(n: usize) -> (Scene, Vec<ElementId>) {
    let mut scene = Scene::new();
    let ids = (0..n)
        .map(|i| {
            scene.create_element(
                ElementKind::Rectangle,
                i as f64 * 20.0,
                0.0,
                ElementPatch::new().with_size(10.0, 10.0),
            )
        })
        .collect();
    (scene, ids)
}

#[test]
fn test_create_selects_and_undo_removes() {
    let mut scene = Scene::new();
    let element = Element::new(ElementKind::Ellipse, 5.0, 5.0);
    let id = element.id;
    let mut cmd = SceneCommand::from(CreateElement::new(element));

    cmd.execute(&mut scene);
    assert!(scene.contains(id));
    assert_eq!(scene.selection(), &[id]);

    // Executing again does not add a second copy.
    cmd.execute(&mut scene);
    assert_eq!(scene.len(), 1);

    cmd.undo(&mut scene);
    assert!(scene.is_empty());
    assert!(scene.selection().is_empty());
}

#[test]
fn test_delete_restores_order_and_selection() {
    let (mut scene, ids) = scene_with(4);
    let before = scene.elements().to_vec();

    let mut cmd = SceneCommand::from(DeleteElements::new(vec![ids[2], ids[0]]));
    cmd.execute(&mut scene);
    assert_eq!(scene.len(), 2);
    assert!(scene.selection().is_empty());

    cmd.undo(&mut scene);
    assert_eq!(scene.elements(), before.as_slice());
    assert_eq!(scene.selection(), &[ids[0], ids[2]]);
}

#[test]
fn test_delete_keeps_untouched_fields() {
    let (mut scene, ids) = scene_with(1);
    scene.update_element(
        ids[0],
        &ElementPatch::new().with_text("kept").with_locked(true),
    );
    let snapshot = scene.element(ids[0]).cloned().unwrap();

    let mut cmd = DeleteElements::new(vec![ids[0]]);
    cmd.execute(&mut scene);
    cmd.undo(&mut scene);
    assert_eq!(scene.element(ids[0]), Some(&snapshot));
}

#[test]
fn test_move_and_undo() {
    let (mut scene, ids) = scene_with(2);
    let mut cmd = SceneCommand::from(MoveElements::new(vec![
        MoveEntry {
            id: ids[0],
            from: Point::new(0.0, 0.0),
            to: Point::new(5.0, 6.0),
        },
        MoveEntry {
            id: ids[1],
            from: Point::new(20.0, 0.0),
            to: Point::new(25.0, 6.0),
        },
    ]));

    cmd.execute(&mut scene);
    assert_eq!(scene.element(ids[1]).unwrap().position(), Point::new(25.0, 6.0));
    cmd.undo(&mut scene);
    assert_eq!(scene.element(ids[0]).unwrap().position(), Point::new(0.0, 0.0));
    assert_eq!(cmd.name(), "Move");
}

#[test]
fn test_missing_element_is_skipped() {
    let (mut scene, ids) = scene_with(2);
    let mut cmd = MoveElements::new(vec![
        MoveEntry {
            id: ids[0],
            from: Point::new(0.0, 0.0),
            to: Point::new(1.0, 1.0),
        },
        MoveEntry {
            id: ids[1],
            from: Point::new(20.0, 0.0),
            to: Point::new(21.0, 1.0),
        },
    ]);
    scene.delete_elements(&[ids[0]]);

    cmd.execute(&mut scene);
    assert_eq!(scene.element(ids[1]).unwrap().position(), Point::new(21.0, 1.0));
    cmd.undo(&mut scene);
    assert_eq!(scene.element(ids[1]).unwrap().position(), Point::new(20.0, 0.0));
    assert!(!scene.contains(ids[0]));
}

#[test]
fn test_transform_restores_full_geometry() {
    let (mut scene, ids) = scene_with(1);
    let from = Geometry::new(0.0, 0.0, 10.0, 10.0);
    let to = Geometry::new(-5.0, -5.0, 20.0, 20.0).with_rotation(0.5);
    let mut cmd = TransformElements::new(vec![TransformEntry { id: ids[0], from, to }]);
    assert!(!cmd.is_empty());

    cmd.execute(&mut scene);
    assert_eq!(scene.element(ids[0]).unwrap().geometry, to);
    cmd.undo(&mut scene);
    assert_eq!(scene.element(ids[0]).unwrap().geometry, from);
}

#[test]
fn test_transform_without_change_is_empty() {
    let g = Geometry::new(1.0, 2.0, 3.0, 4.0);
    let cmd = TransformElements::new(vec![TransformEntry {
        id: ElementId::new(),
        from: g,
        to: g,
    }]);
    assert!(cmd.is_empty());
}

#[test]
fn test_duplicate_redo_reuses_ids() {
    let (mut scene, ids) = scene_with(2);
    let sources: Vec<Element> = scene.elements().to_vec();
    let mut cmd = DuplicateElements::new(&sources, Point::new(20.0, 20.0));
    let copies = cmd.ids();

    cmd.execute(&mut scene);
    assert_eq!(scene.len(), 4);
    assert_eq!(scene.selection(), copies.as_slice());
    let copy = scene.element(copies[0]).unwrap();
    assert_eq!(copy.position(), Point::new(20.0, 20.0));
    assert!(!ids.contains(&copy.id));

    cmd.undo(&mut scene);
    assert_eq!(scene.len(), 2);
    assert!(scene.selection().is_empty());

    cmd.execute(&mut scene);
    assert!(copies.iter().all(|id| scene.contains(*id)));
}

#[test]
fn test_update_element_before_after() {
    let (mut scene, ids) = scene_with(1);
    let element = scene.element(ids[0]).unwrap().clone();
    let mut cmd = UpdateElement::capture(&element, ElementPatch::new().with_visible(false));

    cmd.execute(&mut scene);
    assert!(!scene.element(ids[0]).unwrap().visible);
    cmd.undo(&mut scene);
    assert_eq!(scene.element(ids[0]), Some(&element));
}

#[test]
fn test_update_undo_clears_previously_unset_text() {
    let (mut scene, ids) = scene_with(1);
    let element = scene.element(ids[0]).unwrap().clone();
    assert_eq!(element.text, None);

    let mut cmd = UpdateElement::capture(&element, ElementPatch::new().with_text("label"));
    cmd.execute(&mut scene);
    assert_eq!(scene.element(ids[0]).unwrap().text.as_deref(), Some("label"));
    cmd.undo(&mut scene);
    assert_eq!(scene.element(ids[0]), Some(&element));
}

#[test]
fn test_delete_snapshot_drops_runtime_url() {
    let mut scene = Scene::new();
    let id = scene.create_element(
        ElementKind::Image,
        0.0,
        0.0,
        ElementPatch::new().with_asset_key("img_1"),
    );
    if let Some(image) = scene.element_mut(id) {
        image.runtime_url = Some("blob:scenekit/abc".to_string());
    }

    let mut cmd = DeleteElements::new(vec![id]);
    cmd.execute(&mut scene);
    cmd.undo(&mut scene);

    let restored = scene.element(id).unwrap();
    assert_eq!(restored.asset_key.as_deref(), Some("img_1"));
    assert_eq!(restored.runtime_url, None);
}
