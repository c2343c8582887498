//! Reversible scene edits.
//!
//! Every command restores exactly the values it changed: destructive
//! commands keep full element snapshots (minus resolved asset URLs), value
//! changes keep before/after pairs. Commands that find their target gone skip it quietly so a
//! history replay never stops halfway.

use scenekit_core::Point;

use crate::model::{Element, ElementId, ElementPatch, Geometry};
use crate::scene_store::SceneStore;

/// A command that can be executed and undone against a scene.
pub trait Command {
    /// Executes (or re-executes) the command.
    fn execute(&mut self, scene: &mut dyn SceneStore);

    /// Undoes the command.
    fn undo(&mut self, scene: &mut dyn SceneStore);

    /// Returns the name of the command for display.
    fn name(&self) -> &str;
}

fn skip_missing(command: &str, id: ElementId) {
    tracing::debug!("{}: element {} no longer exists, skipping", command, id);
}

/// Adds an element. Undo removes it by id.
#[derive(Debug, Clone)]
pub struct CreateElement {
    element: Element,
}

impl CreateElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn id(&self) -> ElementId {
        self.element.id
    }

    pub fn execute(&mut self, scene: &mut dyn SceneStore) {
        let id = self.element.id;
        if !scene.contains(id) {
            scene.insert_element(self.element.clone(), None);
        }
        scene.select_element(Some(id), false);
    }

    pub fn undo(&mut self, scene: &mut dyn SceneStore) {
        let removed = scene.delete_elements(&[self.element.id]);
        match removed.into_iter().next() {
            // Keep edits made after creation so redo brings back the same element.
            Some(element) => self.element = element.detached(),
            None => skip_missing("Create", self.element.id),
        }
        scene.clear_selection();
    }
}

/// Removes elements, keeping full snapshots and their z-order slots.
#[derive(Debug, Clone)]
pub struct DeleteElements {
    ids: Vec<ElementId>,
    removed: Vec<(usize, Element)>,
}

impl DeleteElements {
    pub fn new(ids: Vec<ElementId>) -> Self {
        Self {
            ids,
            removed: Vec::new(),
        }
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn execute(&mut self, scene: &mut dyn SceneStore) {
        let mut removed: Vec<(usize, Element)> = self
            .ids
            .iter()
            .filter_map(|id| match scene.index_of(*id) {
                Some(index) => Some((index, scene.elements()[index].detached())),
                None => {
                    skip_missing("Delete", *id);
                    None
                }
            })
            .collect();
        removed.sort_by_key(|(index, _)| *index);

        let present: Vec<ElementId> = removed.iter().map(|(_, e)| e.id).collect();
        scene.delete_elements(&present);
        scene.clear_selection();
        self.removed = removed;
    }

    pub fn undo(&mut self, scene: &mut dyn SceneStore) {
        // Ascending order so each slot index is valid when it is reused.
        let mut restored = Vec::with_capacity(self.removed.len());
        for (index, element) in &self.removed {
            if scene.contains(element.id) {
                continue;
            }
            scene.insert_element(element.clone(), Some(*index));
            restored.push(element.id);
        }
        scene.set_selection(restored);
    }
}

/// One element's position change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEntry {
    pub id: ElementId,
    pub from: Point,
    pub to: Point,
}

/// Moves elements between recorded positions.
#[derive(Debug, Clone)]
pub struct MoveElements {
    moves: Vec<MoveEntry>,
}

impl MoveElements {
    /// Entries whose `from` equals `to` are dropped.
    pub fn new(moves: Vec<MoveEntry>) -> Self {
        Self {
            moves: moves.into_iter().filter(|m| m.from != m.to).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[MoveEntry] {
        &self.moves
    }

    fn apply(&self, scene: &mut dyn SceneStore, forward: bool) {
        for m in &self.moves {
            let target = if forward { m.to } else { m.from };
            if !scene.update_element(m.id, &ElementPatch::position(target)) {
                skip_missing("Move", m.id);
            }
        }
    }

    pub fn execute(&mut self, scene: &mut dyn SceneStore) {
        self.apply(scene, true);
    }

    pub fn undo(&mut self, scene: &mut dyn SceneStore) {
        self.apply(scene, false);
    }
}

/// One element's full geometry change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformEntry {
    pub id: ElementId,
    pub from: Geometry,
    pub to: Geometry,
}

/// Resize and rotate results for one or more elements.
#[derive(Debug, Clone)]
pub struct TransformElements {
    entries: Vec<TransformEntry>,
}

impl TransformElements {
    /// Entries whose geometry did not change are dropped.
    pub fn new(entries: Vec<TransformEntry>) -> Self {
        Self {
            entries: entries.into_iter().filter(|e| e.from != e.to).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TransformEntry] {
        &self.entries
    }

    fn apply(&self, scene: &mut dyn SceneStore, forward: bool) {
        for entry in &self.entries {
            let target = if forward { entry.to } else { entry.from };
            if !scene.update_element(entry.id, &ElementPatch::geometry(target)) {
                skip_missing("Transform", entry.id);
            }
        }
    }

    pub fn execute(&mut self, scene: &mut dyn SceneStore) {
        self.apply(scene, true);
    }

    pub fn undo(&mut self, scene: &mut dyn SceneStore) {
        self.apply(scene, false);
    }
}

/// Inserts offset copies of existing elements.
///
/// Copies and their ids are fixed at construction, so redo brings back the
/// same elements that undo removed.
#[derive(Debug, Clone)]
pub struct DuplicateElements {
    copies: Vec<Element>,
}

impl DuplicateElements {
    pub fn new<'a>(sources: impl IntoIterator<Item = &'a Element>, offset: Point) -> Self {
        Self {
            copies: sources.into_iter().map(|e| e.duplicate(offset)).collect(),
        }
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.copies.iter().map(|e| e.id).collect()
    }

    pub fn copies(&self) -> &[Element] {
        &self.copies
    }

    pub fn execute(&mut self, scene: &mut dyn SceneStore) {
        for copy in &self.copies {
            if !scene.contains(copy.id) {
                scene.insert_element(copy.clone(), None);
            }
        }
        scene.set_selection(self.ids());
    }

    pub fn undo(&mut self, scene: &mut dyn SceneStore) {
        scene.delete_elements(&self.ids());
        scene.clear_selection();
    }
}

/// Property edit with explicit before/after values.
#[derive(Debug, Clone)]
pub struct UpdateElement {
    id: ElementId,
    before: ElementPatch,
    after: ElementPatch,
}

impl UpdateElement {
    pub fn new(id: ElementId, before: ElementPatch, after: ElementPatch) -> Self {
        Self { id, before, after }
    }

    /// Build from the element's current state, capturing `before`
    /// automatically.
    pub fn capture(element: &Element, after: ElementPatch) -> Self {
        Self {
            id: element.id,
            before: after.capture_from(element),
            after,
        }
    }

    pub fn execute(&mut self, scene: &mut dyn SceneStore) {
        if !scene.update_element(self.id, &self.after) {
            skip_missing("Update", self.id);
        }
    }

    pub fn undo(&mut self, scene: &mut dyn SceneStore) {
        if !scene.update_element(self.id, &self.before) {
            skip_missing("Update", self.id);
        }
    }
}

/// Ordered batch executed front to back and undone back to front.
#[derive(Debug, Clone)]
pub struct CompositeCommand {
    name: String,
    commands: Vec<SceneCommand>,
}

impl CompositeCommand {
    pub fn new(name: impl Into<String>, commands: Vec<SceneCommand>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The concrete commands the editor produces.
#[derive(Debug, Clone)]
pub enum SceneCommand {
    Create(CreateElement),
    Delete(DeleteElements),
    Move(MoveElements),
    Transform(TransformElements),
    Duplicate(DuplicateElements),
    Update(UpdateElement),
    Composite(CompositeCommand),
}

impl Command for SceneCommand {
    fn execute(&mut self, scene: &mut dyn SceneStore) {
        match self {
            SceneCommand::Create(cmd) => cmd.execute(scene),
            SceneCommand::Delete(cmd) => cmd.execute(scene),
            SceneCommand::Move(cmd) => cmd.execute(scene),
            SceneCommand::Transform(cmd) => cmd.execute(scene),
            SceneCommand::Duplicate(cmd) => cmd.execute(scene),
            SceneCommand::Update(cmd) => cmd.execute(scene),
            SceneCommand::Composite(cmd) => {
                for command in cmd.commands.iter_mut() {
                    command.execute(scene);
                }
            }
        }
    }

    fn undo(&mut self, scene: &mut dyn SceneStore) {
        match self {
            SceneCommand::Create(cmd) => cmd.undo(scene),
            SceneCommand::Delete(cmd) => cmd.undo(scene),
            SceneCommand::Move(cmd) => cmd.undo(scene),
            SceneCommand::Transform(cmd) => cmd.undo(scene),
            SceneCommand::Duplicate(cmd) => cmd.undo(scene),
            SceneCommand::Update(cmd) => cmd.undo(scene),
            SceneCommand::Composite(cmd) => {
                for command in cmd.commands.iter_mut().rev() {
                    command.undo(scene);
                }
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            SceneCommand::Create(_) => "Create",
            SceneCommand::Delete(_) => "Delete",
            SceneCommand::Move(_) => "Move",
            SceneCommand::Transform(_) => "Transform",
            SceneCommand::Duplicate(_) => "Duplicate",
            SceneCommand::Update(_) => "Update",
            SceneCommand::Composite(cmd) => &cmd.name,
        }
    }
}

macro_rules! impl_from_command {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SceneCommand {
                fn from(cmd: $ty) -> Self {
                    SceneCommand::$variant(cmd)
                }
            }
        )*
    };
}

impl_from_command!(
    CreateElement => Create,
    DeleteElements => Delete,
    MoveElements => Move,
    TransformElements => Transform,
    DuplicateElements => Duplicate,
    UpdateElement => Update,
    CompositeCommand => Composite,
);
