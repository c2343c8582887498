//! Scene store: the authoritative element list and selection.
//!
//! The interaction core only talks to the [`SceneStore`] trait so it can run
//! against any host store. [`Scene`] is the in-memory implementation used
//! by [`EditorState`](crate::EditorState) and the tests.

use scenekit_core::Point;
use serde::{Deserialize, Serialize};

use crate::model::{Element, ElementId, ElementKind, ElementPatch};

/// Operations the core needs from a scene store.
pub trait SceneStore {
    /// Create an element of `kind` at `(x, y)` with `overrides` applied and
    /// append it to the scene.
    fn create_element(
        &mut self,
        kind: ElementKind,
        x: f64,
        y: f64,
        overrides: ElementPatch,
    ) -> ElementId;

    /// Insert an existing element at `index` (clamped), or append when `None`.
    fn insert_element(&mut self, element: Element, index: Option<usize>);

    /// Apply a partial update. Returns false if the element does not exist.
    fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool;

    /// Remove elements and return the removed ones, dropping them from the
    /// selection as well.
    fn delete_elements(&mut self, ids: &[ElementId]) -> Vec<Element>;

    /// `None` clears the selection. With `additive` the id is toggled,
    /// otherwise it replaces the selection.
    fn select_element(&mut self, id: Option<ElementId>, additive: bool);

    /// Replace the selection. Unknown and repeated ids are dropped.
    fn set_selection(&mut self, ids: Vec<ElementId>);

    /// Elements in paint order (last is topmost).
    fn elements(&self) -> &[Element];

    /// Selected ids in selection order.
    fn selection(&self) -> &[ElementId];

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements().iter().find(|e| e.id == id)
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements().iter().position(|e| e.id == id)
    }

    fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    fn is_selected(&self, id: ElementId) -> bool {
        self.selection().contains(&id)
    }

    fn clear_selection(&mut self) {
        self.set_selection(Vec::new());
    }

    /// Selected elements in selection order.
    fn selected_elements(&self) -> Vec<&Element> {
        self.selection()
            .iter()
            .filter_map(|id| self.element(*id))
            .collect()
    }
}

/// In-memory scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    elements: Vec<Element>,
    #[serde(skip)]
    selection: Vec<ElementId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene holding `elements` with nothing selected.
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            selection: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }
}

impl SceneStore for Scene {
    fn create_element(
        &mut self,
        kind: ElementKind,
        x: f64,
        y: f64,
        overrides: ElementPatch,
    ) -> ElementId {
        let mut element = Element::new(kind, x, y);
        overrides.apply_to(&mut element);
        let id = element.id;
        tracing::debug!("Created {} element {}", kind, id);
        self.elements.push(element);
        id
    }

    fn insert_element(&mut self, element: Element, index: Option<usize>) {
        let at = index.map_or(self.elements.len(), |i| i.min(self.elements.len()));
        self.elements.insert(at, element);
    }

    fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                patch.apply_to(element);
                true
            }
            None => false,
        }
    }

    fn delete_elements(&mut self, ids: &[ElementId]) -> Vec<Element> {
        let (removed, kept): (Vec<Element>, Vec<Element>) = std::mem::take(&mut self.elements)
            .into_iter()
            .partition(|e| ids.contains(&e.id));
        self.elements = kept;
        self.selection.retain(|id| !ids.contains(id));
        removed
    }

    fn select_element(&mut self, id: Option<ElementId>, additive: bool) {
        let Some(id) = id else {
            self.selection.clear();
            return;
        };
        if !self.contains(id) {
            tracing::debug!("Ignoring selection of missing element {}", id);
            return;
        }
        if !additive {
            self.selection = vec![id];
        } else if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
    }

    fn set_selection(&mut self, ids: Vec<ElementId>) {
        let mut selection = Vec::with_capacity(ids.len());
        for id in ids {
            if self.contains(id) && !selection.contains(&id) {
                selection.push(id);
            }
        }
        self.selection = selection;
    }

    fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn selection(&self) -> &[ElementId] {
        &self.selection
    }
}

/// Topmost visible element whose rotated outline contains `point`.
pub fn hit_test(scene: &dyn SceneStore, point: Point) -> Option<ElementId> {
    scene
        .elements()
        .iter()
        .rev()
        .find(|e| e.visible && e.contains_point(point))
        .map(|e| e.id)
}
