//! Editor state holder
//!
//! One explicit object owns the live forest, the selection, the undo history
//! and the palette state. Consumers get it injected instead of reaching for a
//! global. Every mutating operation snapshots the forest into history before
//! it changes anything, and subscribers hear about every replacement.
//!
//! Operations whose target is missing return `false` and leave both the
//! forest and the history untouched.

use std::collections::BTreeSet;
use tracing::trace;

use crate::history::History;
use crate::node::{CanvasNode, EventMap, Forest, PropMap, StyleMap};
use crate::registry::{search_components, ComponentCategory, ComponentDefinition};
use crate::tree;

pub type Listener = Box<dyn FnMut(&[CanvasNode])>;

pub struct VisualEditorStore {
    nodes: Forest,
    selected_node_id: Option<String>,
    hovered_node_id: Option<String>,
    history: History,
    search_query: String,
    expanded_categories: BTreeSet<ComponentCategory>,
    listeners: Vec<Listener>,
}

impl Default for VisualEditorStore {
    fn default() -> Self {
        Self::new(History::default())
    }
}

impl std::fmt::Debug for VisualEditorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualEditorStore")
            .field("nodes", &self.nodes.len())
            .field("selected_node_id", &self.selected_node_id)
            .field("hovered_node_id", &self.hovered_node_id)
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl VisualEditorStore {
    pub fn new(history: History) -> Self {
        Self {
            nodes: Vec::new(),
            selected_node_id: None,
            hovered_node_id: None,
            history,
            search_query: String::new(),
            expanded_categories: [
                ComponentCategory::Layout,
                ComponentCategory::Typography,
                ComponentCategory::Button,
            ]
            .into_iter()
            .collect(),
            listeners: Vec::new(),
        }
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self::new(History::new(limit))
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Reads
    // ───────────────────────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    pub fn hovered_node_id(&self) -> Option<&str> {
        self.hovered_node_id.as_deref()
    }

    pub fn find_node_by_id(&self, node_id: &str) -> Option<&CanvasNode> {
        tree::find_node(&self.nodes, node_id)
    }

    pub fn get_parent_node(&self, node_id: &str) -> Option<&CanvasNode> {
        tree::find_parent(&self.nodes, node_id)
    }

    pub fn get_selected_node(&self) -> Option<&CanvasNode> {
        self.selected_node_id
            .as_deref()
            .and_then(|id| tree::find_node(&self.nodes, id))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Subscription
    // ───────────────────────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self) {
        let nodes = &self.nodes;
        for listener in self.listeners.iter_mut() {
            listener(nodes);
        }
    }

    /// Replace the forest without recording history (reparse path).
    /// Selection and hover survive only if their node still exists.
    pub fn set_nodes(&mut self, nodes: Forest) {
        self.nodes = nodes;
        self.drop_stale_ids();
        self.notify();
    }

    fn drop_stale_ids(&mut self) {
        let nodes = &self.nodes;
        let alive = |id: &Option<String>| {
            id.as_deref()
                .is_some_and(|id| tree::contains_node(nodes, id))
        };
        if !alive(&self.selected_node_id) {
            self.selected_node_id = None;
        }
        if !alive(&self.hovered_node_id) {
            self.hovered_node_id = None;
        }
    }

    /// Snapshot, then swap in the mutated forest.
    fn commit(&mut self, next: Option<Forest>) -> bool {
        let Some(next) = next else {
            return false;
        };
        self.history.push(&self.nodes);
        self.nodes = next;
        self.notify();
        true
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────────────────

    /// Insert and select `node`. `index` is clamped to the sibling count.
    pub fn add_node(&mut self, node: CanvasNode, parent_id: Option<&str>, index: usize) -> bool {
        let node_id = node.id.clone();
        let next = tree::add_node(&self.nodes, node, parent_id, index);
        if !self.commit(next) {
            return false;
        }
        self.selected_node_id = Some(node_id);
        true
    }

    /// Palette drop: a fresh node seeded with the definition's defaults.
    pub fn add_component(
        &mut self,
        def: &ComponentDefinition,
        parent_id: Option<&str>,
        index: usize,
    ) -> Option<String> {
        let node = CanvasNode::from_definition(def);
        let node_id = node.id.clone();
        self.add_node(node, parent_id, index).then_some(node_id)
    }

    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let next = tree::remove_node(&self.nodes, node_id);
        if !self.commit(next) {
            return false;
        }
        self.drop_stale_ids();
        true
    }

    pub fn move_node(&mut self, node_id: &str, new_parent_id: Option<&str>, new_index: usize) -> bool {
        let next = tree::move_node(&self.nodes, node_id, new_parent_id, new_index);
        self.commit(next)
    }

    pub fn update_node_props(&mut self, node_id: &str, props: &PropMap) -> bool {
        let next = tree::update_node_props(&self.nodes, node_id, props);
        self.commit(next)
    }

    pub fn update_node_styles(&mut self, node_id: &str, styles: &StyleMap) -> bool {
        let next = tree::update_node_styles(&self.nodes, node_id, styles);
        self.commit(next)
    }

    pub fn update_node_events(&mut self, node_id: &str, events: &EventMap) -> bool {
        let next = tree::update_node_events(&self.nodes, node_id, events);
        self.commit(next)
    }

    /// Clone the subtree next to the original and select the clone.
    pub fn duplicate_node(&mut self, node_id: &str) -> Option<String> {
        let (next, clone_id) = tree::duplicate_node(&self.nodes, node_id)?;
        self.commit(Some(next));
        self.selected_node_id = Some(clone_id.clone());
        Some(clone_id)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Selection
    // ───────────────────────────────────────────────────────────────────────────

    pub fn select_node(&mut self, node_id: Option<&str>) {
        self.selected_node_id = node_id.map(str::to_string);
    }

    pub fn set_hovered_node(&mut self, node_id: Option<&str>) {
        self.hovered_node_id = node_id.map(str::to_string);
    }

    // ───────────────────────────────────────────────────────────────────────────
    // History
    // ───────────────────────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(restored) = self.history.undo(&self.nodes) else {
            return false;
        };
        self.restore(restored);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(restored) = self.history.redo() else {
            return false;
        };
        self.restore(restored);
        true
    }

    fn restore(&mut self, nodes: Forest) {
        trace!(roots = nodes.len(), "restoring snapshot");
        self.nodes = nodes;
        self.selected_node_id = None;
        self.drop_stale_ids();
        self.notify();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Palette
    // ───────────────────────────────────────────────────────────────────────────

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    pub fn is_category_expanded(&self, category: ComponentCategory) -> bool {
        self.expanded_categories.contains(&category)
    }

    pub fn toggle_category(&mut self, category: ComponentCategory) {
        if !self.expanded_categories.remove(&category) {
            self.expanded_categories.insert(category);
        }
    }

    /// Catalog entries matching the current search query.
    pub fn visible_components(&self) -> Vec<&'static ComponentDefinition> {
        search_components(&self.search_query)
    }
}
