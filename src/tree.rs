//! Tree Model operations
//!
//! Every operation takes the current forest by reference and returns a new
//! one, leaving the input untouched. `None` means the target id was not found
//! (or the move is structurally impossible) and nothing changed.

use serde_json::Value;

use crate::node::{CanvasNode, EventMap, Forest, PropMap, StyleMap};

// ═══════════════════════════════════════════════════════════════════════════════
// QUERIES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn find_node<'a>(nodes: &'a [CanvasNode], node_id: &str) -> Option<&'a CanvasNode> {
    for node in nodes {
        if node.id == node_id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, node_id) {
            return Some(found);
        }
    }
    None
}

/// Parent of `node_id`, or `None` for root-level and missing nodes.
pub fn find_parent<'a>(nodes: &'a [CanvasNode], node_id: &str) -> Option<&'a CanvasNode> {
    for node in nodes {
        if node.children.iter().any(|c| c.id == node_id) {
            return Some(node);
        }
        if let Some(found) = find_parent(&node.children, node_id) {
            return Some(found);
        }
    }
    None
}

pub fn contains_node(nodes: &[CanvasNode], node_id: &str) -> bool {
    find_node(nodes, node_id).is_some()
}

/// Pre-order traversal (parent before children, siblings in order).
pub fn walk_preorder<'a>(nodes: &'a [CanvasNode], visit: &mut dyn FnMut(&'a CanvasNode)) {
    for node in nodes {
        visit(node);
        walk_preorder(&node.children, visit);
    }
}

pub fn node_count(nodes: &[CanvasNode]) -> usize {
    let mut count = 0;
    walk_preorder(nodes, &mut |_| count += 1);
    count
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRUCTURAL PRIMITIVES
// ═══════════════════════════════════════════════════════════════════════════════

fn remove_from_tree(nodes: &[CanvasNode], node_id: &str) -> Forest {
    nodes
        .iter()
        .filter(|node| node.id != node_id)
        .map(|node| CanvasNode {
            children: remove_from_tree(&node.children, node_id),
            ..node.clone()
        })
        .collect()
}

/// Splice a copy of `new_node` into the children of `parent_id` (or the root
/// list). The index is clamped to the sibling count. Only the matching
/// parent clones the node.
fn insert_into_tree(
    nodes: &[CanvasNode],
    parent_id: Option<&str>,
    index: usize,
    new_node: &CanvasNode,
) -> Forest {
    let Some(parent_id) = parent_id else {
        let mut result = nodes.to_vec();
        let mut root = new_node.clone();
        root.parent_id = None;
        result.insert(index.min(result.len()), root);
        return result;
    };

    nodes
        .iter()
        .map(|node| {
            if node.id == parent_id {
                let mut child = new_node.clone();
                child.parent_id = Some(parent_id.to_string());
                let mut children = node.children.clone();
                children.insert(index.min(children.len()), child);
                CanvasNode {
                    children,
                    ..node.clone()
                }
            } else {
                CanvasNode {
                    children: insert_into_tree(&node.children, Some(parent_id), index, new_node),
                    ..node.clone()
                }
            }
        })
        .collect()
}

fn update_in_tree(
    nodes: &[CanvasNode],
    node_id: &str,
    updater: &dyn Fn(&CanvasNode) -> CanvasNode,
) -> Forest {
    nodes
        .iter()
        .map(|node| {
            if node.id == node_id {
                updater(node)
            } else {
                CanvasNode {
                    children: update_in_tree(&node.children, node_id, updater),
                    ..node.clone()
                }
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Insert `node` under `parent_id` (root list when `None`) at `index`.
pub fn add_node(
    nodes: &[CanvasNode],
    node: CanvasNode,
    parent_id: Option<&str>,
    index: usize,
) -> Option<Forest> {
    if let Some(parent) = parent_id {
        if !contains_node(nodes, parent) {
            return None;
        }
    }
    Some(insert_into_tree(nodes, parent_id, index, &node))
}

/// Remove a node together with its whole subtree.
pub fn remove_node(nodes: &[CanvasNode], node_id: &str) -> Option<Forest> {
    if !contains_node(nodes, node_id) {
        return None;
    }
    Some(remove_from_tree(nodes, node_id))
}

/// Remove-then-insert. `new_index` refers to the sibling list after removal.
///
/// Moving a node into itself or one of its descendants is refused.
pub fn move_node(
    nodes: &[CanvasNode],
    node_id: &str,
    new_parent_id: Option<&str>,
    new_index: usize,
) -> Option<Forest> {
    let node = find_node(nodes, node_id)?;
    if let Some(target) = new_parent_id {
        if target == node_id || find_node(&node.children, target).is_some() {
            return None;
        }
        if !contains_node(nodes, target) {
            return None;
        }
    }
    let detached = remove_from_tree(nodes, node_id);
    Some(insert_into_tree(&detached, new_parent_id, new_index, node))
}

/// Shallow-merge `props` into the node. A `null` value deletes the key.
pub fn update_node_props(nodes: &[CanvasNode], node_id: &str, props: &PropMap) -> Option<Forest> {
    if !contains_node(nodes, node_id) {
        return None;
    }
    Some(update_in_tree(nodes, node_id, &|node| {
        let mut updated = node.clone();
        for (key, value) in props {
            if value.is_null() {
                updated.props.remove(key);
            } else {
                updated.props.insert(key.clone(), value.clone());
            }
        }
        updated
    }))
}

/// Shallow-merge styles. An empty value deletes the declaration.
pub fn update_node_styles(
    nodes: &[CanvasNode],
    node_id: &str,
    styles: &StyleMap,
) -> Option<Forest> {
    if !contains_node(nodes, node_id) {
        return None;
    }
    Some(update_in_tree(nodes, node_id, &|node| {
        let mut updated = node.clone();
        merge_strings(&mut updated.styles, styles);
        updated
    }))
}

/// Shallow-merge event handlers. An empty handler deletes the event.
pub fn update_node_events(
    nodes: &[CanvasNode],
    node_id: &str,
    events: &EventMap,
) -> Option<Forest> {
    if !contains_node(nodes, node_id) {
        return None;
    }
    Some(update_in_tree(nodes, node_id, &|node| {
        let mut updated = node.clone();
        merge_strings(&mut updated.events, events);
        updated
    }))
}

fn merge_strings(
    target: &mut std::collections::BTreeMap<String, String>,
    patch: &std::collections::BTreeMap<String, String>,
) {
    for (key, value) in patch {
        if value.trim().is_empty() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Deep-clone the node with fresh ids everywhere and place the copy right
/// after the original. Returns the new forest and the clone's id.
pub fn duplicate_node(nodes: &[CanvasNode], node_id: &str) -> Option<(Forest, String)> {
    let original = find_node(nodes, node_id)?;
    let cloned = original.clone_with_fresh_ids();
    let clone_id = cloned.id.clone();

    let parent = find_parent(nodes, node_id);
    let siblings = parent.map(|p| p.children.as_slice()).unwrap_or(nodes);
    let index = siblings.iter().position(|n| n.id == node_id)?;
    let parent_id = parent.map(|p| p.id.as_str());

    Some((insert_into_tree(nodes, parent_id, index + 1, &cloned), clone_id))
}

/// True when `value` counts as "not set" for text-content inference.
pub(crate) fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ids(nodes: &[CanvasNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn node(id: &str, component: &str) -> CanvasNode {
        CanvasNode {
            id: id.to_string(),
            ..CanvasNode::new(component)
        }
    }

    /// root: [a(Card){ b, c }, d]
    fn sample() -> Forest {
        let mut a = node("a", "Card");
        let mut b = node("b", "Text");
        let mut c = node("c", "Button");
        b.parent_id = Some("a".into());
        c.parent_id = Some("a".into());
        a.children = vec![b, c];
        vec![a, node("d", "Divider")]
    }

    fn assert_parent_links(nodes: &[CanvasNode], parent: Option<&str>) {
        for n in nodes {
            assert_eq!(n.parent_id.as_deref(), parent, "bad parent on {}", n.id);
            assert_parent_links(&n.children, Some(&n.id));
        }
    }

    #[test]
    fn test_find_node_and_parent() {
        let forest = sample();
        assert_eq!(find_node(&forest, "c").unwrap().component_name, "Button");
        assert_eq!(find_parent(&forest, "c").unwrap().id, "a");
        assert!(find_parent(&forest, "a").is_none());
        assert!(find_node(&forest, "zzz").is_none());
        assert_eq!(node_count(&forest), 4);
    }

    #[test]
    fn test_add_node_at_index() {
        let forest = sample();
        let next = add_node(&forest, node("e", "Text"), Some("a"), 1).unwrap();
        assert_eq!(ids(&next[0].children), vec!["b", "e", "c"]);
        assert_parent_links(&next, None);

        let next = add_node(&forest, node("e", "Text"), None, 99).unwrap();
        assert_eq!(ids(&next), vec!["a", "d", "e"]);
        // input untouched
        assert_eq!(ids(&forest), vec!["a", "d"]);
    }

    #[test]
    fn test_add_node_to_missing_parent_is_noop() {
        assert!(add_node(&sample(), node("e", "Text"), Some("ghost"), 0).is_none());
    }

    #[test]
    fn test_remove_node_takes_subtree() {
        let next = remove_node(&sample(), "a").unwrap();
        assert_eq!(ids(&next), vec!["d"]);
        assert!(remove_node(&sample(), "ghost").is_none());
    }

    #[test]
    fn test_move_node_across_parents() {
        let next = move_node(&sample(), "d", Some("a"), 0).unwrap();
        assert_eq!(ids(&next), vec!["a"]);
        assert_eq!(ids(&next[0].children), vec!["d", "b", "c"]);
        assert_parent_links(&next, None);

        let next = move_node(&next, "c", None, 0).unwrap();
        assert_eq!(ids(&next), vec!["c", "a"]);
        assert_parent_links(&next, None);
    }

    #[test]
    fn test_move_into_nested_parent_places_one_copy() {
        let forest = sample();
        let next = move_node(&forest, "d", Some("b"), 0).unwrap();
        assert_eq!(node_count(&next), node_count(&forest));

        let mut copies = 0;
        walk_preorder(&next, &mut |n| {
            if n.id == "d" {
                copies += 1;
            }
        });
        assert_eq!(copies, 1);
        assert_eq!(find_parent(&next, "d").unwrap().id, "b");
        assert_parent_links(&next, None);
    }

    #[test]
    fn test_move_into_own_subtree_is_refused() {
        let forest = sample();
        assert!(move_node(&forest, "a", Some("a"), 0).is_none());
        assert!(move_node(&forest, "a", Some("b"), 0).is_none());
        assert!(move_node(&forest, "ghost", None, 0).is_none());
        assert!(move_node(&forest, "b", Some("ghost"), 0).is_none());
    }

    #[test]
    fn test_update_props_merges_and_deletes() {
        let mut patch = PropMap::new();
        patch.insert("content".into(), json!("Hi"));
        let next = update_node_props(&sample(), "b", &patch).unwrap();
        assert_eq!(find_node(&next, "b").unwrap().props.get("content"), Some(&json!("Hi")));

        let mut patch = PropMap::new();
        patch.insert("content".into(), Value::Null);
        let next = update_node_props(&next, "b", &patch).unwrap();
        assert!(find_node(&next, "b").unwrap().props.is_empty());
    }

    #[test]
    fn test_update_styles_and_events() {
        let mut styles = StyleMap::new();
        styles.insert("color".into(), "red".into());
        let next = update_node_styles(&sample(), "c", &styles).unwrap();
        assert_eq!(find_node(&next, "c").unwrap().styles.get("color").map(String::as_str), Some("red"));

        styles.insert("color".into(), "".into());
        let next = update_node_styles(&next, "c", &styles).unwrap();
        assert!(find_node(&next, "c").unwrap().styles.is_empty());

        let mut events = EventMap::new();
        events.insert("onClick".into(), "count += 1".into());
        let next = update_node_events(&next, "c", &events).unwrap();
        assert_eq!(find_node(&next, "c").unwrap().events.len(), 1);
        assert!(update_node_events(&next, "ghost", &events).is_none());
    }

    #[test]
    fn test_duplicate_inserts_after_original_with_fresh_ids() {
        let (next, clone_id) = duplicate_node(&sample(), "a").unwrap();
        assert_eq!(next.len(), 3);
        assert_eq!(next[0].id, "a");
        assert_eq!(next[1].id, clone_id);
        assert_eq!(next[2].id, "d");

        let copy = &next[1];
        assert_eq!(copy.children.len(), 2);
        assert!(copy.children.iter().all(|c| c.id != "b" && c.id != "c"));
        assert_eq!(copy.children[0].component_name, "Text");
        assert_parent_links(&next, None);

        let (next, _) = duplicate_node(&sample(), "b").unwrap();
        assert_eq!(next[0].children.len(), 3);
        assert_eq!(next[0].children[0].id, "b");
        assert_eq!(next[0].children[2].id, "c");
    }

    #[test]
    fn test_is_unset() {
        assert!(is_unset(None));
        assert!(is_unset(Some(&json!(""))));
        assert!(is_unset(Some(&json!(false))));
        assert!(!is_unset(Some(&json!("x"))));
        assert!(!is_unset(Some(&json!(0))));
    }
}
