//! Id carry-forward after a reparse.
//!
//! Parsing mints fresh ids for every node. To keep selection and hover stable
//! across a text edit, nodes of the new forest take over the id of the node at
//! the same position in the old forest when both have the same component name.
//! Matching stops descending at the first mismatch, so a carried id always
//! belongs to exactly one node.

use crate::node::{CanvasNode, Forest};

pub fn carry_forward_ids(previous: &[CanvasNode], parsed: Forest) -> Forest {
    carry_level(previous, parsed, None)
}

fn carry_level(previous: &[CanvasNode], parsed: Forest, parent_id: Option<&str>) -> Forest {
    parsed
        .into_iter()
        .enumerate()
        .map(|(index, mut node)| {
            let matched = previous
                .get(index)
                .filter(|old| old.component_name == node.component_name);

            let old_children: &[CanvasNode] = match matched {
                Some(old) => {
                    node.id = old.id.clone();
                    &old.children
                }
                None => &[],
            };
            node.parent_id = parent_id.map(str::to_string);

            let children = std::mem::take(&mut node.children);
            node.children = carry_level(old_children, children, Some(&node.id));
            node
        })
        .collect()
}
