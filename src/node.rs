//! Canvas node model
//!
//! A forest of [`CanvasNode`]s is the structured side of the editor. Each node
//! exclusively owns its children; `parent_id` is a lookup-only back reference.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::registry::ComponentDefinition;

/// Ordered root-level nodes. There is no implicit single root.
pub type Forest = Vec<CanvasNode>;

pub type PropMap = BTreeMap<String, Value>;
pub type StyleMap = BTreeMap<String, String>;
pub type EventMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: String,
    pub component_name: String,
    #[serde(default)]
    pub props: PropMap,
    /// CSS property -> value
    #[serde(default)]
    pub styles: StyleMap,
    /// Event name -> handler body
    #[serde(default)]
    pub events: EventMap,
    #[serde(default)]
    pub children: Vec<CanvasNode>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl CanvasNode {
    /// Fresh, parentless node with empty maps.
    pub fn new(component_name: &str) -> Self {
        Self {
            id: generate_node_id(),
            component_name: component_name.to_string(),
            props: PropMap::new(),
            styles: StyleMap::new(),
            events: EventMap::new(),
            children: Vec::new(),
            parent_id: None,
        }
    }

    /// Node for a palette drop, seeded with every declared default value.
    pub fn from_definition(def: &ComponentDefinition) -> Self {
        let mut node = Self::new(&def.name);
        for prop in &def.props {
            if let Some(default) = &prop.default_value {
                node.props.insert(prop.name.clone(), default.clone());
            }
        }
        node
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.styles.insert(property.to_string(), value.to_string());
        self
    }

    pub fn with_event(mut self, name: &str, handler: &str) -> Self {
        self.events.insert(name.to_string(), handler.to_string());
        self
    }

    pub fn with_child(mut self, mut child: CanvasNode) -> Self {
        child.parent_id = Some(self.id.clone());
        self.children.push(child);
        self
    }

    /// Deep copy where this node and every descendant get a new id.
    pub fn clone_with_fresh_ids(&self) -> CanvasNode {
        let id = generate_node_id();
        let children = self
            .children
            .iter()
            .map(|child| {
                let mut cloned = child.clone_with_fresh_ids();
                cloned.parent_id = Some(id.clone());
                cloned
            })
            .collect();
        CanvasNode {
            id,
            component_name: self.component_name.clone(),
            props: self.props.clone(),
            styles: self.styles.clone(),
            events: self.events.clone(),
            children,
            parent_id: self.parent_id.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE ID GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `n` + base36 millisecond timestamp + 6 random chars + base36 counter.
///
/// The counter keeps ids created within the same millisecond distinct even if
/// the random part collides. The result is a valid CSS class name.
pub fn generate_node_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let random = Uuid::new_v4().simple().to_string();
    let counter = NODE_ID_COUNTER.fetch_add(1, Ordering::SeqCst) + 1;
    format!(
        "n{}{}{:0>2}",
        to_base36(millis),
        &random[..6],
        to_base36(counter)
    )
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
