//! Code Generator
//!
//! Turns a [`Forest`] back into Flux source. Output is a pure function of the
//! input: prop order comes from the registry declaration (then key order), so
//! generating the same forest twice is byte-identical.
//!
//! Layout of a generated file:
//!
//! ```text
//! page Home {
//!   style {
//!     .<node id> {
//!       color: red;
//!     }
//!   }
//!
//!   <Button class="<node id>">Click me</Button>
//! }
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CodegenOptions;
use crate::node::CanvasNode;
use crate::registry::{accepts_children, get_component_by_name, text_content_prop, ComponentDefinition};
use crate::tree::walk_preorder;

/// Container emitted around a multi-root forest. The parser unwraps it again.
pub const WRAPPER_TAG: &str = "div";

/// Props that never become attributes: `class` is always the node id and
/// inline styles live in the style block.
const RESERVED_PROPS: [&str; 2] = ["class", "style"];

lazy_static! {
    static ref DECIMAL_RE: Regex = Regex::new(r"^\d+\.\d+$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE INFERENCE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDeclaration {
    pub name: String,
    pub initial_value: String,
}

/// Hook for deriving `state name = value` lines from the forest.
pub trait StateInference {
    fn infer(&self, nodes: &[CanvasNode]) -> Vec<StateDeclaration>;
}

/// Emits nothing. Guessing state from prop values produced declarations for
/// class names and enum strings, so state is written by hand in the editor.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStateInference;

impl StateInference for DisabledStateInference {
    fn infer(&self, _nodes: &[CanvasNode]) -> Vec<StateDeclaration> {
        Vec::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUE FORMATTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Conservative check for code-like strings. Single words such as `primary`
/// or `my-class` stay literals.
pub fn is_expression(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    if value.contains('(') && value.contains(')') {
        return true;
    }
    if value.contains('+') || value.contains('*') || value.contains('/') {
        return true;
    }
    const OPERATORS: [&str; 8] = ["===", "!==", "==", "!=", ">=", "<=", "&&", "||"];
    if OPERATORS.iter().any(|op| value.contains(op)) {
        return true;
    }
    if value.contains('?') && value.contains(':') {
        return true;
    }
    if value.contains('.') && !DECIMAL_RE.is_match(value) {
        return true;
    }
    if value.contains('[') && value.contains(']') {
        return true;
    }
    if value.starts_with('!') {
        return true;
    }
    value.contains('`') || value.contains("${")
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `name="literal"`, `name={expr}`, bare `name` or `name={false}`.
/// `None` for values that are not emitted at all (null, empty string).
fn format_prop(name: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => {
            if name != "className" && is_expression(s) && !reads_as_json_structure(s) {
                Some(format!("{}={{{}}}", name, s))
            } else {
                Some(format!("{}=\"{}\"", name, escape_attribute(s)))
            }
        }
        Value::Number(n) => Some(format!("{}={{{}}}", name, n)),
        Value::Bool(true) => Some(name.to_string()),
        Value::Bool(false) => Some(format!("{}={{false}}", name)),
        Value::Array(_) | Value::Object(_) => Some(format!("{}={{{}}}", name, value)),
    }
}

/// Strings such as `[1]` would come back from `{...}` as a JSON array, so
/// they are quoted to keep their type.
fn reads_as_json_structure(value: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(value),
        Ok(Value::Array(_) | Value::Object(_))
    )
}

/// Non-empty string held in the definition's text-content prop.
fn text_content<'a>(node: &'a CanvasNode, def: Option<&ComponentDefinition>) -> Option<&'a str> {
    let prop = text_content_prop(def)?;
    match node.props.get(prop) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

fn is_default_value(def: Option<&ComponentDefinition>, name: &str, value: &Value) -> bool {
    def.and_then(|d| d.prop(name))
        .and_then(|p| p.default_value.as_ref())
        .is_some_and(|default| default == value)
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct CodeGenerator {
    options: CodegenOptions,
    state_inference: Box<dyn StateInference>,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(CodegenOptions::default())
    }
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            state_inference: Box::new(DisabledStateInference),
        }
    }

    pub fn with_state_inference(mut self, inference: Box<dyn StateInference>) -> Self {
        self.state_inference = inference;
        self
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(level * self.options.indent_width)
    }

    /// Full document for `nodes`. An empty forest yields a declaration with
    /// an empty body, which parses back to an empty forest.
    pub fn generate(&self, nodes: &[CanvasNode], name: &str, is_component: bool) -> String {
        let header = if is_component {
            format!("component {}() {{", name)
        } else {
            format!("page {} {{", name)
        };

        if nodes.is_empty() {
            return format!("{}\n}}\n", header);
        }

        let mut lines = vec![header];

        let states = self.state_inference.infer(nodes);
        if !states.is_empty() {
            for state in &states {
                lines.push(format!("{}state {} = {}", self.pad(1), state.name, state.initial_value));
            }
            lines.push(String::new());
        }

        let style_block = self.style_block(nodes);
        if !style_block.is_empty() {
            lines.extend(style_block);
            lines.push(String::new());
        }

        if let [root] = nodes {
            lines.push(self.generate_node(root, 1));
        } else {
            lines.push(format!("{}<{}>", self.pad(1), WRAPPER_TAG));
            lines.extend(nodes.iter().map(|node| self.generate_node(node, 2)));
            lines.push(format!("{}</{}>", self.pad(1), WRAPPER_TAG));
        }

        lines.push("}".to_string());
        lines.push(String::new());
        lines.join("\n")
    }

    /// One `.id { ... }` rule per styled node, pre-order.
    fn style_block(&self, nodes: &[CanvasNode]) -> Vec<String> {
        let mut styled = Vec::new();
        walk_preorder(nodes, &mut |node| {
            if !node.styles.is_empty() {
                styled.push(node);
            }
        });
        if styled.is_empty() {
            return Vec::new();
        }

        let mut lines = vec![format!("{}style {{", self.pad(1))];
        for node in styled {
            lines.push(format!("{}.{} {{", self.pad(2), node.id));
            for (property, value) in &node.styles {
                lines.push(format!("{}{}: {};", self.pad(3), property, value));
            }
            lines.push(format!("{}}}", self.pad(2)));
        }
        lines.push(format!("{}}}", self.pad(1)));
        lines
    }

    /// `event={() => { body }}`. A body with a line comment gets its own
    /// line so the comment cannot swallow the closing braces.
    fn format_handler(&self, event: &str, body: &str, level: usize) -> String {
        if body.contains("//") {
            format!(
                "{}={{() => {{\n{}{}\n{}}}}}",
                event,
                self.pad(level + 1),
                body.trim(),
                self.pad(level)
            )
        } else {
            format!("{}={{() => {{ {} }}}}", event, body)
        }
    }

    /// Markup for one node and its subtree, starting at nesting `level`.
    pub fn generate_node(&self, node: &CanvasNode, level: usize) -> String {
        let spaces = self.pad(level);
        let def = get_component_by_name(&node.component_name);
        let renders_children = accepts_children(def) && !node.children.is_empty();
        let text = if renders_children { None } else { text_content(node, def) };
        let text_prop = text.and_then(|_| text_content_prop(def));

        let mut attributes = Vec::new();
        let mut push_prop = |name: &str, value: &Value| {
            if RESERVED_PROPS.contains(&name) || Some(name) == text_prop {
                return;
            }
            if is_default_value(def, name, value) {
                return;
            }
            if let Some(attribute) = format_prop(name, value) {
                attributes.push(attribute);
            }
        };

        // Declared props first, in declaration order, then the rest by key.
        let declared: Vec<&str> = def
            .map(|d| d.props.iter().map(|p| p.name.as_str()).collect())
            .unwrap_or_default();
        for name in &declared {
            if let Some(value) = node.props.get(*name) {
                push_prop(name, value);
            }
        }
        for (name, value) in &node.props {
            if !declared.contains(&name.as_str()) {
                push_prop(name, value);
            }
        }

        attributes.push(format!("class=\"{}\"", node.id));

        for (event, handler) in &node.events {
            if !handler.trim().is_empty() {
                attributes.push(self.format_handler(event, handler, level));
            }
        }

        let tag = &node.component_name;
        let attrs = format!(" {}", attributes.join(" "));

        if !renders_children {
            return match text {
                Some(text) => format!("{}<{}{}>{}</{}>", spaces, tag, attrs, escape_text(text), tag),
                None => format!("{}<{}{} />", spaces, tag, attrs),
            };
        }

        let mut lines = vec![format!("{}<{}{}>", spaces, tag, attrs)];
        lines.extend(node.children.iter().map(|child| self.generate_node(child, level + 1)));
        lines.push(format!("{}</{}>", spaces, tag));
        lines.join("\n")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Generate with default options.
pub fn generate_flux_code(nodes: &[CanvasNode], name: &str, is_component: bool) -> String {
    CodeGenerator::default().generate(nodes, name, is_component)
}

/// Markup for a single node at column 0, for splicing into existing source.
pub fn generate_insert_code(node: &CanvasNode) -> String {
    CodeGenerator::default().generate_node(node, 0)
}
