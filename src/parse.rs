//! Source Parser
//!
//! Rebuilds a [`Forest`] from Flux source text:
//!
//! 1. locate the `page Name {` / `component Name(...) {` declaration,
//! 2. cut its body out by brace matching,
//! 3. pull the optional `style { ... }` block out and index its `.class` rules,
//! 4. scan the remaining markup into elements, recursively,
//! 5. turn each element into a [`CanvasNode`] (styles, events, inner text).
//!
//! The parser is tolerant: anything it cannot make sense of yields an empty
//! forest from [`parse_flux_to_tree`]. [`try_parse`] exposes the reason.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::codegen::WRAPPER_TAG;
use crate::error::{FluxError, FluxResult};
use crate::node::{generate_node_id, CanvasNode, EventMap, Forest, PropMap, StyleMap};
use crate::registry::{get_component_by_name, text_content_prop};
use crate::scan::{
    decode_entities, find_block_end, find_matching_brace, is_outside_tags, is_tag_start,
    skip_string,
};
use crate::tree::is_unset;

lazy_static! {
    static ref PAGE_DECL_RE: Regex = Regex::new(r"\bpage\s+(\w+)\s*\{").unwrap();
    static ref COMPONENT_DECL_RE: Regex =
        Regex::new(r"\bcomponent\s+(\w+)\s*\([^)]*\)\s*\{").unwrap();
    static ref COMPONENT_NAME_RE: Regex = Regex::new(r"\bcomponent\s+(\w+)\s*\(").unwrap();

    /// `style {` or `style scoped {`
    static ref STYLE_BLOCK_RE: Regex = Regex::new(r"\bstyle\s*(?:scoped)?\s*\{").unwrap();
    static ref CSS_RULE_RE: Regex = Regex::new(r"\.([a-zA-Z0-9_-]+)\s*\{([^}]*)\}").unwrap();
    static ref CSS_DECL_RE: Regex = Regex::new(r"([a-zA-Z-]+)\s*:\s*([^;]+);?").unwrap();

    static ref TAG_NAME_RE: Regex = Regex::new(r"^<([A-Za-z][A-Za-z0-9_.-]*)").unwrap();
    static ref ATTR_NAME_RE: Regex = Regex::new(r"^([A-Za-z_:@][A-Za-z0-9_:.@-]*)").unwrap();

    /// `() => { body }` or `() => body`
    static ref HANDLER_RE: Regex = Regex::new(r"^\(\)\s*=>\s*\{?\s*([\s\S]*?)\s*\}?$").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Page,
    Component,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub kind: DeclarationKind,
    pub name: String,
    pub nodes: Forest,
}

/// class name -> merged declarations
type CssRuleMap = HashMap<String, StyleMap>;

#[derive(Debug, Clone, PartialEq)]
enum RawAttrValue<'a> {
    /// `name="..."` / `name='...'` / `name=bare`
    Quoted(&'a str),
    /// `name={...}`, braces stripped
    Expression(&'a str),
    /// `name`
    Bare,
}

#[derive(Debug, Clone)]
struct RawElement<'a> {
    tag: &'a str,
    attrs: Vec<(&'a str, RawAttrValue<'a>)>,
    /// Trimmed inner markup; `None` for self-closing tags.
    inner: Option<&'a str>,
}

struct OpenTag<'a> {
    tag: &'a str,
    attrs: Vec<(&'a str, RawAttrValue<'a>)>,
    self_closing: bool,
    end: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind, name and byte offset of the body's opening brace.
fn locate_declaration(source: &str) -> Option<(DeclarationKind, String, usize)> {
    if let Some(caps) = PAGE_DECL_RE.captures(source) {
        let whole = caps.get(0)?;
        return Some((DeclarationKind::Page, caps[1].to_string(), whole.end() - 1));
    }
    let caps = COMPONENT_DECL_RE.captures(source)?;
    let whole = caps.get(0)?;
    Some((DeclarationKind::Component, caps[1].to_string(), whole.end() - 1))
}

pub fn can_parse_for_visual_editing(source: &str) -> bool {
    PAGE_DECL_RE.is_match(source) || COMPONENT_DECL_RE.is_match(source)
}

pub fn declaration_kind(source: &str) -> Option<DeclarationKind> {
    locate_declaration(source).map(|(kind, _, _)| kind)
}

/// Page or component name, `MyPage` when there is none.
pub fn extract_name(source: &str) -> String {
    find_name(source).unwrap_or_else(|| "MyPage".to_string())
}

pub(crate) fn find_name(source: &str) -> Option<String> {
    if let Some(caps) = PAGE_DECL_RE.captures(source) {
        return Some(caps[1].to_string());
    }
    COMPONENT_NAME_RE
        .captures(source)
        .map(|caps| caps[1].to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
// STYLE BLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Split the body into markup (style block removed) and the class rule map.
fn extract_style_block(content: &str, base_offset: usize) -> FluxResult<(String, CssRuleMap)> {
    let mut rules = CssRuleMap::new();
    // Only a block in markup text counts; `style {` inside an attribute
    // value is data.
    let block = STYLE_BLOCK_RE
        .find_iter(content)
        .find(|m| is_outside_tags(content, m.start()));
    let Some(m) = block else {
        return Ok((content.trim().to_string(), rules));
    };

    let open = m.end() - 1;
    let close = find_block_end(content, open).ok_or(FluxError::UnterminatedStyleBlock {
        offset: base_offset + m.start(),
    })?;
    parse_css_rules(&content[open + 1..close], &mut rules);

    let markup = format!("{}{}", &content[..m.start()], &content[close + 1..]);
    Ok((markup.trim().to_string(), rules))
}

/// `.name { prop: value; }` rules. Repeated classes merge, later keys win.
fn parse_css_rules(css: &str, rules: &mut CssRuleMap) {
    for caps in CSS_RULE_RE.captures_iter(css) {
        let declarations = parse_css_declarations(&caps[2]);
        if declarations.is_empty() {
            continue;
        }
        rules
            .entry(caps[1].to_string())
            .or_default()
            .extend(declarations);
    }
}

fn parse_css_declarations(block: &str) -> StyleMap {
    CSS_DECL_RE
        .captures_iter(block)
        .map(|caps| (caps[1].trim().to_string(), caps[2].trim().to_string()))
        .collect()
}

/// Inline `style="prop: value; ..."`. Only the first `:` splits, so values
/// such as `url(http://...)` survive.
fn parse_inline_style(style: &str) -> StyleMap {
    style
        .split(';')
        .filter_map(|pair| {
            let (prop, value) = pair.split_once(':')?;
            let (prop, value) = (prop.trim(), value.trim());
            (!prop.is_empty() && !value.is_empty()).then(|| (prop.to_string(), value.to_string()))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// ELEMENT SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn next_tag_start(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    (from..bytes.len()).find(|&i| is_tag_start(bytes, i))
}

fn has_tag_start(content: &str) -> bool {
    next_tag_start(content, 0).is_some()
}

/// Parse `<Tag attr=... >` or `<Tag ... />` starting at `start`.
fn scan_open_tag(content: &str, start: usize) -> Option<OpenTag<'_>> {
    let bytes = content.as_bytes();
    let caps = TAG_NAME_RE.captures(&content[start..])?;
    let tag = caps.get(1)?.as_str();
    let mut i = start + caps.get(0)?.end();
    let mut attrs = Vec::new();

    loop {
        i = skip_whitespace(bytes, i);
        match *bytes.get(i)? {
            b'>' => {
                return Some(OpenTag { tag, attrs, self_closing: false, end: i + 1 });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(OpenTag { tag, attrs, self_closing: true, end: i + 2 });
            }
            b'<' => return None,
            _ => {}
        }

        let Some(name_match) = ATTR_NAME_RE.find(&content[i..]) else {
            // Stray character inside the tag.
            i += content[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            continue;
        };
        let name = name_match.as_str();
        i = skip_whitespace(bytes, i + name_match.end());

        if bytes.get(i) != Some(&b'=') {
            attrs.push((name, RawAttrValue::Bare));
            continue;
        }
        i = skip_whitespace(bytes, i + 1);

        match *bytes.get(i)? {
            b'"' | b'\'' => {
                let end = skip_string(bytes, i)?;
                attrs.push((name, RawAttrValue::Quoted(&content[i + 1..end - 1])));
                i = end;
            }
            b'{' => {
                let close = find_matching_brace(content, i)?;
                attrs.push((name, RawAttrValue::Expression(content[i + 1..close].trim())));
                i = close + 1;
            }
            _ => {
                let value_start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && bytes[i] != b'>'
                    && !(bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>'))
                {
                    i += 1;
                }
                attrs.push((name, RawAttrValue::Quoted(&content[value_start..i])));
            }
        }
    }
}

/// Start and end of the `</tag>` matching an element whose opening tag ends
/// at `from`. Same-name opening tags nest; self-closing ones do not.
fn find_closing_tag(content: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let close_prefix = format!("</{}", tag);
    let mut depth = 1usize;
    let mut i = from;

    while i < bytes.len() {
        if bytes[i..].starts_with(close_prefix.as_bytes()) {
            let after = i + close_prefix.len();
            let gt = skip_whitespace(bytes, after);
            if bytes.get(gt) == Some(&b'>') {
                depth -= 1;
                if depth == 0 {
                    return Some((i, gt + 1));
                }
                i = gt + 1;
                continue;
            }
        }
        if is_tag_start(bytes, i) {
            if let Some(open) = scan_open_tag(content, i) {
                if open.tag == tag && !open.self_closing {
                    depth += 1;
                }
                i = open.end;
                continue;
            }
        }
        i += 1;
    }
    None
}

/// Element starting at `start`, plus where the next sibling scan resumes.
/// A missing closing tag swallows the rest of the content and ends the scan.
fn scan_element(content: &str, start: usize) -> Option<(RawElement<'_>, Option<usize>)> {
    let open = scan_open_tag(content, start)?;
    if open.self_closing {
        let element = RawElement { tag: open.tag, attrs: open.attrs, inner: None };
        return Some((element, Some(open.end)));
    }

    let (inner, resume) = match find_closing_tag(content, open.end, open.tag) {
        Some((close_start, close_end)) => (&content[open.end..close_start], Some(close_end)),
        None => (&content[open.end..], None),
    };
    let element = RawElement {
        tag: open.tag,
        attrs: open.attrs,
        inner: Some(inner.trim()),
    };
    Some((element, resume))
}

/// Sibling elements in document order.
fn scan_elements(content: &str) -> Vec<RawElement<'_>> {
    let mut elements = Vec::new();
    let mut cursor = 0;

    while let Some(start) = next_tag_start(content, cursor) {
        let Some((element, resume)) = scan_element(content, start) else {
            trace!(offset = start, "unterminated tag, stopping element scan");
            break;
        };
        trace!(tag = element.tag, "scanned element");
        elements.push(element);
        match resume {
            Some(next) => cursor = next,
            None => break,
        }
    }
    elements
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE CONSTRUCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// `{...}` attribute body: JSON literals keep their type, anything else is
/// kept verbatim as an expression string.
fn parse_expression_value(expr: &str) -> Value {
    serde_json::from_str::<Value>(expr).unwrap_or_else(|_| Value::String(expr.to_string()))
}

/// `onClick`, `onSubmit`, ...
fn is_event_name(name: &str) -> bool {
    name.starts_with("on") && name.as_bytes().get(2).is_some_and(|b| b.is_ascii_uppercase())
}

/// Body of an arrow-function handler, or the handler unchanged.
fn extract_handler_body(handler: &str) -> String {
    let handler = handler.trim();
    HANDLER_RE
        .captures(handler)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| handler.to_string())
}

fn build_nodes(elements: Vec<RawElement<'_>>, parent_id: Option<&str>, css: &CssRuleMap) -> Forest {
    elements
        .into_iter()
        .map(|element| build_node(element, parent_id, css))
        .collect()
}

fn build_node(element: RawElement<'_>, parent_id: Option<&str>, css: &CssRuleMap) -> CanvasNode {
    let def = get_component_by_name(element.tag);
    let id = generate_node_id();

    let mut props = PropMap::new();
    for (name, value) in element.attrs {
        match value {
            RawAttrValue::Quoted(raw) => {
                props.insert(name.to_string(), Value::String(decode_entities(raw)));
            }
            RawAttrValue::Expression(expr) => {
                props.insert(name.to_string(), parse_expression_value(expr));
            }
            RawAttrValue::Bare => {
                if is_unset(props.get(name)) {
                    props.insert(name.to_string(), Value::Bool(true));
                }
            }
        }
    }

    let mut styles = StyleMap::new();
    if let Some(Value::String(inline)) = props.get("style") {
        styles = parse_inline_style(inline);
        props.remove("style");
    }
    // Class rules apply over inline declarations; the class itself is
    // regenerated from the node id, so it never stays a prop.
    if let Some(Value::String(classes)) = props.remove("class") {
        for class in classes.split_whitespace() {
            if let Some(rule) = css.get(class) {
                styles.extend(rule.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }

    let mut events = EventMap::new();
    let event_names: Vec<String> = props.keys().filter(|k| is_event_name(k)).cloned().collect();
    for name in event_names {
        if let Some(Value::String(handler)) = props.remove(&name) {
            events.insert(name, extract_handler_body(&handler));
        }
    }

    let mut children = Vec::new();
    if let Some(inner) = element.inner.filter(|inner| !inner.is_empty()) {
        if has_tag_start(inner) {
            children = build_nodes(scan_elements(inner), Some(&id), css);
        } else if !inner.starts_with('{') {
            if let Some(text_prop) = text_content_prop(def) {
                if is_unset(props.get(text_prop)) {
                    props.insert(text_prop.to_string(), Value::String(decode_entities(inner)));
                }
            }
        }
    }

    CanvasNode {
        id,
        component_name: element.tag.to_string(),
        props,
        styles,
        events,
        children,
        parent_id: parent_id.map(str::to_string),
    }
}

/// The generator wraps multi-root forests in one bare container; undo that.
///
/// Only a sole attribute-less `div` whose two or more children all carry a
/// `class` counts, since generated elements always do. A hand-written bare
/// `div` around unclassed children stays a real node.
fn unwrap_synthetic_wrapper(elements: Vec<RawElement<'_>>) -> Vec<RawElement<'_>> {
    if let [only] = elements.as_slice() {
        if only.tag == WRAPPER_TAG && only.attrs.is_empty() {
            if let Some(inner) = only.inner {
                let roots = scan_elements(inner);
                let all_classed = roots
                    .iter()
                    .all(|root| root.attrs.iter().any(|(name, _)| *name == "class"));
                if roots.len() >= 2 && all_classed {
                    return roots;
                }
            }
        }
    }
    elements
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse with diagnostics.
pub fn try_parse(source: &str) -> FluxResult<ParsedDocument> {
    let (kind, name, body_open) = locate_declaration(source).ok_or(FluxError::MissingDeclaration)?;
    let body_close = find_block_end(source, body_open)
        .ok_or(FluxError::UnbalancedBraces { offset: body_open })?;

    let body = &source[body_open + 1..body_close];
    let (markup, css) = extract_style_block(body, body_open + 1)?;

    let elements = unwrap_synthetic_wrapper(scan_elements(&markup));
    let nodes = build_nodes(elements, None, &css);

    debug!(
        name = %name,
        roots = nodes.len(),
        css_rules = css.len(),
        "parsed flux source"
    );
    Ok(ParsedDocument { kind, name, nodes })
}

/// Parse source text into a forest. Never fails: unparseable input gives an
/// empty forest.
pub fn parse_flux_to_tree(source: &str) -> Forest {
    match try_parse(source) {
        Ok(document) => document.nodes,
        Err(err) => {
            debug!(error = %err, "source not usable for visual editing");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_declaration_prefers_page() {
        let (kind, name, open) = locate_declaration("page Home { }").unwrap();
        assert_eq!(kind, DeclarationKind::Page);
        assert_eq!(name, "Home");
        assert_eq!(open, 10);

        let (kind, name, _) = locate_declaration("component Card(title, body) {}").unwrap();
        assert_eq!(kind, DeclarationKind::Component);
        assert_eq!(name, "Card");

        assert!(locate_declaration("let x = 1").is_none());
    }

    #[test]
    fn test_extract_name() {
        assert_eq!(extract_name("page Landing {"), "Landing");
        assert_eq!(extract_name("component Footer("), "Footer");
        assert_eq!(extract_name("nothing here"), "MyPage");
    }

    #[test]
    fn test_scan_open_tag_attribute_forms() {
        let src = r#"<Input label="Name" rows={3} required value=plain onChange={() => { v = "}" }} />"#;
        let tag = scan_open_tag(src, 0).unwrap();
        assert_eq!(tag.tag, "Input");
        assert!(tag.self_closing);
        assert_eq!(tag.end, src.len());
        assert_eq!(
            tag.attrs,
            vec![
                ("label", RawAttrValue::Quoted("Name")),
                ("rows", RawAttrValue::Expression("3")),
                ("required", RawAttrValue::Bare),
                ("value", RawAttrValue::Quoted("plain")),
                ("onChange", RawAttrValue::Expression(r#"() => { v = "}" }"#)),
            ]
        );
    }

    #[test]
    fn test_find_closing_tag_nests_same_name_only() {
        let src = "<Row><Row /><Row>x</Row></Row> tail";
        let open = scan_open_tag(src, 0).unwrap();
        let (start, end) = find_closing_tag(src, open.end, "Row").unwrap();
        assert_eq!(&src[start..end], "</Row>");
        assert_eq!(&src[end..], " tail");
    }

    #[test]
    fn test_parse_css_rules_merge() {
        let mut rules = CssRuleMap::new();
        parse_css_rules(".a { color: red; margin: 0 } .b{padding:4px} .a { color: blue; }", &mut rules);
        let a = &rules["a"];
        assert_eq!(a["color"], "blue");
        assert_eq!(a["margin"], "0");
        assert_eq!(rules["b"]["padding"], "4px");
    }

    #[test]
    fn test_inline_style_splits_on_first_colon() {
        let styles = parse_inline_style("color: red; background: url(http://x/y.png);;bad");
        assert_eq!(styles["color"], "red");
        assert_eq!(styles["background"], "url(http://x/y.png)");
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn test_event_name_detection() {
        assert!(is_event_name("onClick"));
        assert!(!is_event_name("online"));
        assert!(!is_event_name("on"));
        assert!(!is_event_name("content"));
    }

    #[test]
    fn test_extract_handler_body() {
        assert_eq!(extract_handler_body("() => { count += 1 }"), "count += 1");
        assert_eq!(extract_handler_body("() => submit()"), "submit()");
        assert_eq!(extract_handler_body("handleClick"), "handleClick");
    }

    #[test]
    fn test_expression_values_keep_json_types() {
        assert_eq!(parse_expression_value("42"), Value::from(42));
        assert_eq!(parse_expression_value("false"), Value::Bool(false));
        assert_eq!(parse_expression_value(r#"["a","b"]"#), serde_json::json!(["a", "b"]));
        assert_eq!(parse_expression_value("user.name"), Value::from("user.name"));
    }
}
