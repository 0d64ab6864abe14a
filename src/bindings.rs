//! JS host bindings. Everything crosses the boundary as JSON strings.

use napi_derive::napi;

use crate::codegen::generate_flux_code;
use crate::node::CanvasNode;
use crate::parse::{parse_flux_to_tree, try_parse};
use crate::registry::{all_components, search_components};

#[napi]
pub fn parse_flux_native(source: String) -> napi::Result<String> {
    let nodes = parse_flux_to_tree(&source);
    serde_json::to_string(&nodes)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

/// Like `parse_flux_native` but fails with the parse diagnostic instead of
/// returning an empty forest.
#[napi]
pub fn try_parse_flux_native(source: String) -> napi::Result<String> {
    let document = try_parse(&source).map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_string(&document)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

#[napi]
pub fn generate_flux_native(
    nodes_json: String,
    name: String,
    is_component: bool,
) -> napi::Result<String> {
    let nodes: Vec<CanvasNode> = serde_json::from_str(&nodes_json)
        .map_err(|e| napi::Error::from_reason(format!("Nodes parse error: {}", e)))?;
    Ok(generate_flux_code(&nodes, &name, is_component))
}

#[napi]
pub fn list_components_native(query: Option<String>) -> napi::Result<String> {
    let result = match query {
        Some(q) => serde_json::to_string(&search_components(&q)),
        None => serde_json::to_string(all_components()),
    };
    result.map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
