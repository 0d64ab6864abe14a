//! # Flux Visual Editor Core
//!
//! Keeps a Flux source file and a visual component tree describing the same
//! page in step with each other.
//!
//! ## Representation Invariants
//!
//! 1. **Ids**: every node id is unique within a forest. Ids are minted from a
//!    millisecond timestamp, a random suffix and a process-wide counter.
//!
//! 2. **Parent links**: `parent_id` names the node whose `children` hold the
//!    node, or is `None` for roots. Tree operations re-stamp it on insert and
//!    move; ownership lives in `children`, the back link is lookup only.
//!
//! 3. **Class = id**: the generator gives every element `class="<id>"` and
//!    keys its style rule `.<id>`. Styles and markup therefore always agree.
//!
//! 4. **Text vs. self-closing**: a node that renders no children is emitted
//!    either as `<Tag ... />` or, when it carries text content, as
//!    `<Tag ...>text</Tag>`. Never both.
//!
//! 5. **Snapshots**: history entries are owned deep copies and share nothing
//!    with the live forest.
//!
//! ## Sync Contract
//!
//! The parser never fails outward: unreadable source gives an empty forest.
//! The generator is a pure function of `(forest, name, kind)`. The
//! [`sync::SyncController`] remembers the last text and forest fingerprint it
//! saw, so text it generated and then receives back is a no-op.

pub mod codegen;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod history;
pub mod node;
pub mod parse;
pub mod reconcile;
pub mod registry;
pub mod scan;
pub mod store;
pub mod sync;
pub mod tree;

#[cfg(feature = "napi")]
mod bindings;

#[cfg(test)]
mod codegen_tests;

#[cfg(feature = "napi")]
pub use bindings::{
    generate_flux_native, list_components_native, parse_flux_native, try_parse_flux_native,
};

pub use codegen::{
    generate_flux_code, generate_insert_code, is_expression, CodeGenerator, DisabledStateInference,
    StateDeclaration, StateInference,
};
pub use config::{CodegenOptions, SyncOptions};
pub use error::{FluxError, FluxResult};
pub use history::{History, HistoryEntry};
pub use node::{generate_node_id, CanvasNode, EventMap, Forest, PropMap, StyleMap};
pub use parse::{
    can_parse_for_visual_editing, declaration_kind, extract_name, parse_flux_to_tree, try_parse,
    DeclarationKind, ParsedDocument,
};
pub use registry::{
    all_components, components_by_category, get_component_by_name, search_components,
    ComponentCategory, ComponentDefinition, EventDefinition, PropDefinition, PropType,
};
pub use store::VisualEditorStore;
pub use sync::{SourceSync, SyncController, SyncState};
