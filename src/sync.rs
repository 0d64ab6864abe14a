//! Synchronization Controller: source text ↔ canvas forest.
//!
//! Both directions run through this one object, which remembers the last
//! source text it saw or produced and the fingerprint of the last forest it
//! saw or produced.
//!
//! - **Source → Tree**: text identical to the last known source is ignored,
//!   which is exactly what happens when the host echoes back text this
//!   controller just generated. Otherwise the text is parsed and the forest
//!   replaced only if its fingerprint differs from the last known one.
//!
//! - **Tree → Source**: after a store mutation the forest is fingerprinted;
//!   an unchanged fingerprint emits nothing. Otherwise source is generated and
//!   emitted only if it differs from the last known text.
//!
//! Each direction records what it produced as "last known" for the other,
//! so a change travelling round the loop settles after one pass.

use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::codegen::CodeGenerator;
use crate::config::SyncOptions;
use crate::fingerprint::forest_fingerprint;
use crate::parse::{declaration_kind, find_name, parse_flux_to_tree, DeclarationKind};
use crate::reconcile::carry_forward_ids;
use crate::store::VisualEditorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Idle,
    ApplyingSourceChange,
    ApplyingTreeChange,
}

/// What a source change did to the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceSync {
    /// Same text as last time (or a sync is already running).
    Skipped,
    /// Parsed to the forest already shown.
    Unchanged,
    /// The store now holds the parsed forest.
    Replaced { roots: usize },
}

pub struct SyncController {
    store: VisualEditorStore,
    generator: CodeGenerator,
    options: SyncOptions,
    state: SyncState,
    last_source: String,
    last_tree: String,
    file_name: Option<String>,
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

impl SyncController {
    pub fn new(options: SyncOptions) -> Self {
        let store = VisualEditorStore::with_history_limit(options.history_limit);
        let last_tree = forest_fingerprint(store.nodes());
        Self {
            store,
            generator: CodeGenerator::new(options.codegen.clone()),
            options,
            state: SyncState::Idle,
            last_source: String::new(),
            last_tree,
            file_name: None,
        }
    }

    /// File the source belongs to; its stem names the document when the
    /// source has no declaration yet.
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_generator(mut self, generator: CodeGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn store(&self) -> &VisualEditorStore {
        &self.store
    }

    /// Direct store access. Call [`SyncController::on_tree_changed`] after
    /// mutating, or use [`SyncController::mutate`].
    pub fn store_mut(&mut self) -> &mut VisualEditorStore {
        &mut self.store
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn last_source(&self) -> &str {
        &self.last_source
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    // ─── Source → Tree ───────────────────────────────────────────────────

    pub fn on_source_changed(&mut self, source: &str) -> SourceSync {
        if self.state != SyncState::Idle {
            debug!(state = ?self.state, "source change ignored during sync");
            return SourceSync::Skipped;
        }
        if source == self.last_source {
            debug!("source matches last known text, nothing to apply");
            return SourceSync::Skipped;
        }

        self.state = SyncState::ApplyingSourceChange;
        self.last_source = source.to_string();

        let parsed = parse_flux_to_tree(source);
        let nodes = if self.options.preserve_ids_on_reparse {
            carry_forward_ids(self.store.nodes(), parsed)
        } else {
            parsed
        };

        let fingerprint = forest_fingerprint(&nodes);
        let outcome = if fingerprint == self.last_tree {
            SourceSync::Unchanged
        } else {
            self.last_tree = fingerprint;
            let roots = nodes.len();
            self.store.set_nodes(nodes);
            SourceSync::Replaced { roots }
        };

        self.state = SyncState::Idle;
        debug!(outcome = ?outcome, "applied source change");
        outcome
    }

    // ─── Tree → Source ───────────────────────────────────────────────────

    /// New source text for the current forest, or `None` when the forest
    /// (or the text it generates) is what the controller last saw.
    pub fn on_tree_changed(&mut self) -> Option<String> {
        let fingerprint = forest_fingerprint(self.store.nodes());
        if self.state == SyncState::ApplyingSourceChange {
            self.last_tree = fingerprint;
            return None;
        }
        if fingerprint == self.last_tree {
            return None;
        }

        self.state = SyncState::ApplyingTreeChange;
        self.last_tree = fingerprint;

        let source = self.generate_source();
        let emitted = if source != self.last_source {
            self.last_source = source.clone();
            Some(source)
        } else {
            None
        };

        self.state = SyncState::Idle;
        debug!(emitted = emitted.is_some(), "applied tree change");
        emitted
    }

    /// Mutate the store and sync the result back to source in one step.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut VisualEditorStore) -> R) -> (R, Option<String>) {
        let result = f(&mut self.store);
        let source = self.on_tree_changed();
        (result, source)
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Name for generated source: the declared name, else the file stem,
    /// else the configured default.
    pub fn document_name(&self) -> String {
        find_name(&self.last_source)
            .or_else(|| {
                self.file_name.as_deref().and_then(|file| {
                    Path::new(file)
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .map(str::to_string)
                })
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.options.codegen.default_name.clone())
    }

    /// Component sources stay components; everything else is a page.
    pub fn is_component(&self) -> bool {
        declaration_kind(&self.last_source) == Some(DeclarationKind::Component)
    }

    pub fn generate_source(&self) -> String {
        self.generator
            .generate(self.store.nodes(), &self.document_name(), self.is_component())
    }
}
