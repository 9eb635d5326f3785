//! State threaded through one indexing run.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::checker::{DocumentId, DocumentInfo, SymbolId};
use crate::config::LsifConfig;
use crate::export_path::ExportPath;
use crate::export_walker::WalkItem;
use crate::graph_builder::GraphBuilder;
use crate::merge::MergeEngine;
use crate::protocol::{Element, Id};

/// First export path found for a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLocation {
    pub module: DocumentId,
    pub path: ExportPath,
}

/// A range linked to a ResultSet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry {
    pub document: DocumentId,
    pub range: Id,
    /// `false` for declarations without a body and for references.
    pub is_definition: bool,
}

/// What the run knows about one emitted ResultSet.
#[derive(Debug, Clone)]
pub struct ResultSetRecord {
    pub symbol: SymbolId,
    pub primary_moniker: Option<Id>,
    pub definitions: Vec<RangeEntry>,
    pub references: Vec<RangeEntry>,
}

impl ResultSetRecord {
    pub fn new(symbol: SymbolId) -> Self {
        ResultSetRecord {
            symbol,
            primary_moniker: None,
            definitions: Vec::new(),
            references: Vec::new(),
        }
    }
}

pub struct IndexingContext {
    pub config: LsifConfig,
    pub builder: GraphBuilder,
    pub merge: MergeEngine,
    pub project: Id,
    /// Program documents in checker order.
    pub documents: IndexMap<DocumentId, DocumentInfo>,
    pub module_aliases: FxHashMap<DocumentId, String>,
    /// Walk results per module, in document order.
    pub walks: IndexMap<DocumentId, Vec<WalkItem>>,
    /// Canonical symbol to its first export path.
    pub export_index: FxHashMap<SymbolId, ExportLocation>,
    pub records: FxHashMap<Id, ResultSetRecord>,
}

impl IndexingContext {
    pub fn new(config: LsifConfig) -> Self {
        IndexingContext {
            config,
            builder: GraphBuilder::new(),
            merge: MergeEngine::new(),
            project: 0,
            documents: IndexMap::new(),
            module_aliases: FxHashMap::default(),
            walks: IndexMap::new(),
            export_index: FxHashMap::default(),
            records: FxHashMap::default(),
        }
    }

    /// Emitted (non-external) documents.
    pub fn is_local(&self, document: DocumentId) -> bool {
        self.documents
            .get(&document)
            .is_some_and(|info| !info.external)
    }

    pub fn local_documents(&self) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|(_, info)| !info.external)
            .map(|(&document, _)| document)
            .collect()
    }

    pub fn module_alias(&self, document: DocumentId) -> &str {
        self.module_aliases
            .get(&document)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOutput {
    pub elements: Vec<Element>,
    pub last_id: Id,
}
