//! Graph builder.
//!
//! Owns element identity for a run: the id counter, the element arena, and
//! the lookup tables that guarantee at most one vertex per logical entity
//! (ResultSet per canonical symbol, range per `(document, span)`, moniker
//! per scope key) and at most one outgoing `next` edge per vertex.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use tsz_common::position::Range;

use crate::checker::{DocumentId, DocumentInfo, SymbolId};
use crate::error::{IndexError, Result};
use crate::protocol::{
    Document, Edge, EdgeData, EdgeDataMultiIn, Element, ElementData, Hover, HoverResult, Id,
    Item, ItemProperty, LSIF_VERSION, MarkedString, MetaData, Moniker, POSITION_ENCODING,
    Project, RangeTag, RangeVertex, ToolInfo, UniquenessLevel, Vertex,
};

/// Identity of a moniker vertex. Document-scoped monikers are unique per
/// document; all others are unique per scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MonikerKey {
    Document {
        document: DocumentId,
        scheme: String,
        identifier: String,
    },
    Shared {
        unique: UniquenessLevel,
        scheme: String,
        identifier: String,
    },
}

impl MonikerKey {
    fn new(moniker: &Moniker, scope_document: DocumentId) -> Self {
        match moniker.unique {
            UniquenessLevel::Document => MonikerKey::Document {
                document: scope_document,
                scheme: moniker.scheme.clone(),
                identifier: moniker.identifier.clone(),
            },
            unique => MonikerKey::Shared {
                unique,
                scheme: moniker.scheme.clone(),
                identifier: moniker.identifier.clone(),
            },
        }
    }
}

#[derive(Debug)]
pub struct GraphBuilder {
    next_id: Id,
    elements: Vec<Element>,
    documents: FxHashMap<DocumentId, Id>,
    result_sets: IndexMap<SymbolId, Id>,
    module_result_sets: FxHashMap<DocumentId, Id>,
    structural: FxHashMap<(DocumentId, String), Id>,
    monikers: FxHashMap<MonikerKey, Id>,
    ranges: FxHashMap<(DocumentId, Range), Id>,
    document_ranges: FxHashMap<DocumentId, Vec<Id>>,
    next_edges: FxHashMap<Id, Id>,
    moniker_edges: FxHashSet<(Id, Id)>,
    attach_edges: FxHashSet<(Id, Id)>,
    item_edges: FxHashSet<(Id, Id, Option<ItemProperty>)>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            next_id: 1,
            elements: Vec::new(),
            documents: FxHashMap::default(),
            result_sets: IndexMap::new(),
            module_result_sets: FxHashMap::default(),
            structural: FxHashMap::default(),
            monikers: FxHashMap::default(),
            ranges: FxHashMap::default(),
            document_ranges: FxHashMap::default(),
            next_edges: FxHashMap::default(),
            moniker_edges: FxHashSet::default(),
            attach_edges: FxHashSet::default(),
            item_edges: FxHashSet::default(),
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Id of the most recently emitted element, 0 when nothing was emitted.
    pub fn last_id(&self) -> Id {
        self.next_id - 1
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    fn vertex(&mut self, vertex: Vertex) -> Id {
        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(Element {
            id,
            data: ElementData::Vertex(vertex),
        });
        id
    }

    fn edge(&mut self, edge: Edge) -> Result<Id> {
        let label = edge.label();
        self.check_vertex(label, edge.out_v())?;
        for in_v in edge.in_vs() {
            self.check_vertex(label, in_v)?;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.elements.push(Element {
            id,
            data: ElementData::Edge(edge),
        });
        Ok(id)
    }

    fn check_vertex(&self, label: &'static str, id: Id) -> Result<()> {
        let known = id
            .checked_sub(1)
            .and_then(|index| self.elements.get(index as usize))
            .is_some_and(|element| element.as_vertex().is_some());
        if known {
            Ok(())
        } else {
            Err(IndexError::UnknownVertex { label, id })
        }
    }

    // =========================================================================
    // Envelope
    // =========================================================================

    pub fn emit_meta_data(&mut self, project_root: &str) -> Id {
        self.vertex(Vertex::MetaData(MetaData {
            version: LSIF_VERSION.to_string(),
            position_encoding: POSITION_ENCODING.to_string(),
            project_root: project_root.to_string(),
            tool_info: ToolInfo {
                name: "tsz-lsif".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }))
    }

    pub fn emit_project(&mut self, kind: &str) -> Id {
        self.vertex(Vertex::Project(Project {
            kind: kind.to_string(),
        }))
    }

    pub fn emit_document(&mut self, document: DocumentId, info: &DocumentInfo) -> Result<Id> {
        if let Some(&existing) = self.documents.get(&document) {
            return Err(IndexError::DuplicateVertex {
                kind: "document",
                entity: info.uri.clone(),
                existing,
            });
        }
        let id = self.vertex(Vertex::Document(Document {
            uri: info.uri.clone(),
            language_id: info.language_id.clone(),
        }));
        self.documents.insert(document, id);
        Ok(id)
    }

    pub fn document_vertex(&self, document: DocumentId) -> Option<Id> {
        self.documents.get(&document).copied()
    }

    pub fn emit_contains(&mut self, out_v: Id, in_vs: Vec<Id>) -> Result<Option<Id>> {
        if in_vs.is_empty() {
            return Ok(None);
        }
        self.edge(Edge::Contains(EdgeDataMultiIn { out_v, in_vs }))
            .map(Some)
    }

    /// Ranges emitted for `document`, in emission order.
    pub fn ranges_in_document(&self, document: DocumentId) -> &[Id] {
        self.document_ranges
            .get(&document)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // =========================================================================
    // Ranges and ResultSets
    // =========================================================================

    /// New range vertex for `span`. A second range for the same span is an
    /// error.
    pub fn emit_range(
        &mut self,
        document: DocumentId,
        span: Range,
        tag: Option<RangeTag>,
    ) -> Result<Id> {
        if let Some(&existing) = self.ranges.get(&(document, span)) {
            return Err(IndexError::DuplicateVertex {
                kind: "range",
                entity: format!("document {} at {:?}", document.0, span),
                existing,
            });
        }
        let id = self.vertex(Vertex::Range(RangeVertex { range: span, tag }));
        self.ranges.insert((document, span), id);
        self.document_ranges.entry(document).or_default().push(id);
        Ok(id)
    }

    pub fn range_at(&self, document: DocumentId, span: Range) -> Option<Id> {
        self.ranges.get(&(document, span)).copied()
    }

    /// ResultSet of a canonical symbol, creating it on first request.
    /// Returns `(vertex, created)`.
    pub fn emit_or_reuse_result_set(&mut self, symbol: SymbolId) -> (Id, bool) {
        if let Some(&existing) = self.result_sets.get(&symbol) {
            return (existing, false);
        }
        let id = self.vertex(Vertex::ResultSet);
        self.result_sets.insert(symbol, id);
        trace!(symbol = symbol.0, id, "result set");
        (id, true)
    }

    /// New ResultSet for a symbol that must not have one yet.
    pub fn emit_result_set(&mut self, symbol: SymbolId) -> Result<Id> {
        if let Some(&existing) = self.result_sets.get(&symbol) {
            return Err(IndexError::DuplicateVertex {
                kind: "resultSet",
                entity: format!("symbol {}", symbol.0),
                existing,
            });
        }
        Ok(self.emit_or_reuse_result_set(symbol).0)
    }

    pub fn result_set(&self, symbol: SymbolId) -> Option<Id> {
        self.result_sets.get(&symbol).copied()
    }

    /// ResultSets in creation order.
    pub fn result_sets(&self) -> impl Iterator<Item = (SymbolId, Id)> {
        self.result_sets.iter().map(|(&symbol, &id)| (symbol, id))
    }

    /// ResultSet naming a module itself. Kept apart from symbol ResultSets,
    /// so it never takes part in references or aggregates.
    pub fn emit_module_result_set(&mut self, document: DocumentId) -> Result<Id> {
        if let Some(&existing) = self.module_result_sets.get(&document) {
            return Err(IndexError::DuplicateVertex {
                kind: "resultSet",
                entity: format!("module {}", document.0),
                existing,
            });
        }
        let id = self.vertex(Vertex::ResultSet);
        self.module_result_sets.insert(document, id);
        trace!(document = document.0, id, "module result set");
        Ok(id)
    }

    pub fn module_result_set(&self, document: DocumentId) -> Option<Id> {
        self.module_result_sets.get(&document).copied()
    }

    /// `next` edge from `from` to `to`.
    pub fn link_next(&mut self, from: Id, to: Id) -> Result<Id> {
        if let Some(&existing) = self.next_edges.get(&from) {
            return Err(IndexError::DuplicateNext { from, existing });
        }
        let mut current = to;
        loop {
            if current == from {
                return Err(IndexError::NextCycle { from, to });
            }
            match self.next_edges.get(&current) {
                Some(&next) => current = next,
                None => break,
            }
        }
        let id = self.edge(Edge::Next(EdgeData {
            out_v: from,
            in_v: to,
        }))?;
        self.next_edges.insert(from, to);
        Ok(id)
    }

    pub fn next_of(&self, vertex: Id) -> Option<Id> {
        self.next_edges.get(&vertex).copied()
    }

    // =========================================================================
    // Structural dedup cache
    // =========================================================================

    pub fn lookup_structural(&self, document: DocumentId, identifier: &str) -> Option<Id> {
        self.structural
            .get(&(document, identifier.to_string()))
            .copied()
    }

    /// Entries are written once; a later record for the same key keeps the
    /// original owner.
    pub fn record_structural(&mut self, document: DocumentId, identifier: String, result_set: Id) {
        self.structural
            .entry((document, identifier))
            .or_insert(result_set);
    }

    // =========================================================================
    // Monikers
    // =========================================================================

    /// Moniker vertex for `moniker`, reused when its scope key was seen
    /// before. Returns `(vertex, created)`.
    pub fn emit_moniker_vertex(&mut self, moniker: Moniker, scope_document: DocumentId) -> (Id, bool) {
        let key = MonikerKey::new(&moniker, scope_document);
        if let Some(&existing) = self.monikers.get(&key) {
            trace!(identifier = %moniker.identifier, existing, "moniker reused");
            return (existing, false);
        }
        let id = self.vertex(Vertex::Moniker(moniker));
        self.monikers.insert(key, id);
        (id, true)
    }

    /// Moniker vertex plus a `moniker` edge from `target`.
    pub fn emit_moniker(
        &mut self,
        target: Id,
        moniker: Moniker,
        scope_document: DocumentId,
    ) -> Result<Id> {
        let (moniker_id, _) = self.emit_moniker_vertex(moniker, scope_document);
        self.link_moniker(target, moniker_id)?;
        Ok(moniker_id)
    }

    pub fn link_moniker(&mut self, target: Id, moniker: Id) -> Result<()> {
        if self.moniker_edges.insert((target, moniker)) {
            self.edge(Edge::Moniker(EdgeData {
                out_v: target,
                in_v: moniker,
            }))?;
        }
        Ok(())
    }

    /// `attach` edge from a derived moniker to the moniker it extends.
    pub fn attach(&mut self, moniker: Id, target: Id) -> Result<()> {
        if moniker != target && self.attach_edges.insert((moniker, target)) {
            self.edge(Edge::Attach(EdgeData {
                out_v: moniker,
                in_v: target,
            }))?;
        }
        Ok(())
    }

    // =========================================================================
    // Results
    // =========================================================================

    pub fn emit_hover_result(&mut self, result_set: Id, language: &str, text: &str) -> Result<Id> {
        let hover = self.vertex(Vertex::HoverResult(HoverResult {
            result: Hover {
                contents: vec![MarkedString {
                    language: language.to_string(),
                    value: text.to_string(),
                }],
            },
        }));
        self.edge(Edge::Hover(EdgeData {
            out_v: result_set,
            in_v: hover,
        }))?;
        Ok(hover)
    }

    pub fn emit_definition_result(&mut self, result_set: Id) -> Result<Id> {
        let result = self.vertex(Vertex::DefinitionResult);
        self.edge(Edge::Definition(EdgeData {
            out_v: result_set,
            in_v: result,
        }))?;
        Ok(result)
    }

    pub fn emit_reference_result(&mut self, result_set: Id) -> Result<Id> {
        let result = self.vertex(Vertex::ReferenceResult);
        self.edge(Edge::References(EdgeData {
            out_v: result_set,
            in_v: result,
        }))?;
        Ok(result)
    }

    /// `item` edge from an aggregate to `items` of one shard. Each
    /// `(owner, shard, property)` triple gets a single edge; repeats and
    /// empty batches are dropped.
    pub fn emit_reference_aggregate(
        &mut self,
        owner: Id,
        shard: Id,
        items: Vec<Id>,
        property: Option<ItemProperty>,
    ) -> Result<Option<Id>> {
        if items.is_empty() || !self.item_edges.insert((owner, shard, property)) {
            return Ok(None);
        }
        self.check_vertex("item", shard)?;
        self.edge(Edge::Item(Item {
            out_v: owner,
            in_vs: items,
            shard,
            property,
        }))
        .map(Some)
    }
}

#[cfg(test)]
#[path = "../tests/graph_builder_tests.rs"]
mod graph_builder_tests;
