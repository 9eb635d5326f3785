//! Indexing run.
//!
//! One run is one batch pass over a checked program:
//!
//! 1. `metaData` and `project`
//! 2. walk every module's exports (library documents included) so that each
//!    symbol's first export path is known before any ResultSet exists
//! 3. `document` vertices
//! 4. per document: export walk items, then every remaining declared symbol
//! 5. reference ranges for each ResultSet, in creation order
//! 6. definition and reference aggregates
//! 7. `contains` edges
//!
//! Every phase runs on the same [`IndexingContext`], so element ids are
//! assigned in a single deterministic sequence.

use indexmap::IndexMap;
use tracing::{debug, debug_span, trace, warn};
use tsz_common::limits;
use tsz_common::position::Range;

use crate::checker::{Checker, Declaration, DocumentId, SymbolId, symbol_flags};
use crate::config::LsifConfig;
use crate::context::{ExportLocation, IndexOutput, IndexingContext, RangeEntry, ResultSetRecord};
use crate::error::Result;
use crate::export_path::ExportPath;
use crate::export_walker::{ExportWalker, WalkNode};
use crate::merge::RenameBridge;
use crate::moniker::{StructuralHasher, local_moniker, module_alias, path_moniker};
use crate::protocol::{Id, ItemProperty, Moniker, MonikerKind, RangeTag};

const HOVER_LANGUAGE: &str = "typescript";

/// Index `checker`'s program.
pub fn index<C: Checker + ?Sized>(checker: &C, config: LsifConfig) -> Result<IndexOutput> {
    Indexer::new(checker, config).run()
}

pub struct Indexer<'a, C: Checker + ?Sized> {
    checker: &'a C,
    cx: IndexingContext,
}

impl<'a, C: Checker + ?Sized> Indexer<'a, C> {
    pub fn new(checker: &'a C, config: LsifConfig) -> Self {
        Indexer {
            checker,
            cx: IndexingContext::new(config),
        }
    }

    pub fn run(mut self) -> Result<IndexOutput> {
        let _span = debug_span!("lsif_index").entered();

        self.emit_envelope();
        self.collect_exports();
        self.emit_documents()?;

        for document in self.cx.local_documents() {
            let _span = debug_span!("document", id = document.0).entered();
            self.emit_exports(document)?;
            self.emit_locals(document)?;
        }

        self.emit_references()?;
        self.emit_aggregates()?;
        if self.cx.config.emit_contains {
            self.emit_contains()?;
        }

        let last_id = self.cx.builder.last_id();
        debug!(last_id, "index complete");
        Ok(IndexOutput {
            elements: self.cx.builder.into_elements(),
            last_id,
        })
    }

    fn emit_envelope(&mut self) {
        let root = self.cx.config.project_root.clone();
        let kind = self.cx.config.project_kind.clone();
        self.cx.builder.emit_meta_data(&root);
        self.cx.project = self.cx.builder.emit_project(&kind);
    }

    // =========================================================================
    // Phase 1: export paths
    // =========================================================================

    fn collect_exports(&mut self) {
        let _span = debug_span!("collect_exports").entered();

        for document in self.checker.documents() {
            let Some(info) = self.checker.document(document) else {
                warn!(document = document.0, "document unavailable");
                continue;
            };
            let alias = module_alias(&info, &self.cx.config.project_root);
            self.cx.module_aliases.insert(document, alias);
            self.cx.documents.insert(document, info);
        }

        let documents: Vec<DocumentId> = self.cx.documents.keys().copied().collect();
        for document in documents {
            let items = ExportWalker::new(
                self.checker,
                &mut self.cx.merge,
                self.cx.config.max_walk_depth,
            )
            .walk_module(document);

            for item in &items {
                let subject = self.cx.merge.find(item.node.subject());
                self.cx
                    .export_index
                    .entry(subject)
                    .or_insert_with(|| ExportLocation {
                        module: document,
                        path: item.path.clone(),
                    });
            }
            self.cx.walks.insert(document, items);
        }
    }

    fn emit_documents(&mut self) -> Result<()> {
        let documents: Vec<_> = self
            .cx
            .documents
            .iter()
            .filter(|(_, info)| !info.external)
            .map(|(&document, info)| (document, info.clone()))
            .collect();
        for (document, info) in documents {
            self.cx.builder.emit_document(document, &info)?;
        }
        Ok(())
    }

    // =========================================================================
    // Phase 2: ResultSets and monikers
    // =========================================================================

    fn emit_exports(&mut self, module: DocumentId) -> Result<()> {
        if self.checker.exports_of_module(module).is_some() {
            self.emit_module_moniker(module)?;
        }
        let items = self.cx.walks.get(&module).cloned().unwrap_or_default();
        for item in items {
            match item.node {
                WalkNode::Symbol(symbol) => {
                    if let Some(result_set) = self.ensure_result_set(symbol)? {
                        self.add_path_moniker(result_set, module, &item.path)?;
                    }
                }
                WalkNode::Alias {
                    alias,
                    target,
                    renamed,
                } => {
                    let target_set = self.ensure_result_set(target)?;
                    let Some(alias_set) = self.ensure_result_set(alias)? else {
                        continue;
                    };
                    if renamed {
                        let shard = self
                            .checker
                            .declarations_of(alias)
                            .first()
                            .map(|decl| decl.document)
                            .unwrap_or(module);
                        debug!(alias = alias.0, target = target.0, "[RENAME] bridge");
                        self.cx.merge.record_rename(target, alias, shard);
                    } else if let Some(target_set) = target_set
                        && target_set != alias_set
                        && self.cx.builder.next_of(alias_set).is_none()
                    {
                        self.cx.builder.link_next(alias_set, target_set)?;
                    }
                    self.add_path_moniker(alias_set, module, &item.path)?;
                }
            }
        }
        Ok(())
    }

    /// `<alias>:` moniker on a ResultSet standing for the module itself.
    fn emit_module_moniker(&mut self, module: DocumentId) -> Result<()> {
        let result_set = self.cx.builder.emit_module_result_set(module)?;
        let moniker = path_moniker(
            &self.cx.config.moniker_scheme,
            self.cx.module_alias(module),
            &ExportPath::root(),
            MonikerKind::Export,
        );
        self.cx.builder.emit_moniker(result_set, moniker, module)?;
        Ok(())
    }

    /// Declared symbols not reached through any export. Import aliases link
    /// their declaration to the imported symbol: the range is tagged as a
    /// definition but aggregated with the target's references.
    fn emit_locals(&mut self, document: DocumentId) -> Result<()> {
        for symbol in self.checker.symbols_in_document(document) {
            if self.cx.builder.result_set(self.cx.merge.find(symbol)).is_some() {
                continue;
            }
            let Some(data) = self.checker.symbol(symbol) else {
                warn!(symbol = symbol.0, "symbol unavailable");
                continue;
            };
            if !data.has_flags(symbol_flags::ALIAS) {
                self.ensure_result_set(symbol)?;
                continue;
            }

            let Some(target) = self.import_target(symbol) else {
                continue;
            };
            let Some(target_set) = self.ensure_result_set(target)? else {
                continue;
            };
            for decl in self.checker.declarations_of(symbol) {
                if decl.document != document
                    || self.cx.builder.range_at(document, decl.range).is_some()
                {
                    continue;
                }
                trace!(alias = symbol.0, target = target.0, "import alias");
                let tag = RangeTag::Definition {
                    text: decl.text,
                    kind: decl.kind,
                    full_range: decl.full_range,
                };
                self.link_range(target_set, document, decl.range, tag, false, false)?;
            }
        }
        Ok(())
    }

    /// First symbol along an import's alias chain that has an export path of
    /// its own (so renamed exports keep their importers), else the chain's
    /// end.
    fn import_target(&self, import: SymbolId) -> Option<SymbolId> {
        let mut current = import;
        for _ in 0..limits::MAX_ALIAS_CHAIN_DEPTH {
            let next = self.checker.resolve_alias(current)?;
            if self.cx.export_index.contains_key(&self.cx.merge.find(next)) {
                return Some(next);
            }
            if !self.checker.symbol(next)?.has_flags(symbol_flags::ALIAS) {
                return Some(next);
            }
            current = next;
        }
        warn!(import = import.0, "import alias chain too long or cyclic");
        None
    }

    /// ResultSet for `symbol`'s group, created on first request together
    /// with its primary moniker, definition ranges and hover.
    fn ensure_result_set(&mut self, symbol: SymbolId) -> Result<Option<Id>> {
        let canonical = self.cx.merge.find(symbol);
        if let Some(existing) = self.cx.builder.result_set(canonical) {
            return Ok(Some(existing));
        }
        if self.checker.symbol(canonical).is_none() {
            warn!(symbol = canonical.0, "symbol unavailable");
            return Ok(None);
        }
        // Declaration-merged members contribute their declarations too.
        let declarations: Vec<Declaration> = self
            .cx
            .merge
            .group_of(canonical)
            .into_iter()
            .flat_map(|member| self.checker.declarations_of(member))
            .collect();

        // A declaration span already owned by another ResultSet.
        for decl in &declarations {
            if let Some(range) = self.cx.builder.range_at(decl.document, decl.range)
                && let Some(owner_set) = self.cx.builder.next_of(range)
                && let Some(owner) = self.cx.records.get(&owner_set).map(|r| r.symbol)
            {
                debug!(
                    "[MERGE] symbol {} shares a declaration with {}",
                    canonical.0, owner.0
                );
                self.cx.merge.union(owner, canonical);
                self.emit_definition_ranges(owner_set, &declarations)?;
                return Ok(Some(owner_set));
            }
        }

        let location = self
            .cx
            .export_index
            .get(&canonical)
            .or_else(|| self.cx.export_index.get(&symbol))
            .cloned();
        let scheme = self.cx.config.moniker_scheme.clone();
        let primary = match location {
            Some(location) => {
                let declared_external = !declarations.is_empty()
                    && declarations.iter().all(|decl| !self.cx.is_local(decl.document));
                let kind = if declared_external {
                    MonikerKind::Import
                } else {
                    MonikerKind::Export
                };
                let alias = self.cx.module_alias(location.module);
                Some((
                    path_moniker(&scheme, alias, &location.path, kind),
                    location.module,
                ))
            }
            None => {
                let Some(home) = declarations.first().map(|decl| decl.document) else {
                    debug!(symbol = canonical.0, "no declarations, no moniker");
                    return self.create_result_set(canonical, None, &declarations);
                };
                let uri = self
                    .cx
                    .documents
                    .get(&home)
                    .map(|info| info.uri.clone())
                    .unwrap_or_default();
                let hasher = StructuralHasher::new(self.checker);
                match hasher.local_identifier(&uri, canonical) {
                    Some(identifier) if hasher.is_structural_member(canonical) => {
                        return self.ensure_structural_result_set(
                            canonical,
                            home,
                            identifier,
                            &declarations,
                        );
                    }
                    Some(identifier) => Some((local_moniker(&scheme, identifier), home)),
                    None => {
                        debug!(symbol = canonical.0, "type unresolvable, moniker skipped");
                        None
                    }
                }
            }
        };

        self.create_result_set(canonical, primary, &declarations)
    }

    /// Members of identical anonymous shapes in one document share the
    /// ResultSet of the first one seen.
    fn ensure_structural_result_set(
        &mut self,
        canonical: SymbolId,
        home: DocumentId,
        identifier: String,
        declarations: &[Declaration],
    ) -> Result<Option<Id>> {
        if let Some(owner_set) = self.cx.builder.lookup_structural(home, &identifier)
            && let Some(owner) = self.cx.records.get(&owner_set).map(|r| r.symbol)
        {
            debug!(
                "[MERGE] symbol {} is a structural duplicate of {}",
                canonical.0, owner.0
            );
            self.cx.merge.union(owner, canonical);
            self.emit_definition_ranges(owner_set, declarations)?;
            return Ok(Some(owner_set));
        }

        let moniker = local_moniker(&self.cx.config.moniker_scheme, identifier.clone());
        let result_set = self.create_result_set(canonical, Some((moniker, home)), declarations)?;
        if let Some(result_set) = result_set {
            self.cx.builder.record_structural(home, identifier, result_set);
        }
        Ok(result_set)
    }

    fn create_result_set(
        &mut self,
        canonical: SymbolId,
        primary: Option<(Moniker, DocumentId)>,
        declarations: &[Declaration],
    ) -> Result<Option<Id>> {
        let result_set = self.cx.builder.emit_result_set(canonical)?;
        let mut record = ResultSetRecord::new(canonical);

        if let Some((moniker, scope)) = primary {
            let moniker_id = self.cx.builder.emit_moniker(result_set, moniker, scope)?;
            record.primary_moniker = Some(moniker_id);
        }
        self.cx.records.insert(result_set, record);

        self.emit_definition_ranges(result_set, declarations)?;

        if self.cx.config.emit_hover
            && let Some(text) = self.checker.hover(canonical)
        {
            self.cx
                .builder
                .emit_hover_result(result_set, HOVER_LANGUAGE, &text)?;
        }
        Ok(Some(result_set))
    }

    fn emit_definition_ranges(&mut self, result_set: Id, declarations: &[Declaration]) -> Result<()> {
        for decl in declarations {
            if !self.cx.is_local(decl.document)
                || self.cx.builder.range_at(decl.document, decl.range).is_some()
            {
                continue;
            }
            let tag = RangeTag::Definition {
                text: decl.text.clone(),
                kind: decl.kind,
                full_range: decl.full_range,
            };
            self.link_range(
                result_set,
                decl.document,
                decl.range,
                tag,
                true,
                decl.is_definition,
            )?;
        }
        Ok(())
    }

    /// New range linked with `next` to `result_set` and recorded for its
    /// aggregates.
    fn link_range(
        &mut self,
        result_set: Id,
        document: DocumentId,
        span: Range,
        tag: RangeTag,
        declaration: bool,
        is_definition: bool,
    ) -> Result<Id> {
        let range = self.cx.builder.emit_range(document, span, Some(tag))?;
        self.cx.builder.link_next(range, result_set)?;
        let entry = RangeEntry {
            document,
            range,
            is_definition,
        };
        if let Some(record) = self.cx.records.get_mut(&result_set) {
            if declaration {
                record.definitions.push(entry);
            } else {
                record.references.push(entry);
            }
        }
        Ok(range)
    }

    /// Moniker for `path` in `module`. The first moniker of a ResultSet is
    /// its primary one; later ones attach to it.
    fn add_path_moniker(&mut self, result_set: Id, module: DocumentId, path: &ExportPath) -> Result<()> {
        let kind = if self.cx.is_local(module) {
            MonikerKind::Export
        } else {
            MonikerKind::Import
        };
        let moniker = path_moniker(
            &self.cx.config.moniker_scheme,
            self.cx.module_alias(module),
            path,
            kind,
        );
        let (moniker_id, _) = self.cx.builder.emit_moniker_vertex(moniker, module);

        let primary = self
            .cx
            .records
            .get(&result_set)
            .and_then(|record| record.primary_moniker);
        match primary {
            Some(primary) if primary == moniker_id => {}
            Some(primary) => self.cx.builder.attach(moniker_id, primary)?,
            None => {
                self.cx.builder.link_moniker(result_set, moniker_id)?;
                if let Some(record) = self.cx.records.get_mut(&result_set) {
                    record.primary_moniker = Some(moniker_id);
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Phase 3: references
    // =========================================================================

    fn emit_references(&mut self) -> Result<()> {
        let _span = debug_span!("emit_references").entered();

        let result_sets: Vec<(SymbolId, Id)> = self.cx.builder.result_sets().collect();
        for (symbol, result_set) in result_sets {
            for member in self.cx.merge.group_of(symbol) {
                for site in self.checker.references_to(member) {
                    if !self.cx.is_local(site.document)
                        || self.cx.builder.range_at(site.document, site.range).is_some()
                    {
                        continue;
                    }
                    let owner_set = self
                        .checker
                        .symbol_at(site.document, site.range.start)
                        .and_then(|owner| self.cx.builder.result_set(self.cx.merge.find(owner)))
                        .unwrap_or(result_set);
                    let tag = RangeTag::Reference { text: site.text };
                    self.link_range(owner_set, site.document, site.range, tag, false, false)?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Phase 4: aggregates
    // =========================================================================

    fn emit_aggregates(&mut self) -> Result<()> {
        let _span = debug_span!("emit_aggregates").entered();

        // Ranges of next-linked ResultSets count for the end of their chain.
        let mut owners: IndexMap<Id, (SymbolId, Vec<RangeEntry>, Vec<RangeEntry>)> = IndexMap::new();
        let result_sets: Vec<(SymbolId, Id)> = self.cx.builder.result_sets().collect();
        for &(symbol, result_set) in &result_sets {
            if self.cx.builder.next_of(result_set).is_none() {
                owners.insert(result_set, (symbol, Vec::new(), Vec::new()));
            }
        }
        for &(_, result_set) in &result_sets {
            let owner = self.chain_end(result_set);
            let Some(record) = self.cx.records.get(&result_set) else {
                continue;
            };
            if let Some((_, definitions, references)) = owners.get_mut(&owner) {
                definitions.extend(record.definitions.iter().copied());
                references.extend(record.references.iter().copied());
            }
        }

        let documents = self.cx.local_documents();
        let mut reference_results: IndexMap<SymbolId, Id> = IndexMap::new();
        for (result_set, (symbol, definitions, references)) in owners {
            if self.cx.config.emit_definitions && !definitions.is_empty() {
                let result = self.cx.builder.emit_definition_result(result_set)?;
                for &document in &documents {
                    let items = ranges_in(&definitions, document, |_| true);
                    self.emit_items(result, document, items, None)?;
                }
            }

            if self.cx.config.emit_references {
                let result = self.cx.builder.emit_reference_result(result_set)?;
                reference_results.insert(symbol, result);
                for &document in &documents {
                    let declarations = ranges_in(&definitions, document, |entry| !entry.is_definition);
                    self.emit_items(result, document, declarations, Some(ItemProperty::Declarations))?;
                    let bodies = ranges_in(&definitions, document, |entry| entry.is_definition);
                    self.emit_items(result, document, bodies, Some(ItemProperty::Definitions))?;
                    let uses = ranges_in(&references, document, |_| true);
                    self.emit_items(result, document, uses, Some(ItemProperty::References))?;
                }
            }
        }

        self.emit_rename_bridges(&reference_results)
    }

    /// `referenceResults` items from a renamed symbol's aggregate to its
    /// export aliases' aggregates.
    fn emit_rename_bridges(&mut self, reference_results: &IndexMap<SymbolId, Id>) -> Result<()> {
        let renames: Vec<(SymbolId, Vec<RenameBridge>)> = self
            .cx
            .merge
            .renames()
            .map(|(original, bridges)| (original, bridges.to_vec()))
            .collect();

        for (original, bridges) in renames {
            let Some(&source) = reference_results.get(&self.cx.merge.find(original)) else {
                continue;
            };
            let mut by_shard: IndexMap<DocumentId, Vec<Id>> = IndexMap::new();
            for bridge in bridges {
                if let Some(&target) = reference_results.get(&self.cx.merge.find(bridge.alias)) {
                    by_shard.entry(bridge.shard).or_default().push(target);
                }
            }
            for (shard, items) in by_shard {
                self.emit_items(source, shard, items, Some(ItemProperty::ReferenceResults))?;
            }
        }
        Ok(())
    }

    fn emit_items(
        &mut self,
        owner: Id,
        document: DocumentId,
        items: Vec<Id>,
        property: Option<ItemProperty>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let Some(shard) = self.cx.builder.document_vertex(document) else {
            warn!(document = document.0, "item shard has no document vertex");
            return Ok(());
        };
        self.cx
            .builder
            .emit_reference_aggregate(owner, shard, items, property)?;
        Ok(())
    }

    fn chain_end(&self, mut vertex: Id) -> Id {
        while let Some(next) = self.cx.builder.next_of(vertex) {
            vertex = next;
        }
        vertex
    }

    // =========================================================================
    // Phase 5: containment
    // =========================================================================

    fn emit_contains(&mut self) -> Result<()> {
        let mut document_vertices = Vec::new();
        for document in self.cx.local_documents() {
            let Some(vertex) = self.cx.builder.document_vertex(document) else {
                continue;
            };
            let ranges = self.cx.builder.ranges_in_document(document).to_vec();
            self.cx.builder.emit_contains(vertex, ranges)?;
            document_vertices.push(vertex);
        }
        let project = self.cx.project;
        self.cx.builder.emit_contains(project, document_vertices)?;
        Ok(())
    }
}

fn ranges_in(
    entries: &[RangeEntry],
    document: DocumentId,
    keep: impl Fn(&RangeEntry) -> bool,
) -> Vec<Id> {
    entries
        .iter()
        .filter(|entry| entry.document == document && keep(entry))
        .map(|entry| entry.range)
        .collect()
}

#[cfg(test)]
#[path = "../tests/indexer_tests.rs"]
mod indexer_tests;
