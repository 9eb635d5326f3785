//! Serialized program snapshots.
//!
//! A [`ProgramSnapshot`] is everything the indexer asks a checker, captured
//! as data: documents with their export tables, symbols with declarations,
//! types and references. It implements [`Checker`], so a program checked
//! elsewhere can be indexed from a JSON file.
//!
//! Ids are positions: `DocumentId(n)` is `documents[n]`, and likewise for
//! symbols and types.

use serde::{Deserialize, Serialize};
use tsz_common::position::Position;

use crate::checker::{
    Checker, Declaration, DocumentId, DocumentInfo, ExportEntry, ReferenceSite, SymbolData,
    SymbolId, TypeId, TypeShape, symbol_flags,
};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSnapshot {
    pub documents: Vec<SnapshotDocument>,
    #[serde(default)]
    pub symbols: Vec<SnapshotSymbol>,
    #[serde(default)]
    pub types: Vec<TypeShape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    #[serde(flatten)]
    pub info: DocumentInfo,
    /// `None` for scripts that are not modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<ExportEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSymbol {
    #[serde(flatten)]
    pub data: SymbolData,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<Declaration>,
    /// Next hop for alias symbols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<SymbolId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ReferenceSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<String>,
}

impl SnapshotSymbol {
    pub fn new(name: impl Into<String>, flags: u32, parent: Option<SymbolId>) -> Self {
        SnapshotSymbol {
            data: SymbolData {
                name: name.into(),
                flags,
                parent,
            },
            type_id: None,
            declarations: Vec::new(),
            alias_target: None,
            references: Vec::new(),
            hover: None,
        }
    }
}

impl ProgramSnapshot {
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    fn symbol_entry(&self, id: SymbolId) -> Option<&SnapshotSymbol> {
        self.symbols.get(id.0 as usize)
    }

    fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len() as u32).map(SymbolId)
    }
}

impl Checker for ProgramSnapshot {
    fn documents(&self) -> Vec<DocumentId> {
        (0..self.documents.len() as u32).map(DocumentId).collect()
    }

    fn document(&self, id: DocumentId) -> Option<DocumentInfo> {
        self.documents
            .get(id.0 as usize)
            .map(|document| document.info.clone())
    }

    fn symbol_at(&self, document: DocumentId, position: Position) -> Option<SymbolId> {
        let declared = self.symbol_ids().find(|&id| {
            self.symbol_entry(id).is_some_and(|symbol| {
                symbol
                    .declarations
                    .iter()
                    .any(|decl| decl.document == document && decl.range.contains(position))
            })
        });
        declared.or_else(|| {
            self.symbol_ids().find(|&id| {
                self.symbol_entry(id).is_some_and(|symbol| {
                    symbol
                        .references
                        .iter()
                        .any(|site| site.document == document && site.range.contains(position))
                })
            })
        })
    }

    fn symbol(&self, id: SymbolId) -> Option<SymbolData> {
        self.symbol_entry(id).map(|symbol| symbol.data.clone())
    }

    fn type_of_symbol(&self, id: SymbolId) -> Option<TypeId> {
        self.symbol_entry(id)?.type_id
    }

    fn type_shape(&self, id: TypeId) -> Option<TypeShape> {
        self.types.get(id.0 as usize).cloned()
    }

    fn exports_of_module(&self, document: DocumentId) -> Option<Vec<ExportEntry>> {
        self.documents.get(document.0 as usize)?.exports.clone()
    }

    fn declarations_of(&self, id: SymbolId) -> Vec<Declaration> {
        self.symbol_entry(id)
            .map(|symbol| symbol.declarations.clone())
            .unwrap_or_default()
    }

    fn is_structural(&self, id: TypeId) -> bool {
        match self.types.get(id.0 as usize) {
            Some(TypeShape::Object { alias: Some(_), .. }) => false,
            Some(TypeShape::Object {
                symbol: Some(symbol),
                ..
            }) => self
                .symbol_entry(*symbol)
                .is_none_or(|entry| !entry.data.has_flags(symbol_flags::NOMINAL)),
            _ => true,
        }
    }

    fn resolve_alias(&self, id: SymbolId) -> Option<SymbolId> {
        self.symbol_entry(id)?.alias_target
    }

    fn references_to(&self, id: SymbolId) -> Vec<ReferenceSite> {
        self.symbol_entry(id)
            .map(|symbol| symbol.references.clone())
            .unwrap_or_default()
    }

    fn symbols_in_document(&self, document: DocumentId) -> Vec<SymbolId> {
        let mut declared: Vec<(Position, SymbolId)> = self
            .symbol_ids()
            .filter_map(|id| {
                let symbol = self.symbol_entry(id)?;
                let first = symbol
                    .declarations
                    .iter()
                    .find(|decl| decl.document == document)?;
                Some((first.range.start, id))
            })
            .collect();
        declared.sort();
        declared.into_iter().map(|(_, id)| id).collect()
    }

    fn hover(&self, id: SymbolId) -> Option<String> {
        self.symbol_entry(id)?.hover.clone()
    }
}

#[cfg(test)]
#[path = "../tests/snapshot_tests.rs"]
mod snapshot_tests;
