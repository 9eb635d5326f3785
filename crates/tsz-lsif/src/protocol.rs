//! LSIF element model.
//!
//! Every emitted element is `{ "id", "type": "vertex" | "edge", "label", ... }`.
//! Vertex and edge kinds are closed enums; serde's internal tagging produces
//! the flat wire shape, so serializing an [`Element`] yields exactly one LSIF
//! line.

use serde::{Deserialize, Serialize};
use tsz_common::position::Range;

use crate::checker::SymbolKind;

/// Element identifier. The first element of a run has id 1.
pub type Id = u64;

pub const LSIF_VERSION: &str = "0.6.0";
pub const POSITION_ENCODING: &str = "utf-16";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: Id,
    #[serde(flatten)]
    pub data: ElementData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementData {
    Vertex(Vertex),
    Edge(Edge),
}

impl Element {
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match &self.data {
            ElementData::Vertex(vertex) => Some(vertex),
            ElementData::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match &self.data {
            ElementData::Edge(edge) => Some(edge),
            ElementData::Vertex(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match &self.data {
            ElementData::Vertex(vertex) => vertex.label(),
            ElementData::Edge(edge) => edge.label(),
        }
    }
}

// =============================================================================
// Vertices
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "camelCase")]
pub enum Vertex {
    MetaData(MetaData),
    Project(Project),
    Document(Document),
    Range(RangeVertex),
    ResultSet,
    Moniker(Moniker),
    HoverResult(HoverResult),
    DefinitionResult,
    ReferenceResult,
}

impl Vertex {
    pub fn label(&self) -> &'static str {
        match self {
            Vertex::MetaData(_) => "metaData",
            Vertex::Project(_) => "project",
            Vertex::Document(_) => "document",
            Vertex::Range(_) => "range",
            Vertex::ResultSet => "resultSet",
            Vertex::Moniker(_) => "moniker",
            Vertex::HoverResult(_) => "hoverResult",
            Vertex::DefinitionResult => "definitionResult",
            Vertex::ReferenceResult => "referenceResult",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub version: String,
    pub position_encoding: String,
    pub project_root: String,
    pub tool_info: ToolInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub uri: String,
    pub language_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeVertex {
    #[serde(flatten)]
    pub range: Range,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<RangeTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RangeTag {
    #[serde(rename_all = "camelCase")]
    Definition {
        text: String,
        kind: SymbolKind,
        full_range: Range,
    },
    Reference { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UniquenessLevel {
    Document,
    Project,
    Group,
    Scheme,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonikerKind {
    Import,
    Export,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Moniker {
    pub scheme: String,
    pub identifier: String,
    pub unique: UniquenessLevel,
    pub kind: MonikerKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverResult {
    pub result: Hover,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
    pub contents: Vec<MarkedString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedString {
    pub language: String,
    pub value: String,
}

// =============================================================================
// Edges
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum Edge {
    #[serde(rename = "contains")]
    Contains(EdgeDataMultiIn),
    #[serde(rename = "item")]
    Item(Item),
    #[serde(rename = "next")]
    Next(EdgeData),
    #[serde(rename = "moniker")]
    Moniker(EdgeData),
    #[serde(rename = "attach")]
    Attach(EdgeData),
    #[serde(rename = "textDocument/references")]
    References(EdgeData),
    #[serde(rename = "textDocument/definition")]
    Definition(EdgeData),
    #[serde(rename = "textDocument/hover")]
    Hover(EdgeData),
}

impl Edge {
    pub fn label(&self) -> &'static str {
        match self {
            Edge::Contains(_) => "contains",
            Edge::Item(_) => "item",
            Edge::Next(_) => "next",
            Edge::Moniker(_) => "moniker",
            Edge::Attach(_) => "attach",
            Edge::References(_) => "textDocument/references",
            Edge::Definition(_) => "textDocument/definition",
            Edge::Hover(_) => "textDocument/hover",
        }
    }

    pub fn out_v(&self) -> Id {
        match self {
            Edge::Contains(data) => data.out_v,
            Edge::Item(item) => item.out_v,
            Edge::Next(data)
            | Edge::Moniker(data)
            | Edge::Attach(data)
            | Edge::References(data)
            | Edge::Definition(data)
            | Edge::Hover(data) => data.out_v,
        }
    }

    /// All target vertices of the edge.
    pub fn in_vs(&self) -> Vec<Id> {
        match self {
            Edge::Contains(data) => data.in_vs.clone(),
            Edge::Item(item) => item.in_vs.clone(),
            Edge::Next(data)
            | Edge::Moniker(data)
            | Edge::Attach(data)
            | Edge::References(data)
            | Edge::Definition(data)
            | Edge::Hover(data) => vec![data.in_v],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(rename = "outV")]
    pub out_v: Id,
    #[serde(rename = "inV")]
    pub in_v: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDataMultiIn {
    #[serde(rename = "outV")]
    pub out_v: Id,
    #[serde(rename = "inVs")]
    pub in_vs: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "outV")]
    pub out_v: Id,
    #[serde(rename = "inVs")]
    pub in_vs: Vec<Id>,
    /// Document the items belong to.
    pub shard: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<ItemProperty>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemProperty {
    Declarations,
    Definitions,
    References,
    ReferenceResults,
}
