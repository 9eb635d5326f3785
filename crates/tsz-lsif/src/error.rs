//! Errors raised while building the graph.
//!
//! Only violations of the graph's structural invariants are errors. Missing
//! checker answers and cyclic types are handled where they occur and never
//! surface here.

use thiserror::Error;

use crate::protocol::Id;

#[derive(Debug, Error)]
pub enum IndexError {
    /// A second vertex was requested for an entity that already has one.
    #[error("duplicate {kind} vertex for {entity} (existing id {existing})")]
    DuplicateVertex {
        kind: &'static str,
        entity: String,
        existing: Id,
    },

    /// A `next` edge would close a cycle.
    #[error("next edge {from} -> {to} would create a cycle")]
    NextCycle { from: Id, to: Id },

    /// A vertex already has an outgoing `next` edge.
    #[error("vertex {from} already has a next edge to {existing}")]
    DuplicateNext { from: Id, existing: Id },

    /// An edge refers to a vertex that was never emitted.
    #[error("{label} edge refers to unknown vertex {id}")]
    UnknownVertex { label: &'static str, id: Id },

    /// Configuration text that does not describe an `LsifConfig`.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// Malformed snapshot input, or a failed write.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
