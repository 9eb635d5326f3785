//! LSIF emission for checked TypeScript programs.
//!
//! Given a fully checked program (through the [`Checker`] trait), the
//! indexer emits an LSIF graph: ranges, ResultSets, reference and definition
//! aggregates, and monikers that identify each symbol across packages by the
//! export path that reaches it.
//!
//! ```ignore
//! let snapshot = ProgramSnapshot::load(path)?;
//! let output = tsz_lsif::index(&snapshot, LsifConfig::default())?;
//! tsz_lsif::write_json_lines(&output.elements, std::io::stdout())?;
//! ```

pub mod checker;
pub mod config;
pub mod context;
pub mod error;
pub mod export_path;
pub mod export_walker;
pub mod graph_builder;
pub mod indexer;
pub mod merge;
pub mod moniker;
pub mod protocol;
pub mod snapshot;
pub mod writer;

pub use checker::{Checker, DocumentId, SymbolId, TypeId};
pub use config::LsifConfig;
pub use context::IndexOutput;
pub use error::{IndexError, Result};
pub use indexer::index;
pub use protocol::Element;
pub use snapshot::ProgramSnapshot;
pub use writer::{to_json_lines, write_json_lines};

// Shared test fixtures
#[cfg(test)]
#[path = "tests/test_fixtures.rs"]
pub mod test_fixtures;
