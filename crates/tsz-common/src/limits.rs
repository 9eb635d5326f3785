//! Centralized limits and thresholds for the LSIF indexer.
//!
//! This module provides shared constants for walk depths, operation counts,
//! and hashing bounds used by the export walker, the moniker synthesizer and
//! the merge engine. Keeping them in one place:
//! - Prevents duplicate definitions with inconsistent values
//! - Lets a configuration override the walk depth without touching call sites
//!
//! # Categories
//!
//! - **Walk Depths**: bound how deep export paths may grow
//! - **Operation Counts**: bound iterative algorithms over checker data
//! - **Hashing Bounds**: bound structural signature rendering

// =============================================================================
// Walk Depth Limits (Export Walker)
// =============================================================================

/// Maximum number of segments in a single export path.
///
/// The walker follows return types, parameter shapes and anonymous members.
/// Every hop appends a segment; once the path reaches this length the branch
/// is abandoned. This is the default for `LsifConfig::max_walk_depth`.
///
/// # TypeScript example
///
/// ```typescript
/// // Each call returns a fresh anonymous object with another factory,
/// // so the path grows without ever meeting a named type:
/// export function make() {
///     return { next() { return { next() { return { /* ... */ }; } }; } };
/// }
/// // a:make.__rt.next.__rt.next.__rt.next ...
/// ```
pub const MAX_EXPORT_PATH_DEPTH: u32 = 32;

/// Maximum number of hops followed when resolving an alias chain.
///
/// Alias chains are normally short (`import` → `export { x }` → declaration)
/// but broken programs can produce cycles; the merge engine gives up after
/// this many hops and fails that branch only.
///
/// # TypeScript example
///
/// ```typescript
/// // a.ts
/// export { x } from "./b";
/// // b.ts
/// export { x } from "./a"; // circular re-export, never reaches a declaration
/// ```
pub const MAX_ALIAS_CHAIN_DEPTH: u32 = 64;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of `(node, path)` items produced for one module.
///
/// Shared anonymous types reachable through many exports multiply the number
/// of paths. The walker stops producing items for the module at this budget
/// and logs a warning.
pub const MAX_EXPORT_WALK_ITEMS: usize = 100_000;

// =============================================================================
// Hashing Bounds (Moniker Synthesizer)
// =============================================================================

/// Maximum nesting rendered into a canonical structural signature.
///
/// Deeper structure is replaced by an ellipsis marker. Two types that differ
/// only below this depth hash identically.
pub const MAX_STRUCTURAL_HASH_DEPTH: u32 = 16;

/// Number of digest bytes kept for a local moniker identifier.
///
/// 16 bytes encode to 24 base64 characters.
pub const LOCAL_MONIKER_DIGEST_BYTES: usize = 16;
