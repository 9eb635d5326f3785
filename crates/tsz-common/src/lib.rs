//! Common types and utilities for the tsz LSIF indexer.
//!
//! This crate provides foundational types used across the tsz crates:
//! - Position/Range types for source locations
//! - Line maps for byte offset <-> UTF-16 position conversion
//! - Centralized limits and thresholds

// Centralized limits and thresholds
pub mod limits;

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, Range};
