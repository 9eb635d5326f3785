//! Command-line front end for the LSIF indexer.

pub mod args;
pub mod driver;
pub mod tracing_config;
