use clap::Parser;
use std::path::PathBuf;

use tsz_lsif::LsifConfig;

/// CLI arguments for the tsz-lsif binary.
#[derive(Parser, Debug)]
#[command(
    name = "tsz-lsif",
    version,
    about = "Emit an LSIF graph for a checked TypeScript program snapshot"
)]
pub struct CliArgs {
    /// Program snapshot (JSON) produced by a checker.
    #[arg(short = 's', long)]
    pub snapshot: PathBuf,

    /// Indexer configuration (`lsif.json`, comments allowed).
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// Root that module aliases are computed relative to.
    #[arg(long)]
    pub project_root: Option<String>,

    /// Do not emit hover results.
    #[arg(long)]
    pub no_hover: bool,

    /// Do not emit definition results.
    #[arg(long)]
    pub no_definitions: bool,

    /// Do not emit reference results.
    #[arg(long)]
    pub no_references: bool,
}

impl CliArgs {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut LsifConfig) {
        if let Some(root) = &self.project_root {
            config.project_root = root.clone();
        }
        if self.no_hover {
            config.emit_hover = false;
        }
        if self.no_definitions {
            config.emit_definitions = false;
        }
        if self.no_references {
            config.emit_references = false;
        }
    }
}
