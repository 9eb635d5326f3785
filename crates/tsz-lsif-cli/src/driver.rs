//! Snapshot in, JSON lines out.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use tsz_lsif::{LsifConfig, ProgramSnapshot};

use crate::args::CliArgs;

/// What one run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub elements: usize,
    pub last_id: u64,
}

/// Configuration file (if any) with command-line overrides applied.
pub fn resolve_config(args: &CliArgs) -> Result<LsifConfig> {
    let mut config = match &args.config {
        Some(path) => LsifConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => LsifConfig::default(),
    };
    args.apply_overrides(&mut config);
    Ok(config)
}

/// Index the snapshot named by `args` and write the dump to `--out`, or to
/// `stdout` when no output file is given.
pub fn run<W: Write>(args: &CliArgs, stdout: W) -> Result<RunSummary> {
    let config = resolve_config(args)?;
    let snapshot = ProgramSnapshot::load(&args.snapshot)
        .with_context(|| format!("failed to read snapshot {}", args.snapshot.display()))?;
    let documents = snapshot.documents.len();

    let output = tsz_lsif::index(&snapshot, config).context("indexing failed")?;

    match &args.out {
        Some(path) => write_file(path, &output.elements)?,
        None => {
            tsz_lsif::write_json_lines(&output.elements, BufWriter::new(stdout))
                .context("failed to write to stdout")?;
        }
    }

    let summary = RunSummary {
        documents,
        elements: output.elements.len(),
        last_id: output.last_id,
    };
    info!(
        documents = summary.documents,
        elements = summary.elements,
        last_id = summary.last_id,
        "lsif dump written"
    );
    Ok(summary)
}

fn write_file(path: &Path, elements: &[tsz_lsif::Element]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    tsz_lsif::write_json_lines(elements, BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod driver_tests;
