use anyhow::Result;
use clap::Parser;

use tsz_lsif_cli::args::CliArgs;
use tsz_lsif_cli::{driver, tracing_config};

fn main() -> Result<()> {
    // Only installs a subscriber when TSZ_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    driver::run(&args, std::io::stdout().lock())?;
    Ok(())
}
