use clap::Parser;
use millpath::{init_logging, run, RunOptions, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let options = RunOptions::parse();

    // Initialize logging
    init_logging()?;
    tracing::debug!("millpath {} built {}", VERSION, BUILD_DATE);

    run(&options)
}
