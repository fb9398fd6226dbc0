use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use transcript_lens::cli::{Cli, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::from_default_env() };
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    run(cli)
}
