use clap::Parser;
use treeroute::cli::{init_logging, run_cli, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;
    run_cli(&cli)
}
