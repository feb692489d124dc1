use clap::Parser;
use minichain::cli::{run_cli, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging is initialized in run_cli based on the debug flag
    run_cli(Cli::parse()).await
}
