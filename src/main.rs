use anyhow::Result;
use clap::Parser;

use ember::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    ember::logging::init();

    let cli = Cli::parse();
    cli::run(cli).await
}
