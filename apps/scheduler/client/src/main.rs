use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing_with_default, install_color_eyre};
use eyre::Result;
use scheduler_client::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    // warn by default so log lines do not interleave with the prompt output
    init_tracing_with_default(&Environment::from_env(), "warn");

    scheduler_client::run(Cli::parse()).await
}
