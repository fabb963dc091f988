use clap::Parser;
use linkscout_cli::{cli::Cli, config::RunConfig, logging, runner};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = RunConfig::from_cli(cli);
    if let Err(err) = runner::execute(config).await {
        error!(target = "scout", error = %err, "run failed");
        std::process::exit(1);
    }
}
