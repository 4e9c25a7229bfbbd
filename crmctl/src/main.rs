use clap::Parser;
use crmctl::cli::{self, Cli};
use crmctl::{Config, Console, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.args)?;

    // If --validate flag is set, exit successfully after config validation
    if cli.args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;
    tracing::debug!("{:?}", cli.args);

    let mut console = Console::new(config)?;

    let Some(command) = cli.command else {
        println!("No command given; run with --help for usage.");
        return Ok(());
    };

    if let Err(e) = cli::run(command, &mut console).await {
        anyhow::bail!("{}", e.user_message());
    }

    Ok(())
}
