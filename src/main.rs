//! camux-provision - bootstrap the Google Cloud project for camux
//!
//! This is the main entry point for the camux-provision CLI.

mod cli;

use cli::commands::CommandContext;
use cli::{Cli, Commands};

use camux_provision::cloud::CloudError;
use camux_provision::error::Error;
use camux_provision::telemetry::{LogLevel, LoggingBuilder};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    if let Err(e) = LoggingBuilder::new()
        .with_level(LogLevel::from_verbosity(cli.verbosity()))
        .with_format(cli.log_format.into())
        .with_ansi(cli.use_color())
        .with_target(cli.verbosity() >= 3)
        .with_spans(cli.verbosity() >= 3)
        .init()
    {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    if cli.verbosity() >= 2 {
        eprintln!("camux-provision v{}", VERSION);
    }

    let mut ctx = CommandContext::new(&cli);

    let result = match &cli.command {
        Commands::Up(args) => args.execute(&mut ctx).await,
        Commands::Preview(args) => args.execute(&mut ctx).await,
        Commands::Config(args) => args.execute(&mut ctx).await,
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => {
            ctx.output.error(&err.to_string());
            let hint = err
                .downcast_ref::<Error>()
                .and_then(Error::hint)
                .or_else(|| err.downcast_ref::<CloudError>().and_then(CloudError::hint));
            if let Some(hint) = hint {
                ctx.output.hint(hint);
            }
            1
        }
    };

    std::process::exit(exit_code);
}
