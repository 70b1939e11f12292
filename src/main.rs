use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io;

use sdk_harness::cli::{Cli, Command};
use sdk_harness::commands;
use sdk_harness::config::Config;
use sdk_harness::HarnessError;

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        let code = err
            .downcast_ref::<HarnessError>()
            .map(HarnessError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Dispatch to subcommand
    match cli.command {
        Command::Clean(args) => {
            let config = Config::load(cli.config.as_deref())?;
            tracing::debug!(?config, "Loaded configuration");
            tracing::info!(?args, "Starting clean");

            let settings_path = cli.config.clone().or_else(Config::default_path);
            commands::clean::run(args, &config, settings_path)?;
        }
        Command::Test(args) => {
            let config = Config::load(cli.config.as_deref())?;
            tracing::debug!(?config, "Loaded configuration");
            tracing::info!(?args, "Starting unit tests");

            commands::test::run(args, &config, cli.quiet)?;
        }
        Command::Completions(args) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "sdk-harness", &mut io::stdout());
        }
        Command::Manpage => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sdk_harness={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}
