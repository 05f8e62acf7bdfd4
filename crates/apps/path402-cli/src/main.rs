//! path402 CLI binary entry point.

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use path402_cli::{
    cli::{Cli, Commands},
    commands::{self, ScheduleArgs},
    config::{default_config_path, CliConfig},
    error::{CliError, CliResult},
    output::OutputFormat,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    if let Err(e) = run(cli).await {
        print_error(&e);
        std::process::exit(e.exit_code());
    }
}

/// Install the tracing subscriber.
///
/// Enabled by `--verbose` (adds `path402=debug`) or `RUST_LOG`. A serving
/// node always logs at least `info`.
fn init_logging(verbose: bool, serving: bool) {
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !(verbose || has_rust_log || serving) {
        return;
    }

    let mut filter = if has_rust_log {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    };
    if verbose {
        if let Ok(directive) = "path402=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Print a user-friendly error message with recovery hint.
fn print_error(e: &CliError) {
    eprintln!(
        "{} [{}]: {}",
        "Error".red().bold(),
        e.exit_code().to_string().yellow(),
        e
    );

    if let Some(suggestion) = e.suggestion() {
        eprintln!("{}: {}", "Hint".cyan(), suggestion);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let format: OutputFormat = cli.format.into();

    // init writes the file every other command loads
    let load = || CliConfig::load(&config_path);

    let output = match cli.command {
        Commands::Init { force } => commands::init(&config_path, format, force)?,

        Commands::Serve { listen } => commands::serve(load()?, format, listen).await?,

        Commands::Schedule {
            path,
            curve,
            base,
            floor,
            decay_rate,
            supply,
            count,
        } => commands::schedule(
            load()?,
            format,
            ScheduleArgs {
                path,
                curve,
                base,
                floor,
                decay_rate,
                supply,
                count,
            },
        )?,

        Commands::Stats => commands::stats(load()?, format)?,

        Commands::Earnings { server } => commands::earnings(load()?, format, server)?,

        Commands::Events { path, limit } => commands::events(load()?, format, &path, limit)?,

        Commands::VerifyToken { token } => commands::verify_token(load()?, format, &token)?,
    };

    println!("{}", output);

    Ok(())
}
