//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use path402_types::{Amount, Curve, DEFAULT_EVENTS_LIMIT};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// path402 node CLI.
#[derive(Parser, Debug)]
#[command(name = "path402")]
#[command(author = "Path402 Contributors")]
#[command(version)]
#[command(about = "Payment-required HTTP node for path402 offerings")]
#[command(
    long_about = "path402 prices resources on supply curves, challenges unpaid requests with single-use invoices, and releases content against verified payments.\n\nRun 'path402 init' to get started."
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "PATH402_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (human or json).
    #[arg(short, long, global = true, default_value = "human")]
    pub format: OutputFormatArg,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output format argument for clap.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormatArg {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Curve argument for the schedule command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CurveArg {
    Fixed,
    SqrtDecay,
    LogDecay,
    LinearFloor,
}

impl CurveArg {
    /// Resolve with the linear-floor parameters.
    pub fn to_curve(self, floor: Amount, decay_rate: Amount) -> Curve {
        match self {
            Self::Fixed => Curve::Fixed,
            Self::SqrtDecay => Curve::SqrtDecay,
            Self::LogDecay => Curve::LogDecay,
            Self::LinearFloor => Curve::LinearFloor { floor, decay_rate },
        }
    }
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // =========================================================================
    // Setup
    // =========================================================================
    /// Write a starter configuration file.
    ///
    /// Creates config.toml with one example offering and the database
    /// location under the data directory.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },

    // =========================================================================
    // Node
    // =========================================================================
    /// Run the payment gate over HTTP.
    ///
    /// Serves every configured path, the discovery document, ledger stats
    /// and Prometheus metrics. Stops on Ctrl+C or SIGTERM.
    Serve {
        /// Listen address (overrides [server].listen).
        #[arg(short, long)]
        listen: Option<String>,
    },

    // =========================================================================
    // Pricing
    // =========================================================================
    /// Print the price schedule for a path or an ad-hoc curve.
    Schedule {
        /// Configured path to price.
        #[arg(short, long, conflicts_with_all = ["curve", "base"])]
        path: Option<String>,

        /// Curve to price when no path is given.
        #[arg(long, value_enum, requires = "base")]
        curve: Option<CurveArg>,

        /// Base price for an ad-hoc curve.
        #[arg(long)]
        base: Option<Amount>,

        /// Lowest price (linear_floor).
        #[arg(long, default_value = "0")]
        floor: Amount,

        /// Price drop per serve (linear_floor).
        #[arg(long, default_value = "0")]
        decay_rate: Amount,

        /// Starting supply (defaults to the recorded supply for a path, else 0).
        #[arg(short, long)]
        supply: Option<u64>,

        /// Number of units to price.
        #[arg(short = 'n', long, default_value = "10")]
        count: u64,
    },

    // =========================================================================
    // Ledger
    // =========================================================================
    /// Show serve ledger totals.
    Stats,

    /// Show server earnings.
    Earnings {
        /// Server identity (defaults to [server].identity).
        #[arg(short, long)]
        server: Option<String>,
    },

    /// List recent serves for a path.
    Events {
        /// Path to list.
        #[arg(short, long)]
        path: String,

        /// Maximum events to show.
        #[arg(short, long, default_value_t = DEFAULT_EVENTS_LIMIT)]
        limit: u32,
    },

    // =========================================================================
    // Tokens
    // =========================================================================
    /// Verify a proof-of-service token against the configured secret.
    VerifyToken {
        /// The token (header.claims.signature).
        token: String,
    },
}
