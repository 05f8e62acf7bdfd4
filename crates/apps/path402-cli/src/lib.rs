//! Command-line node for the path402 payment-required protocol.
//!
//! This crate provides the `path402` binary. It includes commands for:
//!
//! - **Setup**: write a starter configuration
//! - **Node**: serve configured paths over HTTP behind the payment gate
//! - **Pricing**: print price schedules for paths or ad-hoc curves
//! - **Ledger**: totals, earnings, and per-path serve history
//! - **Tokens**: verify proof-of-service tokens
//!
//! # Quick Start
//!
//! ```bash
//! # Write ~/.local/share/path402/config.toml with an example offering
//! path402 init
//!
//! # Serve it
//! path402 serve
//!
//! # Price the next ten units
//! path402 schedule --path '/$hello'
//! ```
//!
//! # Output Formats
//!
//! All commands support `--format`:
//!
//! - `human` (default): Human-readable with colors
//! - `json`: Machine-readable JSON
//!
//! # Configuration
//!
//! Configuration is loaded from `<data_dir>/config.toml`. Override with
//! `--config` or `PATH402_CONFIG`; move the data directory with
//! `PATH402_DATA_DIR`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod output;
pub mod signals;

// Re-export main types
pub use cli::{Cli, Commands, CurveArg, OutputFormatArg};
pub use config::CliConfig;
pub use context::NodeContext;
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Render};
