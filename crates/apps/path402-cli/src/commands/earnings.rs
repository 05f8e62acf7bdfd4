//! Show server earnings.

use path402_store::ServeLedger;

use crate::config::CliConfig;
use crate::context::NodeContext;
use crate::error::CliResult;
use crate::output::{EarningsOutput, OutputFormat, Render};

/// Execute the earnings command.
///
/// Sums the server share of every serve recorded for `server` (default:
/// this node's identity).
pub fn earnings(config: CliConfig, format: OutputFormat, server: Option<String>) -> CliResult<String> {
    let served_by = server.unwrap_or_else(|| config.server.identity.clone());
    let ctx = NodeContext::open(config)?;

    let total_earned = ctx.ledgers.serves.earnings(&served_by)?;

    let output = EarningsOutput {
        served_by,
        total_earned,
    };

    Ok(output.render(format))
}
