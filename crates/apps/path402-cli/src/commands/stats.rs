//! Show ledger totals.

use path402_store::{InvoiceLedger, ServeLedger};

use crate::config::CliConfig;
use crate::context::NodeContext;
use crate::error::CliResult;
use crate::output::{OutputFormat, Render, StatsOutput};

/// Execute the stats command.
pub fn stats(config: CliConfig, format: OutputFormat) -> CliResult<String> {
    let ctx = NodeContext::open(config)?;

    let stats = ctx.ledgers.serves.stats()?;
    let pending_invoices = ctx.ledgers.invoices.pending_count()?;

    let output = StatsOutput {
        total_serves: stats.total_serves,
        total_revenue: stats.total_revenue,
        distinct_paths: stats.distinct_paths,
        pending_invoices,
    };

    Ok(output.render(format))
}
