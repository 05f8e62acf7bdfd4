//! Print a price schedule.

use path402_econ::{cumulative_cost, schedule as price_schedule};
use path402_store::ServeLedger;
use path402_types::{Amount, Curve};

use crate::cli::CurveArg;
use crate::config::CliConfig;
use crate::context::NodeContext;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Render, ScheduleOutput};

/// Most units a single schedule will price.
pub const MAX_SCHEDULE_COUNT: u64 = 10_000;

/// Arguments for [`schedule`].
#[derive(Debug, Clone)]
pub struct ScheduleArgs {
    /// Configured path to price.
    pub path: Option<String>,
    /// Ad-hoc curve when no path is given.
    pub curve: Option<CurveArg>,
    pub base: Option<Amount>,
    pub floor: Amount,
    pub decay_rate: Amount,
    /// Starting supply.
    pub supply: Option<u64>,
    pub count: u64,
}

/// Execute the schedule command.
///
/// For a configured path the starting supply defaults to what the ledger
/// has recorded; for an ad-hoc curve it defaults to zero.
pub fn schedule(config: CliConfig, format: OutputFormat, args: ScheduleArgs) -> CliResult<String> {
    if args.count == 0 || args.count > MAX_SCHEDULE_COUNT {
        return Err(CliError::user(format!(
            "--count must be between 1 and {}",
            MAX_SCHEDULE_COUNT
        )));
    }

    let (path, curve, base_price, supply): (Option<String>, Curve, Amount, u64) =
        match (&args.path, args.curve, args.base) {
            (Some(path), _, _) => {
                let entry = config
                    .path(path)
                    .ok_or_else(|| CliError::UnknownPath(path.clone()))?;
                let (curve, base_price) = (entry.curve(), entry.base_price);
                let supply = match args.supply {
                    Some(supply) => supply,
                    None => NodeContext::open(config.clone())?
                        .ledgers
                        .serves
                        .supply(path)?,
                };
                (Some(path.clone()), curve, base_price, supply)
            }
            (None, Some(curve), Some(base)) => (
                None,
                curve.to_curve(args.floor, args.decay_rate),
                base,
                args.supply.unwrap_or(0),
            ),
            _ => {
                return Err(CliError::user(
                    "Pass --path, or --curve together with --base",
                ))
            }
        };

    let entries = price_schedule(&curve, base_price, supply, args.count);
    let total = cumulative_cost(&curve, base_price, supply, args.count);

    let output = ScheduleOutput {
        path,
        curve: curve.id().to_string(),
        base_price,
        entries,
        total,
    };

    Ok(output.render(format))
}
