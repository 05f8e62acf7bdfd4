//! Output formatting for CLI.

use colored::Colorize;
use path402_crypto::ServiceClaims;
use path402_econ::ScheduleEntry;
use path402_types::{Amount, ServeEvent, MINOR_UNITS_PER_COIN};
use serde::Serialize;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use 'human' or 'json'.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Trait for renderable output.
pub trait Render {
    /// Render as human-readable string.
    fn render_human(&self) -> String;

    /// Render as JSON string.
    fn render_json(&self) -> String;

    /// Render in the specified format.
    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.render_human(),
            OutputFormat::Json => self.render_json(),
        }
    }
}

/// Format minor units with their whole-coin equivalent.
pub fn format_amount(units: Amount) -> String {
    let coins = units as f64 / MINOR_UNITS_PER_COIN as f64;
    format!("{} sat ({:.8})", units, coins)
}

// =============================================================================
// Output Types
// =============================================================================

/// Output for config initialization.
#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub config_path: String,
    pub database: String,
    pub paths: usize,
}

impl Render for InitOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}\n{} {} example offering(s)\n\nEdit [[paths]] and [server].pay_to, then run 'path402 serve'.",
            "Configuration written to:".green().bold(),
            self.config_path,
            "Database:".bold(),
            self.database,
            "Paths:".bold(),
            self.paths
        )
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Startup summary for the serve command.
#[derive(Debug, Serialize)]
pub struct ServeOutput {
    pub listen: String,
    pub identity: String,
    pub verification: String,
    pub paths: Vec<String>,
}

impl Render for ServeOutput {
    fn render_human(&self) -> String {
        let mut lines = vec![
            format!(
                "{} http://{}",
                "Serving path402 on".green().bold(),
                self.listen
            ),
            format!("{} {}", "Identity:".bold(), self.identity),
            format!("{} {}", "Verification:".bold(), self.verification),
            format!("{}", "Paths:".bold()),
        ];
        for path in &self.paths {
            lines.push(format!("  {}", path));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for schedule command.
#[derive(Debug, Serialize)]
pub struct ScheduleOutput {
    pub path: Option<String>,
    pub curve: String,
    pub base_price: Amount,
    pub entries: Vec<ScheduleEntry>,
    pub total: Amount,
}

impl Render for ScheduleOutput {
    fn render_human(&self) -> String {
        let title = match &self.path {
            Some(path) => format!("{} ({}, base {})", path, self.curve, self.base_price),
            None => format!("{} curve, base {}", self.curve, self.base_price),
        };
        let mut lines = vec![
            title.bold().to_string(),
            format!("{:>10}  {:>12}  {:>14}", "SUPPLY", "UNIT PRICE", "CUMULATIVE")
                .dimmed()
                .to_string(),
        ];
        for entry in &self.entries {
            lines.push(format!(
                "{:>10}  {:>12}  {:>14}",
                entry.supply, entry.unit_price, entry.cumulative
            ));
        }
        lines.push(String::new());
        lines.push(format!("{} {}", "Total:".bold(), format_amount(self.total)));
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for stats command.
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub total_serves: u64,
    pub total_revenue: Amount,
    pub distinct_paths: u64,
    pub pending_invoices: u64,
}

impl Render for StatsOutput {
    fn render_human(&self) -> String {
        [
            format!("{} {}", "Serves:".bold(), self.total_serves),
            format!("{} {}", "Revenue:".bold(), format_amount(self.total_revenue)),
            format!("{} {}", "Paths served:".bold(), self.distinct_paths),
            format!("{} {}", "Pending invoices:".bold(), self.pending_invoices),
        ]
        .join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for earnings command.
#[derive(Debug, Serialize)]
pub struct EarningsOutput {
    pub served_by: String,
    pub total_earned: Amount,
}

impl Render for EarningsOutput {
    fn render_human(&self) -> String {
        format!(
            "{} {}\n{} {}",
            "Server:".bold(),
            self.served_by,
            "Earned:".green().bold(),
            format_amount(self.total_earned)
        )
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for events command.
#[derive(Debug, Serialize)]
pub struct EventsOutput {
    pub path: String,
    pub events: Vec<ServeEvent>,
}

impl Render for EventsOutput {
    fn render_human(&self) -> String {
        if self.events.is_empty() {
            return format!("No serves recorded for {}.", self.path)
                .dimmed()
                .to_string();
        }

        let mut lines = vec![format!("{} ({})", self.path.bold(), self.events.len())];
        for event in &self.events {
            lines.push(format!(
                "  {}  {:>10} sat  issuer {:>10}  server {:>10}  to {}  tx {}",
                event.timestamp,
                event.price_paid,
                event.issuer_share,
                event.server_share,
                event.served_to,
                short_id(&event.payment_proof_id)
            ));
        }
        lines.join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Output for verify-token command.
#[derive(Debug, Serialize)]
pub struct TokenOutput {
    pub claims: ServiceClaims,
}

impl Render for TokenOutput {
    fn render_human(&self) -> String {
        [
            format!("{}", "Token valid".green().bold()),
            format!("{} {}", "Issuer:".bold(), self.claims.issuer),
            format!("{} {}", "Path:".bold(), self.claims.path),
            format!("{} {}", "Payment:".bold(), self.claims.payment_proof_id),
            format!("{} {}", "Paid:".bold(), format_amount(self.claims.price_paid)),
            format!("{} {}", "Issued at:".bold(), self.claims.issued_at),
            format!("{} {}", "Expires at:".bold(), self.claims.expires_at),
        ]
        .join("\n")
    }

    fn render_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(12) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0 sat (0.00000000)");
        assert_eq!(format_amount(100_000_000), "100000000 sat (1.00000000)");
        assert_eq!(format_amount(1000), "1000 sat (0.00001000)");
    }

    #[test]
    fn test_stats_json() {
        let output = StatsOutput {
            total_serves: 3,
            total_revenue: 2500,
            distinct_paths: 2,
            pending_invoices: 1,
        };
        let json: serde_json::Value =
            serde_json::from_str(&output.render(OutputFormat::Json)).unwrap();
        assert_eq!(json["total_revenue"], 2500);
        assert_eq!(json["pending_invoices"], 1);
    }

    #[test]
    fn test_empty_events_human() {
        let output = EventsOutput {
            path: "/$doc".into(),
            events: vec![],
        };
        assert!(output.render_human().contains("No serves recorded"));
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id(&"a".repeat(64)), "aaaaaaaaaaaa");
        assert_eq!(short_id("abc"), "abc");
    }
}
