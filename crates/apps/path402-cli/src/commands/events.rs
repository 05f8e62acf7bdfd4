//! List recent serves for a path.

use path402_store::ServeLedger;

use crate::config::CliConfig;
use crate::context::NodeContext;
use crate::error::CliResult;
use crate::output::{EventsOutput, OutputFormat, Render};

/// Execute the events command. Newest first.
pub fn events(config: CliConfig, format: OutputFormat, path: &str, limit: u32) -> CliResult<String> {
    let ctx = NodeContext::open(config)?;
    let events = ctx.ledgers.serves.events(path, limit as usize)?;

    let output = EventsOutput {
        path: path.to_string(),
        events,
    };

    Ok(output.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use path402_types::{RevenueSplit, ServeEvent};
    use tempfile::TempDir;

    #[test]
    fn test_events_newest_first_and_limited() {
        let temp_dir = TempDir::new().unwrap();
        let config = CliConfig::example(temp_dir.path());
        {
            let ctx = NodeContext::open(config.clone()).unwrap();
            for (i, ts) in [10u64, 30, 20].iter().enumerate() {
                let split = RevenueSplit {
                    total: 100,
                    issuer_share: 70,
                    server_share: 30,
                };
                let event = ServeEvent::from_split(
                    "/$hello",
                    "node",
                    format!("client-{}", i),
                    split,
                    "tx",
                    *ts,
                );
                ctx.ledgers.serves.record_serve(&event).unwrap();
            }
        }

        let output = events(config, OutputFormat::Json, "/$hello", 2).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        let listed = json["events"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0]["timestamp"], 30);
        assert_eq!(listed[1]["timestamp"], 20);
    }
}
