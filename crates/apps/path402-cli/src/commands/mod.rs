//! CLI command implementations.

pub mod earnings;
pub mod events;
pub mod init;
pub mod schedule;
pub mod serve;
pub mod stats;
pub mod verify_token;

// Re-export command handlers
pub use earnings::earnings;
pub use events::events;
pub use init::init;
pub use schedule::{schedule, ScheduleArgs};
pub use serve::serve;
pub use stats::stats;
pub use verify_token::verify_token;
