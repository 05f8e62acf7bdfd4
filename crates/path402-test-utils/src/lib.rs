pub mod failing;
pub mod helpers;
pub mod mock_chain;

pub use failing::{FailingInvoiceLedger, FailingServeLedger, StaticContent};
pub use helpers::*;
pub use mock_chain::MockChainRpc;
