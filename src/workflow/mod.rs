pub mod fulfillment_flow;
pub mod run_ctx;

pub use fulfillment_flow::{FulfillmentFlow, RunOutcome, RunProgress};
pub use run_ctx::{ItemCtx, RunCtx};
