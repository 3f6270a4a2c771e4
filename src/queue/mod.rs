//! 队列与积分
//!
//! - `batch_queue` - 有序的待处理条目集合
//! - `ledger` - 内存中的积分余额

pub mod batch_queue;
pub mod ledger;

pub use batch_queue::{BatchQueue, StatusCounts};
pub use ledger::CreditLedger;
