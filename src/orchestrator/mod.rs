//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责应用生命周期和流程调度，是整个系统的"指挥中心"。
//!
//! ### `batch_processor` - 批量放大处理器
//! - 管理应用生命周期（初始化、运行、输出）
//! - 从输入目录导入图片
//! - 持有共享状态、处理流程和下载服务
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (导入 / 调度 / 输出)
//!     ↓
//! workflow::FulfillmentFlow (逐张处理队列)
//!     ↓
//! services (能力层：upscale / credential / purchase / download)
//!     ↓
//! clients (基础设施：GeminiClient)
//! ```

pub mod batch_processor;

pub use batch_processor::App;
