//! # Batch Upscaler
//!
//! 一个批量调用 Gemini 放大图片、按积分计费的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 持有 HTTP 客户端和 API Key，只暴露能力
//! - `GeminiClient` - generateContent 调用
//! - `CredentialStore` - 共享的 API Key
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张图片
//! - `Upscaler` / `GeminiUpscaler` - 放大能力
//! - `CredentialGate` - 凭证检查与引导配置
//! - `PurchaseService` - 积分购买
//! - `DownloadWriter` - 写出结果
//!
//! ### ③ 状态层（Queue / State）
//! - `queue/` - `BatchQueue` 有序队列，`CreditLedger` 积分账本
//! - `state/` - `AppState` 集中保存队列、账本、当前选择和处理中标志
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - `FulfillmentFlow` 前置检查 + 逐张处理
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 导入、调度、输出、统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod queue;
pub mod services;
pub mod state;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, RunError};
pub use models::{ImagePayload, ItemId, ItemStatus, QueueItem, UpscaleMode, UpscaleResolution};
pub use orchestrator::App;
pub use queue::{BatchQueue, CreditLedger};
pub use services::{CredentialGate, Upscaler};
pub use state::{AppState, Selection, SharedState};
pub use workflow::{FulfillmentFlow, RunOutcome, RunProgress};
