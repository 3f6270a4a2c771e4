//! 队列处理流程 - 流程层
//!
//! 核心职责：把队列中所有待处理的图片按顺序放大一遍
//!
//! 流程顺序：
//! 1. 前置检查（只检查一次）：是否已在处理 → 是否有待处理条目 → 积分是否足够 → 是否已配置 API Key
//! 2. 逐张处理：pending → processing → completed（扣费）/ error（不扣费）
//! 3. 单张失败不影响其他图片，也不回滚已扣的积分

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{AppError, RunError};
use crate::models::{ItemId, ItemStatus, INTERRUPTED_MESSAGE};
use crate::services::{CredentialGate, Upscaler};
use crate::state::{AppState, SharedState};
use crate::utils::logging;
use crate::workflow::run_ctx::{ItemCtx, RunCtx};

/// 处理进度（仅供展示，不影响流程）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunProgress {
    /// 已结束（完成、失败或跳过）的条目数
    pub finished: usize,
    pub total: usize,
    /// 正在处理的条目
    pub current: Option<ItemId>,
}

/// 一次处理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// 开始时选中的条目数
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// 处理前已被移出队列的条目
    pub skipped: usize,
    /// 实际扣除的积分
    pub debited: u64,
    /// 是否被中途取消
    pub cancelled: bool,
}

impl RunOutcome {
    /// 没有任何待处理条目
    pub fn is_noop(&self) -> bool {
        self.total == 0
    }
}

/// 队列处理流程
///
/// - 编排前置检查和逐张处理
/// - 不持有队列和账本，只在每一步短暂加锁
/// - 只依赖放大能力和凭证检查两个接口
pub struct FulfillmentFlow {
    upscaler: Arc<dyn Upscaler>,
    gate: Arc<dyn CredentialGate>,
    progress: watch::Sender<RunProgress>,
}

impl FulfillmentFlow {
    pub fn new(upscaler: Arc<dyn Upscaler>, gate: Arc<dyn CredentialGate>) -> Self {
        let (progress, _) = watch::channel(RunProgress::default());
        Self {
            upscaler,
            gate,
            progress,
        }
    }

    /// 订阅处理进度
    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.progress.subscribe()
    }

    pub async fn run(
        &self,
        state: &SharedState,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome, RunError> {
        // ========== 前置检查 ==========
        let (_guard, ctx, pending_ids, balance) = {
            let st = state.lock().await;
            let guard = st.try_begin_run().ok_or(RunError::AlreadyRunning)?;

            let pending_ids: Vec<ItemId> = st
                .queue()
                .items_with_status(ItemStatus::Pending)
                .map(|item| item.id())
                .collect();

            if pending_ids.is_empty() {
                info!("没有待处理的图片");
                return Ok(RunOutcome::default());
            }

            let selection = st.selection();
            let ctx = RunCtx::new(selection.resolution, selection.mode, pending_ids.len());
            let available = st.ledger().balance();

            if !st.ledger().can_afford(ctx.required_credits()) {
                warn!(
                    "⚠️ 积分不足: {} 张 × {} 积分 = {}，当前余额 {}",
                    ctx.total,
                    ctx.cost,
                    ctx.required_credits(),
                    available
                );
                return Err(RunError::InsufficientCredits {
                    required: ctx.required_credits(),
                    available,
                });
            }

            (guard, ctx, pending_ids, available)
        };

        if !self.gate.has_credential().await {
            warn!("⚠️ 未配置 API Key，无法开始处理");
            self.gate.prompt_credential_setup().await;
            return Err(RunError::CredentialRequired);
        }

        logging::log_run_start(ctx.total, ctx.resolution, ctx.mode, ctx.cost, balance);

        // ========== 逐张处理 ==========
        let mut outcome = RunOutcome {
            total: ctx.total,
            ..Default::default()
        };
        self.publish(0, ctx.total, None);

        for (index, id) in pending_ids.iter().copied().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    "⏹️ 处理已取消，剩余 {} 张保持待处理",
                    ctx.total - index
                );
                outcome.cancelled = true;
                break;
            }

            self.process_item(state, &ctx, index + 1, id, &mut outcome)
                .await;

            self.publish(index + 1, ctx.total, None);
            // 让出执行权，方便其他任务在两张图片之间观察状态
            tokio::task::yield_now().await;
        }

        info!(
            "✓ 本次处理结束: 成功 {}，失败 {}，跳过 {}，扣除 {} 积分",
            outcome.completed, outcome.failed, outcome.skipped, outcome.debited
        );

        Ok(outcome)
    }

    /// 处理单个条目，所有错误都记录在条目上
    async fn process_item(
        &self,
        state: &SharedState,
        ctx: &RunCtx,
        index: usize,
        id: ItemId,
        outcome: &mut RunOutcome,
    ) {
        let claimed = {
            let mut st = state.lock().await;
            let claimed = st
                .queue()
                .get(id)
                .map(|item| (item.source_handle(), ctx.item(index, id, item.file_name())));
            match claimed {
                Some(claimed) if st.queue_mut().mark_processing(id) => Some(claimed),
                _ => None,
            }
        };

        let Some((source, item_ctx)) = claimed else {
            warn!("[图片 {}/{} #{}] 已不在待处理队列中，跳过", index, ctx.total, id);
            outcome.skipped += 1;
            return;
        };

        let mut in_flight = InFlightItem::new(state, id);

        info!("{} 🔍 开始放大...", item_ctx);
        self.publish(index - 1, ctx.total, Some(id));

        let result = self.upscaler.upscale(&source, ctx.resolution, ctx.mode).await;

        let mut st = state.lock().await;
        // 持锁后同步完成状态转换，不会再被中断
        in_flight.disarm();
        match result {
            Ok(image) if !image.is_empty() => {
                if st.queue().get(id).map(|item| item.status()) != Some(ItemStatus::Processing) {
                    warn!("{} ⚠️ 处理期间条目被移除，结果已丢弃", item_ctx);
                    outcome.skipped += 1;
                    return;
                }

                match st.ledger_mut().debit(ctx.cost) {
                    Ok(()) => {
                        st.queue_mut().mark_completed(id, image);
                        outcome.completed += 1;
                        outcome.debited += ctx.cost;
                        info!(
                            "{} ✓ 完成，扣除 {} 积分，余额 {}",
                            item_ctx,
                            ctx.cost,
                            st.ledger().balance()
                        );
                    }
                    Err(e) => {
                        Self::record_failure(&mut st, &item_ctx, e.to_string(), outcome);
                    }
                }
            }
            Ok(_) => {
                let message = "No image generated by the model.".to_string();
                Self::record_failure(&mut st, &item_ctx, message, outcome);
            }
            Err(e) => {
                Self::record_failure(&mut st, &item_ctx, failure_message(&e), outcome);
            }
        }
    }

    fn record_failure(
        st: &mut AppState,
        item_ctx: &ItemCtx,
        message: String,
        outcome: &mut RunOutcome,
    ) {
        error!("{} ❌ 放大失败: {}", item_ctx, message);
        if st.queue_mut().mark_failed(item_ctx.id, message) {
            outcome.failed += 1;
        } else {
            warn!("{} ⚠️ 处理期间条目被移除", item_ctx);
            outcome.skipped += 1;
        }
    }

    fn publish(&self, finished: usize, total: usize, current: Option<ItemId>) {
        self.progress.send_replace(RunProgress {
            finished,
            total,
            current,
        });
    }
}

/// 条目上记录的失败信息
///
/// API 错误只保留接口本身的描述，和空结果分支的文案保持一致
fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Api(api) => api.to_string(),
        other => other.to_string(),
    }
}

/// 正在等待放大结果的条目
///
/// `run` 的 future 在等待期间被丢弃（超时、`select!`、任务被 abort）时，
/// 条目会被标记为失败，不会一直停留在 processing
struct InFlightItem {
    state: SharedState,
    id: ItemId,
    armed: bool,
}

impl InFlightItem {
    fn new(state: &SharedState, id: ItemId) -> Self {
        Self {
            state: Arc::clone(state),
            id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightItem {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let id = self.id;
        warn!("#{} ⚠️ 处理被中断，标记为失败", id);

        if let Ok(mut st) = self.state.try_lock() {
            st.queue_mut().mark_failed(id, INTERRUPTED_MESSAGE);
            return;
        }

        // 锁被占用时交给运行时稍后处理
        let state = Arc::clone(&self.state);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state.lock().await.queue_mut().mark_failed(id, INTERRUPTED_MESSAGE);
                });
            }
            Err(_) => error!("#{} ❌ 无法标记中断的条目", id),
        }
    }
}
