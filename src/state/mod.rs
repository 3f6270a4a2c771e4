//! 应用状态
//!
//! 集中保存队列、积分账本、当前选择的档位/模式以及"是否正在处理"标志。
//! 通过 `SharedState` 在编排层和处理流程之间共享，处理流程在调用外部 API
//! 期间不持有锁。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::QueueError;
use crate::models::{UpscaleMode, UpscaleResolution};
use crate::queue::{BatchQueue, CreditLedger};

/// 共享的应用状态
pub type SharedState = Arc<Mutex<AppState>>;

/// 用户当前的选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub resolution: UpscaleResolution,
    pub mode: UpscaleMode,
}

/// 应用状态
#[derive(Debug)]
pub struct AppState {
    queue: BatchQueue,
    ledger: CreditLedger,
    selection: Selection,
    run_flag: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(starting_credits: u64) -> Self {
        Self {
            queue: BatchQueue::new(),
            ledger: CreditLedger::new(starting_credits),
            selection: Selection::default(),
            run_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn queue(&self) -> &BatchQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut BatchQueue {
        &mut self.queue
    }

    pub fn ledger(&self) -> &CreditLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut CreditLedger {
        &mut self.ledger
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_running(&self) -> bool {
        self.run_flag.load(Ordering::Acquire)
    }

    /// 修改档位，处理期间档位固定不变
    pub fn set_resolution(&mut self, resolution: UpscaleResolution) -> Result<(), QueueError> {
        self.ensure_idle()?;
        self.selection.resolution = resolution;
        Ok(())
    }

    /// 修改增强模式，处理期间不可修改
    pub fn set_mode(&mut self, mode: UpscaleMode) -> Result<(), QueueError> {
        self.ensure_idle()?;
        self.selection.mode = mode;
        Ok(())
    }

    /// 清空队列，处理期间拒绝
    pub fn clear_all(&mut self) -> Result<(), QueueError> {
        self.ensure_idle()?;
        self.queue.clear_all();
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), QueueError> {
        if self.is_running() {
            return Err(QueueError::RunInProgress);
        }
        Ok(())
    }

    /// 原子地占用"处理中"标志，已被占用时返回 `None`
    pub(crate) fn try_begin_run(&self) -> Option<RunGuard> {
        self.run_flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                flag: Arc::clone(&self.run_flag),
            })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// 处理中标志的持有者，离开作用域时自动释放
#[derive(Debug)]
pub(crate) struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImagePayload;

    #[test]
    fn test_only_one_run_at_a_time() {
        let state = AppState::new(0);
        let guard = state.try_begin_run();
        assert!(guard.is_some());
        assert!(state.is_running());
        assert!(state.try_begin_run().is_none());

        drop(guard);
        assert!(!state.is_running());
        assert!(state.try_begin_run().is_some());
    }

    #[test]
    fn test_clear_all_refused_while_running() {
        let mut state = AppState::new(0);
        state
            .queue_mut()
            .enqueue("a.png", ImagePayload::new(vec![1], "image/png"));

        let guard = state.try_begin_run();
        assert_eq!(state.clear_all(), Err(QueueError::RunInProgress));
        assert_eq!(state.queue().len(), 1);

        drop(guard);
        assert_eq!(state.clear_all(), Ok(()));
        assert!(state.queue().is_empty());
    }

    #[test]
    fn test_selection_frozen_while_running() {
        let mut state = AppState::new(0);
        let _guard = state.try_begin_run();
        assert_eq!(
            state.set_resolution(UpscaleResolution::Res16K),
            Err(QueueError::RunInProgress)
        );
        assert_eq!(state.set_mode(UpscaleMode::Anime), Err(QueueError::RunInProgress));
        assert_eq!(state.selection(), Selection::default());
    }
}
