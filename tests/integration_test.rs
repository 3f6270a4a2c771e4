use async_trait::async_trait;
use batch_upscaler::error::{ApiError, QueueError};
use batch_upscaler::models::INTERRUPTED_MESSAGE;
use batch_upscaler::{
    AppError, AppResult, AppState, CredentialGate, FulfillmentFlow, ImagePayload, ItemId,
    ItemStatus, RunError, Selection, SharedState, UpscaleMode, UpscaleResolution, Upscaler,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

// ========== 测试替身 ==========

/// 记录调用顺序，按调用序号决定成功或失败
#[derive(Default)]
struct FakeUpscaler {
    calls: Mutex<Vec<String>>,
    fail_calls: HashSet<usize>,
    cancel_after_first: Option<CancellationToken>,
}

impl FakeUpscaler {
    fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upscaler for FakeUpscaler {
    async fn upscale(
        &self,
        source: &ImagePayload,
        _resolution: UpscaleResolution,
        _mode: UpscaleMode,
    ) -> AppResult<ImagePayload> {
        let name = String::from_utf8_lossy(source.bytes()).to_string();
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(name.clone());
            calls.len()
        };

        if let Some(token) = &self.cancel_after_first {
            token.cancel();
        }

        if self.fail_calls.contains(&call_index) {
            return Err(AppError::Other(format!("upstream rejected {}", name)));
        }
        Ok(ImagePayload::new(format!("up:{}", name).into_bytes(), "image/png"))
    }
}

/// 第一次调用时阻塞，直到测试放行
struct BlockingUpscaler {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl Upscaler for BlockingUpscaler {
    async fn upscale(
        &self,
        source: &ImagePayload,
        _resolution: UpscaleResolution,
        _mode: UpscaleMode,
    ) -> AppResult<ImagePayload> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(ImagePayload::new(source.bytes().to_vec(), "image/png"))
    }
}

/// 永远不返回，模拟卡住的请求
struct HangingUpscaler;

#[async_trait]
impl Upscaler for HangingUpscaler {
    async fn upscale(
        &self,
        _source: &ImagePayload,
        _resolution: UpscaleResolution,
        _mode: UpscaleMode,
    ) -> AppResult<ImagePayload> {
        std::future::pending().await
    }
}

/// 第一次返回空结果错误，之后返回空图片
#[derive(Default)]
struct NoImageUpscaler {
    calls: AtomicUsize,
}

#[async_trait]
impl Upscaler for NoImageUpscaler {
    async fn upscale(
        &self,
        _source: &ImagePayload,
        _resolution: UpscaleResolution,
        _mode: UpscaleMode,
    ) -> AppResult<ImagePayload> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ApiError::EmptyResponse {
                endpoint: "gemini".to_string(),
            }
            .into());
        }
        Ok(ImagePayload::new(Vec::new(), "image/png"))
    }
}

struct FakeGate {
    configured: bool,
    prompts: AtomicUsize,
}

impl FakeGate {
    fn new(configured: bool) -> Self {
        Self {
            configured,
            prompts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CredentialGate for FakeGate {
    async fn has_credential(&self) -> bool {
        self.configured
    }

    async fn prompt_credential_setup(&self) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
    }
}

// ========== 辅助函数 ==========

fn state_with(balance: u64, names: &[&str]) -> (SharedState, Vec<ItemId>) {
    let mut state = AppState::new(balance).with_selection(Selection {
        resolution: UpscaleResolution::Res4K,
        mode: UpscaleMode::Standard,
    });
    let ids = names
        .iter()
        .map(|name| {
            state
                .queue_mut()
                .enqueue(*name, ImagePayload::new(name.as_bytes().to_vec(), "image/png"))
        })
        .collect();
    (state.into_shared(), ids)
}

fn flow(upscaler: Arc<dyn Upscaler>, gate: Arc<FakeGate>) -> FulfillmentFlow {
    FulfillmentFlow::new(upscaler, gate)
}

async fn statuses(state: &SharedState) -> Vec<ItemStatus> {
    state.lock().await.queue().iter().map(|i| i.status()).collect()
}

async fn balance(state: &SharedState) -> u64 {
    state.lock().await.ledger().balance()
}

// ========== 场景测试 ==========

#[tokio::test]
async fn test_insufficient_credits_touches_nothing() {
    let (state, _) = state_with(10, &["a.png", "b.png", "c.png"]);
    let upscaler = Arc::new(FakeUpscaler::default());
    let gate = Arc::new(FakeGate::new(true));

    let result = flow(upscaler.clone(), gate)
        .run(&state, &CancellationToken::new())
        .await;

    assert_eq!(
        result,
        Err(RunError::InsufficientCredits {
            required: 12,
            available: 10
        })
    );
    assert_eq!(statuses(&state).await, vec![ItemStatus::Pending; 3]);
    assert_eq!(balance(&state).await, 10);
    assert!(upscaler.calls().is_empty());
    assert!(!state.lock().await.is_running());
}

#[tokio::test]
async fn test_all_succeed_in_submission_order() {
    let (state, _) = state_with(20, &["first.png", "second.png"]);
    let upscaler = Arc::new(FakeUpscaler::default());
    let gate = Arc::new(FakeGate::new(true));

    let outcome = tokio_test::assert_ok!(
        flow(upscaler.clone(), gate)
            .run(&state, &CancellationToken::new())
            .await
    );

    assert_eq!(outcome.completed, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.debited, 8);
    assert_eq!(balance(&state).await, 12);
    assert_eq!(upscaler.calls(), vec!["first.png", "second.png"]);

    let st = state.lock().await;
    for item in st.queue().iter() {
        assert_eq!(item.status(), ItemStatus::Completed);
        let expected = format!("up:{}", item.file_name()).into_bytes();
        assert_eq!(item.result().map(|r| r.bytes().to_vec()), Some(expected));
    }
}

#[tokio::test]
async fn test_failure_is_isolated_and_not_charged() {
    let (state, ids) = state_with(20, &["broken.png", "fine.png"]);
    let upscaler = Arc::new(FakeUpscaler::failing_on(&[1]));
    let gate = Arc::new(FakeGate::new(true));

    let outcome = flow(upscaler, gate)
        .run(&state, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(balance(&state).await, 16);

    let st = state.lock().await;
    let broken = st.queue().get(ids[0]).unwrap();
    assert_eq!(broken.status(), ItemStatus::Error);
    assert!(broken
        .error_message()
        .is_some_and(|m| m.contains("upstream rejected broken.png")));
    assert!(broken.result().is_none());

    let fine = st.queue().get(ids[1]).unwrap();
    assert_eq!(fine.status(), ItemStatus::Completed);
    assert!(fine.error_message().is_none());
}

#[tokio::test]
async fn test_debits_match_completed_items() {
    let names: Vec<String> = (0..7).map(|i| format!("img{}.png", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (state, _) = state_with(100, &refs);
    let upscaler = Arc::new(FakeUpscaler::failing_on(&[2, 3, 6]));
    let gate = Arc::new(FakeGate::new(true));

    let outcome = flow(upscaler, gate)
        .run(&state, &CancellationToken::new())
        .await
        .unwrap();

    let st = state.lock().await;
    let counts = st.queue().counts();
    assert_eq!(counts.completed, 4);
    assert_eq!(counts.error, 3);
    assert_eq!(outcome.debited, 4 * 4);
    assert_eq!(st.ledger().balance(), 100 - 4 * 4);

    for item in st.queue().iter() {
        match item.status() {
            ItemStatus::Completed => {
                assert!(item.result().is_some_and(|r| !r.is_empty()));
                assert!(item.error_message().is_none());
            }
            ItemStatus::Error => {
                assert!(item.error_message().is_some_and(|m| !m.is_empty()));
                assert!(item.result().is_none());
            }
            other => panic!("unexpected status {}", other),
        }
    }
}

#[tokio::test]
async fn test_missing_credential_prompts_and_aborts() {
    let (state, _) = state_with(20, &["a.png"]);
    let upscaler = Arc::new(FakeUpscaler::default());
    let gate = Arc::new(FakeGate::new(false));

    let err = tokio_test::assert_err!(
        flow(upscaler.clone(), gate.clone())
            .run(&state, &CancellationToken::new())
            .await
    );

    assert_eq!(err, RunError::CredentialRequired);
    assert_eq!(gate.prompts.load(Ordering::SeqCst), 1);
    assert_eq!(statuses(&state).await, vec![ItemStatus::Pending]);
    assert_eq!(balance(&state).await, 20);
    assert!(upscaler.calls().is_empty());
}

#[tokio::test]
async fn test_empty_queue_is_noop() {
    let (state, _) = state_with(0, &[]);
    let gate = Arc::new(FakeGate::new(false));

    let outcome = flow(Arc::new(FakeUpscaler::default()), gate.clone())
        .run(&state, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_noop());
    assert_eq!(gate.prompts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_terminal_items_are_not_reprocessed() {
    let (state, _) = state_with(20, &["a.png", "b.png"]);
    let upscaler = Arc::new(FakeUpscaler::failing_on(&[1]));
    let flow = flow(upscaler.clone(), Arc::new(FakeGate::new(true)));

    flow.run(&state, &CancellationToken::new()).await.unwrap();
    let second = flow.run(&state, &CancellationToken::new()).await.unwrap();

    assert!(second.is_noop());
    assert_eq!(upscaler.calls().len(), 2);
    assert_eq!(balance(&state).await, 16);
}

#[tokio::test]
async fn test_cancellation_stops_between_items() {
    let (state, _) = state_with(20, &["a.png", "b.png", "c.png"]);
    let cancel = CancellationToken::new();
    let upscaler = Arc::new(FakeUpscaler {
        cancel_after_first: Some(cancel.clone()),
        ..Default::default()
    });

    let outcome = flow(upscaler.clone(), Arc::new(FakeGate::new(true)))
        .run(&state, &cancel)
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.completed, 1);
    assert_eq!(upscaler.calls(), vec!["a.png"]);
    assert_eq!(
        statuses(&state).await,
        vec![ItemStatus::Completed, ItemStatus::Pending, ItemStatus::Pending]
    );
    assert_eq!(balance(&state).await, 16);
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let (state, _) = state_with(20, &["a.png", "b.png"]);
    let flow = flow(
        Arc::new(FakeUpscaler::failing_on(&[2])),
        Arc::new(FakeGate::new(true)),
    );
    let rx = flow.subscribe();

    flow.run(&state, &CancellationToken::new()).await.unwrap();

    let progress = *rx.borrow();
    assert_eq!(progress.finished, 2);
    assert_eq!(progress.total, 2);
    assert!(progress.current.is_none());
}

#[tokio::test]
async fn test_run_exclusion_and_mid_run_changes() {
    let (state, ids) = state_with(20, &["a.png", "b.png", "c.png"]);
    let upscaler = Arc::new(BlockingUpscaler {
        started: Notify::new(),
        release: Notify::new(),
    });
    let flow = Arc::new(flow(upscaler.clone(), Arc::new(FakeGate::new(true))));

    let handle = {
        let flow = Arc::clone(&flow);
        let state = Arc::clone(&state);
        tokio::spawn(async move { flow.run(&state, &CancellationToken::new()).await })
    };

    // 第一张图片正在处理
    upscaler.started.notified().await;

    // 同时只能有一个处理任务
    let second = flow.run(&state, &CancellationToken::new()).await;
    assert_eq!(second, Err(RunError::AlreadyRunning));

    let late = {
        let mut st = state.lock().await;
        assert!(st.is_running());
        assert_eq!(st.clear_all(), Err(QueueError::RunInProgress));
        assert!(st.queue_mut().remove(ids[2]));
        st.queue_mut()
            .enqueue("late.png", ImagePayload::new(b"late.png".to_vec(), "image/png"))
    };

    upscaler.release.notify_one();
    upscaler.started.notified().await;
    upscaler.release.notify_one();

    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.completed, 2);
    assert_eq!(outcome.skipped, 1);

    let st = state.lock().await;
    assert!(!st.is_running());
    assert_eq!(st.ledger().balance(), 12);
    assert_eq!(st.queue().get(late).map(|i| i.status()), Some(ItemStatus::Pending));
    assert!(st.queue().get(ids[2]).is_none());
}

#[tokio::test]
async fn test_clear_completed_keeps_others_in_order() {
    let (state, ids) = state_with(20, &["a.png", "b.png", "c.png"]);
    flow(
        Arc::new(FakeUpscaler::failing_on(&[2])),
        Arc::new(FakeGate::new(true)),
    )
    .run(&state, &CancellationToken::new())
    .await
    .unwrap();

    let mut st = state.lock().await;
    st.queue_mut()
        .enqueue("d.png", ImagePayload::new(b"d.png".to_vec(), "image/png"));

    assert_eq!(st.queue_mut().clear_by_status(ItemStatus::Completed), 2);
    let remaining: Vec<_> = st.queue().iter().map(|i| i.file_name().to_string()).collect();
    assert_eq!(remaining, vec!["b.png", "d.png"]);
    assert_eq!(st.queue().get(ids[1]).map(|i| i.status()), Some(ItemStatus::Error));
}

#[tokio::test]
async fn test_dropped_run_marks_in_flight_item_failed() {
    let (state, ids) = state_with(10, &["a.png", "b.png"]);
    let hanging = flow(Arc::new(HangingUpscaler), Arc::new(FakeGate::new(true)));

    let cancel = CancellationToken::new();
    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), hanging.run(&state, &cancel)).await;
    assert!(timed_out.is_err());

    {
        let st = state.lock().await;
        assert!(!st.is_running());
        let first = st.queue().get(ids[0]).unwrap();
        assert_eq!(first.status(), ItemStatus::Error);
        assert_eq!(first.error_message(), Some(INTERRUPTED_MESSAGE));
        assert_eq!(st.queue().get(ids[1]).map(|i| i.status()), Some(ItemStatus::Pending));
        assert_eq!(st.ledger().balance(), 10);
    }

    // 下一次处理只处理剩下的待处理条目
    let outcome = flow(Arc::new(FakeUpscaler::default()), Arc::new(FakeGate::new(true)))
        .run(&state, &cancel)
        .await
        .unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.completed, 1);
    assert_eq!(statuses(&state).await, vec![ItemStatus::Error, ItemStatus::Completed]);
    assert_eq!(balance(&state).await, 6);
}

#[tokio::test]
async fn test_missing_image_message_is_the_same_for_both_paths() {
    let (state, ids) = state_with(10, &["a.png", "b.png"]);
    let outcome = flow(Arc::new(NoImageUpscaler::default()), Arc::new(FakeGate::new(true)))
        .run(&state, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.failed, 2);

    let st = state.lock().await;
    for id in ids {
        assert_eq!(
            st.queue().get(id).and_then(|i| i.error_message()),
            Some("No image generated by the model.")
        );
    }
    assert_eq!(st.ledger().balance(), 10);
}
