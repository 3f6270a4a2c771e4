//! 批量放大处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责应用生命周期和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、创建 Gemini 客户端和凭证存储、初始化积分
//! 2. **批量导入**：扫描输入目录，把图片加入队列（非图片文件直接拒绝）
//! 3. **处理调度**：委托 `FulfillmentFlow` 处理队列，Ctrl-C 触发取消
//! 4. **前置失败引导**：积分不足时列出套餐，缺少 Key 时提示配置方式
//! 5. **结果输出**：把已完成的结果写到输出目录
//! 6. **全局统计**：汇总本次处理结果

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::clients::{CredentialStore, GeminiClient};
use crate::config::Config;
use crate::error::RunError;
use crate::models::{load_image_folder, IngestReport, ItemStatus, CREDIT_PACKAGES};
use crate::services::{
    CredentialGate, DownloadWriter, GeminiUpscaler, PurchaseService, StdinCredentialGate,
    Upscaler,
};
use crate::state::{AppState, Selection, SharedState};
use crate::utils::logging;
use crate::workflow::{FulfillmentFlow, RunOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    state: SharedState,
    flow: FulfillmentFlow,
    downloads: DownloadWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        logging::log_startup(&config);

        let credentials = CredentialStore::new(config.gemini_api_key.clone());
        let client = GeminiClient::new(&config, credentials.clone())?;
        let upscaler: Arc<dyn Upscaler> = Arc::new(GeminiUpscaler::new(client));
        let gate: Arc<dyn CredentialGate> = Arc::new(StdinCredentialGate::new(credentials));

        Self::with_services(config, upscaler, gate)
    }

    /// 使用指定的放大能力和凭证检查创建应用
    pub fn with_services(
        config: Config,
        upscaler: Arc<dyn Upscaler>,
        gate: Arc<dyn CredentialGate>,
    ) -> Result<Self> {
        let mut state = AppState::new(config.starting_credits).with_selection(Selection {
            resolution: config.resolution,
            mode: config.mode,
        });

        if let Some(package_id) = &config.purchase_package {
            PurchaseService::new().purchase_by_id(state.ledger_mut(), package_id)?;
        }

        let downloads = DownloadWriter::new(&config.output_folder);

        Ok(Self {
            config,
            state: state.into_shared(),
            flow: FulfillmentFlow::new(upscaler, gate),
            downloads,
        })
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let report = self.load_images().await?;

        if report.accepted.is_empty() {
            warn!("⚠️ 没有找到可处理的图片，程序结束");
            return Ok(());
        }

        self.enqueue(report).await;

        let cancel = CancellationToken::new();
        let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
        let progress = tokio::spawn(log_progress(self.flow.subscribe()));

        let result = self.flow.run(&self.state, &cancel).await;

        ctrl_c.abort();
        progress.abort();

        match result {
            Ok(outcome) => self.finish(outcome).await,
            Err(e) => {
                self.guide_remediation(&e).await;
                Err(e.into())
            }
        }
    }

    /// 扫描输入目录
    async fn load_images(&self) -> Result<IngestReport> {
        info!("\n📁 正在扫描待处理的图片...");
        let report = load_image_folder(&self.config.input_folder)
            .await
            .with_context(|| format!("无法读取输入目录: {}", self.config.input_folder))?;

        info!(
            "✓ 找到 {} 张图片，拒绝 {} 个文件",
            report.accepted.len(),
            report.rejected.len()
        );
        for rejected in &report.rejected {
            warn!("   - {}: {}", rejected.file_name, rejected.reason);
        }

        Ok(report)
    }

    async fn enqueue(&self, report: IngestReport) {
        let mut st = self.state.lock().await;
        for image in report.accepted {
            st.queue_mut().enqueue(image.file_name, image.payload);
        }
    }

    /// 输出结果并打印统计
    async fn finish(&self, outcome: RunOutcome) -> Result<()> {
        let st = self.state.lock().await;

        let written = self
            .downloads
            .download_all(st.queue())
            .await
            .context("保存放大结果失败")?;

        for item in st.queue().items_with_status(ItemStatus::Error) {
            error!(
                "❌ {}: {}",
                item.file_name(),
                item.error_message().unwrap_or_default()
            );
        }

        if outcome.cancelled {
            warn!(
                "⏹️ 处理被取消，{} 张图片仍为待处理",
                st.queue().counts().pending
            );
        }

        info!("💾 本次共保存 {} 个文件", written.len());
        logging::print_final_stats(
            outcome.completed,
            outcome.failed,
            outcome.total,
            st.ledger().balance(),
            &self.config.output_log_file,
        );

        Ok(())
    }

    /// 前置检查失败时给出补救提示
    async fn guide_remediation(&self, err: &RunError) {
        match err {
            RunError::InsufficientCredits {
                required,
                available,
            } => {
                error!("❌ 积分不足: 需要 {}，当前 {}", required, available);
                logging::log_packages(&CREDIT_PACKAGES);
                info!("💡 设置 PURCHASE_PACKAGE=<套餐ID> 后重新运行即可充值");
            }
            RunError::CredentialRequired => {
                error!("❌ 未配置 API Key");
                info!("💡 设置 GEMINI_API_KEY 环境变量，或在提示时输入 Key");
            }
            RunError::AlreadyRunning => {
                error!("❌ 已有处理任务正在进行");
            }
        }
        let st = self.state.lock().await;
        info!(
            "队列未改动: {} 张待处理，余额 {} 积分",
            st.queue().counts().pending,
            st.ledger().balance()
        );
    }
}

/// 第一次 Ctrl-C 请求取消（当前图片处理完后停止），第二次直接退出
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if watch_interrupts(tokio::signal::ctrl_c, cancel).await {
        error!("⛔ 再次收到中断信号，立即退出");
        std::process::exit(130);
    }
}

/// 等待中断信号
///
/// 第一次信号触发取消；收到第二次信号时返回 `true`，由调用方强制退出。
/// 监听信号失败时返回 `false`
async fn watch_interrupts<F, Fut>(mut interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    warn!("⏹️ 收到中断信号，当前图片完成后停止（再按一次 Ctrl-C 立即退出）");
    cancel.cancel();

    interrupt().await.is_ok()
}

/// 打印进度
async fn log_progress(mut rx: tokio::sync::watch::Receiver<crate::workflow::RunProgress>) {
    while rx.changed().await.is_ok() {
        let progress = *rx.borrow_and_update();
        if progress.total > 0 && progress.current.is_none() && progress.finished > 0 {
            info!(
                "📈 进度: {}/{} ({}%)",
                progress.finished,
                progress.total,
                progress.finished * 100 / progress.total
            );
        }
    }
}
