use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{CreditPackage, UpscaleMode, UpscaleResolution};

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose` 为真时为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能被重复调用，忽略重复初始化的错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n图片放大处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量图片放大模式");
    info!("🧠 模型: {}", config.model_name);
    info!("📂 输入目录: {} → 输出目录: {}", config.input_folder, config.output_folder);
    info!("{}", "=".repeat(60));
}

/// 记录一次处理的开始
///
/// # 参数
/// - `total`: 本次待处理的图片数
/// - `resolution`: 档位
/// - `mode`: 增强模式
/// - `cost`: 每张图片的积分
/// - `balance`: 当前余额
pub fn log_run_start(
    total: usize,
    resolution: UpscaleResolution,
    mode: UpscaleMode,
    cost: u64,
    balance: u64,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理 {} 张图片", total);
    info!("🎯 档位: {} | 模式: {} | 单价: {} 积分", resolution.option().label, mode.label(), cost);
    info!("💰 当前余额: {} 积分，预计消耗: {} 积分", balance, cost * total as u64);
    info!("{}", "=".repeat(60));
}

/// 列出可购买的积分套餐
pub fn log_packages(packages: &[CreditPackage]) {
    info!("💳 可购买的积分套餐:");
    for package in packages {
        let marker = if package.featured { " ⭐" } else { "" };
        info!(
            "   - {}: {} 积分 / ${}{}",
            package.id, package.credits, package.price, marker
        );
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `completed`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `balance`: 剩余积分
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(
    completed: usize,
    failed: usize,
    total: usize,
    balance: u64,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", completed, total);
    info!("❌ 失败: {}", failed);
    info!("💰 剩余积分: {}", balance);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
