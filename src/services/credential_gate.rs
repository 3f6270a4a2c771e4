//! 凭证检查服务 - 业务能力层
//!
//! 判断是否已配置 API Key，并在需要时引导用户配置

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::clients::CredentialStore;

/// 凭证检查
#[async_trait]
pub trait CredentialGate: Send + Sync {
    /// 是否已配置有效的 API Key
    async fn has_credential(&self) -> bool;

    /// 引导用户配置 API Key，用户完成或取消后返回
    async fn prompt_credential_setup(&self);
}

/// 从标准输入读取 API Key
///
/// 读到的 Key 写入共享的 `CredentialStore`，客户端下次请求即可使用
pub struct StdinCredentialGate {
    store: CredentialStore,
}

impl StdinCredentialGate {
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialGate for StdinCredentialGate {
    async fn has_credential(&self) -> bool {
        self.store.is_configured().await
    }

    async fn prompt_credential_setup(&self) {
        info!("🔑 尚未配置 Gemini API Key，请输入（直接回车取消）:");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => {
                self.store.set(line).await;
                info!("✓ API Key 已配置");
            }
            Ok(_) => warn!("⚠️ 已取消 API Key 配置"),
            Err(e) => warn!("⚠️ 读取 API Key 失败: {}", e),
        }
    }
}
