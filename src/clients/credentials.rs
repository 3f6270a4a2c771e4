use std::sync::Arc;
use tokio::sync::RwLock;

/// API Key 存储
///
/// 客户端每次请求都重新读取，重新配置后立即生效
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    /// 空字符串视为未配置
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(normalize(api_key.into()))),
        }
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    pub async fn is_configured(&self) -> bool {
        self.inner.read().await.is_some()
    }

    pub async fn set(&self, api_key: impl Into<String>) {
        *self.inner.write().await = normalize(api_key.into());
    }
}

fn normalize(key: String) -> Option<String> {
    let key = key.trim();
    (!key.is_empty()).then(|| key.to_string())
}
