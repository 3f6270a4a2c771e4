use thiserror::Error;

use crate::models::ItemId;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 队列操作错误
    #[error("队列错误: {0}")]
    Queue(#[from] QueueError),
    /// 积分账本错误
    #[error("积分错误: {0}")]
    Ledger(#[from] LedgerError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// API 返回结果中没有图片
    #[error("No image generated by the model.")]
    EmptyResponse { endpoint: String },
    /// 未配置 API Key
    #[error("未配置 API Key")]
    MissingCredential,
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回的图片数据无法解码
    #[error("图片数据解码失败: {source}")]
    InvalidImageData {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 不是图片文件
    #[error("不是图片文件: {path}")]
    NotAnImage { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 积分套餐不存在
    #[error("未知的积分套餐: {id}")]
    UnknownPackage { id: String },
}

/// 队列操作错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// 处理进行中，不允许清空队列
    #[error("队列正在处理中，无法执行该操作")]
    RunInProgress,
    /// 条目尚未完成，没有可下载的结果
    #[error("条目 {0} 尚未完成")]
    NotCompleted(ItemId),
}

/// 积分账本错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// 余额不足
    #[error("积分不足: 需要 {required}, 当前 {available}")]
    Insufficient { required: u64, available: u64 },
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 处理流程的前置条件错误
///
/// 均在任何条目被修改之前返回
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    /// 已有处理任务在进行
    #[error("已有处理任务正在进行")]
    AlreadyRunning,
    /// 积分不足，需要先购买
    #[error("积分不足: 需要 {required}, 当前 {available}")]
    InsufficientCredits { required: u64, available: u64 },
    /// 未配置 API Key
    #[error("需要先配置 API Key")]
    CredentialRequired,
}
