use thiserror::Error;

use crate::store::ValueFormat;

/// gconf 统一错误类型
#[derive(Error, Debug)]
pub enum GconfError {
    #[error("配置项已绑定对象: {key}")]
    AlreadyBound { key: String },

    #[error("配置项 {key} 的格式 {format:?} 不支持该操作")]
    UnsupportedFormat { key: String, format: ValueFormat },

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("应用名 [{app_name}] 与环境变量 APP_NAME [{env_app_name}] 不一致")]
    AppNameMismatch {
        app_name: String,
        env_app_name: String,
    },

    #[error("gconf 已使用应用名 [{current}] 初始化，不能再以 [{requested}] 初始化")]
    AlreadyInitialized { current: String, requested: String },

    #[error("gconf 尚未初始化")]
    NotInitialized,

    #[error("配置错误: {0}")]
    InvalidConfig(String),

    #[error("网络错误: {0}")]
    Transport(String),

    #[error("响应状态码不是 200: {status}, url: {url}")]
    Status { status: u16, url: String },

    #[error("解密失败: {0}")]
    Decrypt(String),
}

impl From<reqwest::Error> for GconfError {
    fn from(err: reqwest::Error) -> Self {
        GconfError::Transport(err.to_string())
    }
}

impl From<garde::Report> for GconfError {
    fn from(report: garde::Report) -> Self {
        GconfError::InvalidConfig(report.to_string())
    }
}
