//! gconf 客户端配置

use garde::Validate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::time::Duration;

/// 在 k8s 内部使用的默认服务地址
pub const DEFAULT_SERVER_URL: &str = "http://gconf/api";

/// gconf 客户端配置
///
/// # 示例
/// ```
/// use gconf::cfg::GconfConfig;
///
/// let config: GconfConfig = serde_json::from_str(r#"{
///     "app_id": "userdoor",
///     "server_url": "http://gconf.services.dev.ofc/api"
/// }"#).unwrap();
///
/// assert_eq!(config.idle_interval_ms, 2000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, SmartDefault, Validate)]
#[serde(default)]
pub struct GconfConfig {
    /// 当前应用 ID（当前配置集合）
    #[garde(length(min = 1))]
    pub app_id: String,

    /// 配置中心 API 地址
    #[default(DEFAULT_SERVER_URL.to_string())]
    #[garde(pattern(r"^https?://"))]
    pub server_url: String,

    /// 实例名，为空时从环境变量解析
    #[garde(skip)]
    pub instance_name: Option<String>,

    /// 缓存为空时后台任务的空转间隔，单位：毫秒
    #[default = 2000]
    #[garde(range(min = 1))]
    pub idle_interval_ms: u64,

    /// 普通请求超时，单位：毫秒
    #[default = 30000]
    #[garde(range(min = 1))]
    pub request_timeout_ms: u64,

    /// watch 长轮询请求超时，单位：毫秒，需大于服务端挂起时间
    #[default = 90000]
    #[garde(range(min = 1))]
    pub watch_timeout_ms: u64,

    /// watch 失败后的等待时间，单位：毫秒，默认不等待
    #[garde(skip)]
    pub watch_error_backoff_ms: u64,
}

impl GconfConfig {
    /// 以默认配置创建指定应用的配置
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn watch_timeout(&self) -> Duration {
        Duration::from_millis(self.watch_timeout_ms)
    }

    pub fn watch_error_backoff(&self) -> Duration {
        Duration::from_millis(self.watch_error_backoff_ms)
    }

    /// 解析实例名
    ///
    /// k8s 中使用 HOSTNAME，虚拟机中使用 APP_INSTANCE_NAME
    pub fn resolve_instance_name(&self) -> String {
        if let Some(name) = self.instance_name.as_ref().filter(|n| !n.is_empty()) {
            return name.clone();
        }
        let in_k8s = std::env::var("KUBERNETES_SERVICE_HOST")
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        let env_key = if in_k8s { "HOSTNAME" } else { "APP_INSTANCE_NAME" };
        std::env::var(env_key)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// 生成客户端标识，服务端据此维护每个客户端的 watch 状态
    pub fn generate_client_id(&self) -> String {
        let nonce: i64 = rand::thread_rng().gen_range(0..i64::MAX);
        format!(
            "{}-->{}-->{}",
            self.app_id,
            self.resolve_instance_name(),
            nonce
        )
    }
}
