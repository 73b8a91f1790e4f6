//! 配置中心访问接口

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::GconfError;

/// 配置集合的元信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigApp {
    /// 配置集合 ID
    #[serde(rename = "configCollectionId")]
    pub app_id: String,
    /// 展示名，仅用于展示
    #[serde(default)]
    pub name: String,
}

/// 配置中心访问接口
///
/// 所有方法都是同步阻塞调用，其中 `watch` 为长轮询，
/// 会在服务端挂起直到有配置集合变化或超时。
///
/// 调用失败时返回错误，由调用方决定如何降级。
pub trait ConfigEndpoint: Send + Sync {
    /// 获取配置集合元信息
    fn get_config_app(&self, app_id: &str) -> Result<ConfigApp, GconfError>;

    /// 获取配置集合下的全部配置
    fn list_configs(&self, app_id: &str) -> Result<HashMap<String, String>, GconfError>;

    /// 监听配置集合列表，返回发生变化的配置集合 ID
    ///
    /// # 参数
    /// - `app_ids`: 需要监听的配置集合 ID
    /// - `client_id`: 客户端标识，服务端据此维护监听状态
    fn watch(&self, app_ids: &[String], client_id: &str) -> Result<Vec<String>, GconfError>;
}
