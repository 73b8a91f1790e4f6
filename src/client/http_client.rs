//! 基于 HTTP 的配置中心客户端

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use super::endpoint::{ConfigApp, ConfigEndpoint};
use crate::cfg::GconfConfig;
use crate::error::GconfError;

/// 基于 HTTP 的配置中心客户端
///
/// 接口约定：
/// - `GET /getConfigApp?configAppId=`
/// - `GET /listConfigKeys?configAppId=`
/// - `GET /getConfig?configAppId=&key=`
/// - `GET /listConfigs?configAppId=`
/// - `GET /watch?configAppIdList=a,b&clientId=`
///
/// # 示例
/// ```no_run
/// use gconf::cfg::GconfConfig;
/// use gconf::client::{ConfigEndpoint, GconfHttpClient};
///
/// let client = GconfHttpClient::new(&GconfConfig::new("userdoor")).unwrap();
/// let configs = client.list_configs("userdoor").unwrap();
/// ```
pub struct GconfHttpClient {
    base_url: String,
    watch_timeout: Duration,
    client: reqwest::blocking::Client,
}

impl GconfHttpClient {
    /// 创建 HTTP 客户端
    ///
    /// # 参数
    /// - `config`: 使用其中的 `server_url` 和超时配置
    pub fn new(config: &GconfConfig) -> Result<Self, GconfError> {
        Ok(Self {
            base_url: config.server_url.trim_end_matches('/').to_string(),
            watch_timeout: config.watch_timeout(),
            client: reqwest::blocking::Client::builder()
                .timeout(config.request_timeout())
                .build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 获取配置集合下的 key 列表
    pub fn list_config_keys(&self, app_id: &str) -> Result<Vec<String>, GconfError> {
        let content = self.get_content("/listConfigKeys", &[("configAppId", app_id)], None)?;
        parse_json(&content)
    }

    /// 获取单个配置项的原始内容
    pub fn get_config(&self, app_id: &str, key: &str) -> Result<String, GconfError> {
        self.get_content(
            "/getConfig",
            &[("configAppId", app_id), ("key", key)],
            None,
        )
    }

    fn get_content(
        &self,
        path: &str,
        params: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<String, GconfError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send()?;
        if resp.status() != reqwest::StatusCode::OK {
            return Err(GconfError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        Ok(resp.text()?)
    }
}

fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, GconfError> {
    Ok(serde_json::from_str(content)?)
}

impl ConfigEndpoint for GconfHttpClient {
    fn get_config_app(&self, app_id: &str) -> Result<ConfigApp, GconfError> {
        let content = self.get_content("/getConfigApp", &[("configAppId", app_id)], None)?;
        parse_json(&content)
    }

    fn list_configs(&self, app_id: &str) -> Result<HashMap<String, String>, GconfError> {
        let content = self.get_content("/listConfigs", &[("configAppId", app_id)], None)?;
        parse_json(&content)
    }

    fn watch(&self, app_ids: &[String], client_id: &str) -> Result<Vec<String>, GconfError> {
        let app_id_list = app_ids.join(",");
        let content = self.get_content(
            "/watch",
            &[("configAppIdList", app_id_list.as_str()), ("clientId", client_id)],
            Some(self.watch_timeout),
        )?;

        // 超时返回空内容，表示没有变化
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        parse_json(&content)
    }
}
