use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::value::Value;
use crate::client::ConfigEndpoint;

/// 配置变化监听器
///
/// 在后台同步线程中同步调用，实现中不要有阻塞操作，否则会延迟所有配置集合的更新。
/// 监听器 panic 会被捕获并记录日志。
///
/// - `old_value`: 旧的值
/// - `new_value`: 新的值，服务端删除 key 时为 ""
pub trait ConfigChangeListener: Send + Sync {
    fn value_changed(&self, key: &str, old_value: &str, new_value: &str);
}

impl<F> ConfigChangeListener for F
where
    F: Fn(&str, &str, &str) + Send + Sync,
{
    fn value_changed(&self, key: &str, old_value: &str, new_value: &str) {
        self(key, old_value, new_value)
    }
}

/// 配置集合
///
/// 对应一个应用的全部配置项。配置项只增不减：服务端删除的 key 会触发通知，
/// 但不会从集合中移除，其内容也保持删除前的值。
pub struct ConfigCollection {
    app_id: String,
    name: String,
    data: DashMap<String, Arc<Value>>,
    listeners: RwLock<HashMap<String, Vec<Arc<dyn ConfigChangeListener>>>>,
    endpoint: Arc<dyn ConfigEndpoint>,
    refresh_lock: Mutex<()>,
}

impl ConfigCollection {
    /// 创建空的配置集合，需调用 [`refresh`](Self::refresh) 加载数据
    pub fn new(
        app_id: impl Into<String>,
        name: impl Into<String>,
        endpoint: Arc<dyn ConfigEndpoint>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            name: name.into(),
            data: DashMap::new(),
            listeners: RwLock::new(HashMap::new()),
            endpoint,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获取 key 对应的配置项
    pub fn get_value(&self, key: &str) -> Option<Arc<Value>> {
        self.data.get(key).map(|v| v.value().clone())
    }

    /// 以 map 返回当前所有配置
    pub fn as_map(&self) -> HashMap<String, String> {
        self.snapshot()
            .into_iter()
            .map(|(k, v)| (k, v.raw()))
            .collect()
    }

    /// 为 key 添加监听器，同一 key 的多个监听器按注册顺序调用
    ///
    /// key 可以尚不存在；新增 key 不会触发通知，只有值变化才会触发。
    pub fn add_config_change_listener<L>(&self, key: &str, listener: L)
    where
        L: ConfigChangeListener + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// 从配置中心重新拉取全部配置并与缓存合并
    ///
    /// - 拉取失败或结果为空时不做任何修改
    /// - 值变化的 key 原地更新并通知
    /// - 服务端已删除的 key 以新值 "" 通知，但保留缓存内容
    /// - 新增的 key 加入缓存，不通知
    pub fn refresh(&self) {
        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let new_data = match self.endpoint.list_configs(&self.app_id) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("list configs failed, app_id: {}, error: {}", self.app_id, e);
                return;
            }
        };
        if new_data.is_empty() {
            return;
        }

        for (key, value) in self.snapshot() {
            match new_data.get(&key) {
                Some(new_raw) => {
                    if let Some(old) = value.refresh(new_raw) {
                        self.fire_value_changed(&key, &old, new_raw);
                    }
                }
                None => self.fire_value_changed(&key, &value.load(), ""),
            }
        }

        for (key, raw) in new_data {
            if !self.data.contains_key(&key) {
                let value = Arc::new(Value::new(key.as_str(), raw));
                self.data.insert(key, value);
            }
        }
    }

    // 先复制出引用再遍历，遍历期间不持有 map 的锁
    fn snapshot(&self) -> Vec<(String, Arc<Value>)> {
        self.data
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    fn fire_value_changed(&self, key: &str, old_value: &str, new_value: &str) {
        log::info!(
            "value changed, app_id: {}, key: {}, old_value: {}, new_value: {}",
            self.app_id,
            key,
            old_value,
            new_value
        );

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default();
        // 单个监听器 panic 不影响其他监听器和本次合并
        for listener in listeners {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                listener.value_changed(key, old_value, new_value)
            }));
            if result.is_err() {
                log::error!(
                    "listener panicked, app_id: {}, key: {}",
                    self.app_id,
                    key
                );
            }
        }
    }
}

impl fmt::Debug for ConfigCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCollection")
            .field("app_id", &self.app_id)
            .field("name", &self.name)
            .field("keys", &self.data.len())
            .finish()
    }
}
