use arc_swap::ArcSwap;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::bind::{bind_json, bind_properties, Bindable, Properties};
use crate::error::GconfError;

/// 配置内容格式，由 key 的后缀决定，创建后不再变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    /// 原始文本
    Text,
    /// `.properties` 结尾，`key=value` 行格式
    Properties,
    /// `.json` 结尾
    Json,
}

impl ValueFormat {
    pub fn from_key(key: &str) -> Self {
        if key.ends_with(".properties") {
            ValueFormat::Properties
        } else if key.ends_with(".json") {
            ValueFormat::Json
        } else {
            ValueFormat::Text
        }
    }
}

type ApplyFn = dyn Fn(&str) -> Result<(), GconfError> + Send + Sync;

/// 已绑定的目标对象及其更新函数
struct Binding {
    apply: Box<ApplyFn>,
    // 串行化注册线程和后台刷新线程的应用过程
    lock: Mutex<()>,
}

/// 单个配置项
///
/// 同一个 key 的 `Value` 在进程生命周期内只创建一次，刷新时原地替换内容，
/// 持有 `Arc<Value>` 的代码无需重新获取即可读到最新内容。
pub struct Value {
    key: String,
    format: ValueFormat,
    raw: ArcSwap<String>,
    binding: OnceCell<Binding>,
}

impl Value {
    pub(crate) fn new(key: impl Into<String>, raw: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            format: ValueFormat::from_key(&key),
            key,
            raw: ArcSwap::from_pointee(raw.into()),
            binding: OnceCell::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn format(&self) -> ValueFormat {
        self.format
    }

    /// 当前内容的拷贝
    pub fn raw(&self) -> String {
        self.raw.load().as_ref().clone()
    }

    /// 当前内容的共享快照，不拷贝字符串
    pub fn load(&self) -> Arc<String> {
        self.raw.load_full()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.get().is_some()
    }

    /// 以 properties 格式解析当前内容
    pub fn as_properties(&self) -> Result<HashMap<String, String>, GconfError> {
        self.ensure_format(ValueFormat::Properties)?;
        Ok(Properties::parse(&self.load()).into_map())
    }

    /// 以 JSON 格式解析当前内容
    pub fn as_json(&self) -> Result<serde_json::Value, GconfError> {
        self.ensure_format(ValueFormat::Json)?;
        Ok(serde_json::from_str(&self.load())?)
    }

    /// 绑定一个 JSON 目标对象，之后每次配置变化都会自动反序列化并整体替换该对象
    ///
    /// 每个配置项只能绑定一次，且配置项须为 JSON 格式。
    /// 绑定后立即用当前内容更新一次目标，解析失败时返回错误，
    /// 但绑定仍然保留，后续内容修正后会自动生效。
    ///
    /// # 示例
    /// ```no_run
    /// use serde::Deserialize;
    /// use std::sync::{Arc, RwLock};
    ///
    /// #[derive(Debug, Default, Deserialize)]
    /// struct Es {
    ///     hosts: Vec<String>,
    ///     port: u16,
    /// }
    ///
    /// gconf::init("userdoor").unwrap();
    /// let es = Arc::new(RwLock::new(Es::default()));
    /// if let Some(value) = gconf::get_config_collection("impower")
    ///     .and_then(|c| c.get_value("es.json"))
    /// {
    ///     value.register_json(es.clone()).unwrap();
    /// }
    /// ```
    pub fn register_json<T>(&self, target: Arc<RwLock<T>>) -> Result<(), GconfError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.register_with(
            ValueFormat::Json,
            Box::new(move |raw: &str| {
                let mut guard = target.write().unwrap_or_else(PoisonError::into_inner);
                bind_json(&mut *guard, raw)?;
                Ok(())
            }),
        )
    }

    /// 绑定一个 properties 目标对象，之后每次配置变化都会自动更新匹配到的字段
    ///
    /// 每个配置项只能绑定一次，且配置项须为 properties 格式。
    /// 字段转换失败时保持原值，不返回错误。
    ///
    /// # 示例
    /// ```no_run
    /// use gconf::bind::Bindable;
    /// use std::sync::{Arc, RwLock};
    ///
    /// #[derive(Debug, Default, Bindable)]
    /// struct Impower {
    ///     #[config("path")]
    ///     path: String,
    ///     #[config("period")]
    ///     period: i32,
    /// }
    ///
    /// gconf::init("userdoor").unwrap();
    /// let imp = Arc::new(RwLock::new(Impower::default()));
    /// if let Some(value) = gconf::get_config_collection("impower")
    ///     .and_then(|c| c.get_value("deny.properties"))
    /// {
    ///     value.register_properties(imp.clone()).unwrap();
    /// }
    /// ```
    pub fn register_properties<T>(&self, target: Arc<RwLock<T>>) -> Result<(), GconfError>
    where
        T: Bindable + Send + Sync + 'static,
    {
        self.register_with(
            ValueFormat::Properties,
            Box::new(move |raw: &str| {
                let mut guard = target.write().unwrap_or_else(PoisonError::into_inner);
                bind_properties(&mut *guard, raw);
                Ok(())
            }),
        )
    }

    fn register_with(&self, expected: ValueFormat, apply: Box<ApplyFn>) -> Result<(), GconfError> {
        if self.is_bound() {
            return Err(GconfError::AlreadyBound {
                key: self.key.clone(),
            });
        }
        self.ensure_format(expected)?;

        let binding = self
            .binding
            .try_insert(Binding {
                apply,
                lock: Mutex::new(()),
            })
            .map_err(|_| GconfError::AlreadyBound {
                key: self.key.clone(),
            })?;

        self.apply_binding(binding)
    }

    /// 替换内容，内容未变化时返回 None，否则返回旧内容
    ///
    /// 已绑定的对象在返回前完成更新，更新失败只记录日志
    pub(crate) fn refresh(&self, new_raw: &str) -> Option<Arc<String>> {
        if self.raw.load().as_str() == new_raw {
            return None;
        }
        let old = self.raw.swap(Arc::new(new_raw.to_string()));

        if let Some(binding) = self.binding.get() {
            if let Err(e) = self.apply_binding(binding) {
                log::error!("apply binding failed, key: {}, error: {}", self.key, e);
            }
        }
        Some(old)
    }

    // 总是应用加锁时刻的最新内容，避免较旧的内容覆盖较新的内容
    fn apply_binding(&self, binding: &Binding) -> Result<(), GconfError> {
        let _guard = binding.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let raw = self.raw.load_full();
        (binding.apply)(raw.as_str())
    }

    fn ensure_format(&self, expected: ValueFormat) -> Result<(), GconfError> {
        if self.format != expected {
            return Err(GconfError::UnsupportedFormat {
                key: self.key.clone(),
                format: self.format,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("key", &self.key)
            .field("format", &self.format)
            .field("raw", &self.load())
            .field("bound", &self.is_bound())
            .finish()
    }
}
