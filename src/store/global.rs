//! 全局配置存储单例
//!
//! 进程启动时调用一次 `init`，之后通过全局函数获取配置集合

use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::collection::ConfigCollection;
use super::data_store::DataStore;
use crate::cfg::GconfConfig;
use crate::client::ConfigEndpoint;
use crate::error::GconfError;

/// 全局配置存储单例，进程生命周期内存在
static GLOBAL_STORE: OnceCell<DataStore> = OnceCell::new();

/// 以默认配置初始化全局存储，请在程序启动处调用
///
/// # 错误
/// - 环境变量 `APP_NAME` 存在且与 `app_name` 不一致
/// - 已经以其他应用名初始化过
///
/// 以相同应用名重复调用会返回已有的存储
///
/// # 示例
/// ```no_run
/// gconf::init("userdoor").unwrap();
///
/// let collection = gconf::get_current_config_collection().unwrap();
/// println!("{:?}", collection.as_map());
/// ```
pub fn init(app_name: &str) -> Result<&'static DataStore, GconfError> {
    init_with_config(GconfConfig::new(app_name))
}

/// 以指定配置初始化全局存储
pub fn init_with_config(config: GconfConfig) -> Result<&'static DataStore, GconfError> {
    check_env_app_name(&config.app_id)?;
    let app_id = config.app_id.clone();
    let store = GLOBAL_STORE.get_or_try_init(|| DataStore::new(config))?;
    ensure_same_app(store, &app_id)
}

/// 以指定的配置中心访问实现初始化全局存储
pub fn init_with_endpoint(
    config: GconfConfig,
    endpoint: Arc<dyn ConfigEndpoint>,
) -> Result<&'static DataStore, GconfError> {
    check_env_app_name(&config.app_id)?;
    let app_id = config.app_id.clone();
    let store = GLOBAL_STORE.get_or_try_init(|| DataStore::with_endpoint(config, endpoint))?;
    ensure_same_app(store, &app_id)
}

/// 获取全局存储
pub fn store() -> Result<&'static DataStore, GconfError> {
    GLOBAL_STORE.get().ok_or(GconfError::NotInitialized)
}

/// 获取某个应用的配置集合（使用全局单例）
///
/// 未初始化时返回 None 并记录错误日志
pub fn get_config_collection(app_id: &str) -> Option<Arc<ConfigCollection>> {
    with_store(|s| s.get_config_collection(app_id))
}

/// 获取当前应用的配置集合（使用全局单例）
pub fn get_current_config_collection() -> Option<Arc<ConfigCollection>> {
    with_store(DataStore::get_current_config_collection)
}

/// 获取框架统一配置的配置集合（使用全局单例），应用一般不需要调用
pub fn get_global_config_collection() -> Option<Arc<ConfigCollection>> {
    with_store(DataStore::get_global_config_collection)
}

/// 使用框架统一配置中的公钥解密敏感配置（使用全局单例）
///
/// 未初始化或解密失败时返回空字符串
///
/// # 示例
/// ```no_run
/// gconf::init("userdoor").unwrap();
/// let password = gconf::decrypt("w3bWtatR...");
/// ```
pub fn decrypt(encrypted: &str) -> String {
    match store() {
        Ok(s) => s.decrypt(encrypted),
        Err(e) => {
            log::error!("{}", e);
            String::new()
        }
    }
}

fn with_store<F>(f: F) -> Option<Arc<ConfigCollection>>
where
    F: FnOnce(&DataStore) -> Option<Arc<ConfigCollection>>,
{
    match store() {
        Ok(s) => f(s),
        Err(e) => {
            log::error!("{}", e);
            None
        }
    }
}

fn check_env_app_name(app_name: &str) -> Result<(), GconfError> {
    match std::env::var("APP_NAME") {
        Ok(env_app_name) if !env_app_name.is_empty() && env_app_name != app_name => {
            Err(GconfError::AppNameMismatch {
                app_name: app_name.to_string(),
                env_app_name,
            })
        }
        _ => Ok(()),
    }
}

fn ensure_same_app(store: &'static DataStore, app_id: &str) -> Result<&'static DataStore, GconfError> {
    if store.app_id() != app_id {
        return Err(GconfError::AlreadyInitialized {
            current: store.app_id().to_string(),
            requested: app_id.to_string(),
        });
    }
    Ok(store)
}
