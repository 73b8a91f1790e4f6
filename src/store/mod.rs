//! store 模块 - 配置同步存储
//!
//! 缓存配置集合，后台长轮询同步，配置变化时通知监听器

pub mod collection;
pub mod data_store;
pub mod global;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{ConfigChangeListener, ConfigCollection};
pub use data_store::{DataStore, GLOBAL_APP_ID};
pub use global::{
    decrypt, get_config_collection, get_current_config_collection, get_global_config_collection, init,
    init_with_config, init_with_endpoint, store,
};
pub use value::{Value, ValueFormat};
