//! gconf - 配置中心客户端
//!
//! 在进程内维护配置集合的本地缓存，通过长轮询与配置中心保持同步，
//! 配置变化时通知监听器，并支持将配置直接绑定到结构体上。
//!
//! ## 模块
//!
//! - **cfg**: 客户端配置
//! - **client**: 配置中心访问接口及 HTTP 实现
//! - **bind**: JSON / properties 配置到结构体的绑定
//! - **store**: 配置集合缓存与后台同步
//! - **crypto**: 敏感配置解密
//!
//! ## 使用
//!
//! ```no_run
//! gconf::init("userdoor").unwrap();
//!
//! let collection = gconf::get_config_collection("impower").unwrap();
//! let timeout = collection.get_value("timeout").map(|v| v.raw());
//!
//! collection.add_config_change_listener("timeout", |key: &str, old: &str, new: &str| {
//!     println!("{} changed: {} -> {}", key, old, new);
//! });
//! ```

// 派生宏生成的代码使用 ::gconf 路径，crate 内部也需要能解析
extern crate self as gconf;

pub mod bind;
pub mod cfg;
pub mod client;
pub mod crypto;
pub mod error;
pub mod store;

pub use bind::{Bindable, ParseValue};
pub use cfg::GconfConfig;
pub use client::{ConfigApp, ConfigEndpoint, GconfHttpClient};
pub use error::GconfError;
pub use store::{
    decrypt, get_config_collection, get_current_config_collection, get_global_config_collection, init,
    init_with_config, init_with_endpoint, ConfigChangeListener, ConfigCollection, DataStore,
    Value, ValueFormat,
};
