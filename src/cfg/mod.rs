//! cfg 模块 - 客户端配置

pub mod config;

pub use config::{GconfConfig, DEFAULT_SERVER_URL};
