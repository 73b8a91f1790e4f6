//! 配置中心访问模块
//!
//! 定义配置中心的访问接口，并提供基于 HTTP 的默认实现

pub mod endpoint;
pub mod http_client;

pub use endpoint::{ConfigApp, ConfigEndpoint};
pub use http_client::GconfHttpClient;
