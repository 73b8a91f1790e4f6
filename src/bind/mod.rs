//! bind 模块 - 配置绑定
//!
//! 将 JSON 或 properties 格式的配置内容投射到调用方的结构体上

pub mod bindable;
pub mod parse_value;
pub mod properties;

pub use bindable::{bind_json, bind_properties, BindField, Bindable};
pub use parse_value::{BindError, ParseValue};
pub use properties::Properties;

// 派生宏与 trait 同名，分属不同命名空间
pub use gconf_macros::Bindable;
