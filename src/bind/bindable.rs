use serde::de::DeserializeOwned;

use super::parse_value::BindError;
use super::properties::Properties;

/// 可绑定字段的描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindField {
    /// 字段名
    pub name: &'static str,
    /// 显式指定的配置 key，对应 `#[config("key")]`
    pub key: Option<&'static str>,
}

/// 可绑定 properties 配置的结构体
///
/// 通常通过 `#[derive(Bindable)]` 自动实现，替代运行时反射：
/// 编译期生成字段列表，以及按字段名设置值的方法。
///
/// # 示例
/// ```
/// use gconf::bind::{bind_properties, Bindable};
///
/// #[derive(Debug, Default, Bindable)]
/// struct Impower {
///     #[config("path")]
///     path: String,
///     #[config("period")]
///     period: i32,
///     has_x: bool,
/// }
///
/// let mut imp = Impower::default();
/// bind_properties(&mut imp, "path=/tmp/impower\nperiod=30\nhas_x=true");
/// assert_eq!(imp.path, "/tmp/impower");
/// assert_eq!(imp.period, 30);
/// assert!(imp.has_x);
/// ```
pub trait Bindable {
    /// 所有参与绑定的字段
    fn bind_fields() -> &'static [BindField];

    /// 将字符串转换为字段类型后赋值
    ///
    /// 转换失败时返回错误，字段保持原值
    fn set_field(&mut self, name: &str, raw: &str) -> Result<(), BindError>;
}

/// 将 properties 文本绑定到目标结构体
///
/// 每个字段独立匹配和转换，未匹配、值为空或转换失败的字段保持原值，
/// 不影响其他字段。返回成功赋值的字段数。
pub fn bind_properties<T: Bindable>(target: &mut T, content: &str) -> usize {
    let props = Properties::parse(content);
    if props.is_empty() {
        return 0;
    }

    let mut applied = 0;
    for field in T::bind_fields() {
        let matched = match field.key {
            Some(key) => props.find_by_hint(key),
            None => props.find_by_field_name(field.name),
        };
        let Some(raw) = matched.filter(|v| !v.is_empty()) else {
            continue;
        };

        match target.set_field(field.name, raw) {
            Ok(()) => applied += 1,
            Err(e) => log::debug!("skip field {}: {}", field.name, e),
        }
    }
    applied
}

/// 将 JSON 文本反序列化后整体替换目标
///
/// 解析失败时目标保持不变
pub fn bind_json<T: DeserializeOwned>(target: &mut T, content: &str) -> Result<(), serde_json::Error> {
    *target = serde_json::from_str(content)?;
    Ok(())
}
