use thiserror::Error;

/// 绑定相关错误
#[derive(Error, Debug, PartialEq)]
pub enum BindError {
    #[error("parse failed: {0}")]
    ParseFailed(String),

    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// 从字符串解析字段值的 trait
///
/// properties 绑定时，每个匹配到的字段通过该 trait 完成类型转换。
pub trait ParseValue: Sized {
    /// 从字符串解析值
    ///
    /// # 返回
    /// - Ok(T): 解析成功
    /// - Err(BindError): 解析失败，调用方保留字段原值
    fn parse_value(s: &str) -> Result<Self, BindError>;
}

impl ParseValue for String {
    fn parse_value(s: &str) -> Result<Self, BindError> {
        Ok(s.to_string())
    }
}

macro_rules! impl_parse_value_numeric {
    ($($ty:ty),*) => {
        $(
            impl ParseValue for $ty {
                fn parse_value(s: &str) -> Result<Self, BindError> {
                    s.parse().map_err(|e| BindError::ParseFailed(
                        format!("failed to parse {} from '{}': {}", stringify!($ty), s, e)
                    ))
                }
            }
        )*
    };
}

impl_parse_value_numeric!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char
);

// 兼容 1/0、t/f、true/false 的各种大小写写法
impl ParseValue for bool {
    fn parse_value(s: &str) -> Result<Self, BindError> {
        match s {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(BindError::ParseFailed(format!(
                "failed to parse bool from '{}'",
                s
            ))),
        }
    }
}

impl<T: ParseValue> ParseValue for Option<T> {
    fn parse_value(s: &str) -> Result<Self, BindError> {
        T::parse_value(s).map(Some)
    }
}
