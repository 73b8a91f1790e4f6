//! properties 格式解析
//!
//! 每行一个 `key=value`，以 `#` 或 `!` 开头的行为注释

use std::collections::HashMap;

/// 解析后的 properties，保留 key 在文本中首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, String)>,
    // key -> entries 下标
    index: HashMap<String, usize>,
}

impl Properties {
    /// 解析 properties 文本
    ///
    /// - 空行、注释行、不含 `=` 的行被跳过
    /// - 按第一个 `=` 切分，key 和 value 去除首尾空白
    /// - 重复的 key 以最后一次出现的值为准
    pub fn parse(content: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match index.get(key) {
                Some(&i) => entries[i].1 = value.to_string(),
                None => {
                    index.insert(key.to_string(), entries.len());
                    entries.push((key.to_string(), value.to_string()));
                }
            }
        }

        Self { entries, index }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 按显式指定的 key 查找：优先精确匹配，再按文本顺序忽略大小写匹配
    pub fn find_by_hint(&self, hint: &str) -> Option<&str> {
        self.get(hint).or_else(|| {
            self.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(hint))
                .map(|(_, v)| v)
        })
    }

    /// 按字段名查找：两侧去掉下划线后忽略大小写比较，兼容驼峰和下划线命名
    pub fn find_by_field_name(&self, field_name: &str) -> Option<&str> {
        let normalized = normalize_name(field_name);
        self.iter()
            .find(|(k, _)| normalize_name(k) == normalized)
            .map(|(_, v)| v)
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.entries.into_iter().collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim_start_matches("r#")
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
