use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gconf::bind::{bind_json, bind_properties, Bindable, Properties};
use gconf::{ConfigApp, ConfigCollection, ConfigEndpoint, GconfError};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, Bindable)]
struct Impower {
    #[config("path")]
    path: String,
    #[config("cmd")]
    cmd: String,
    #[config("period")]
    period: i32,
    has_x: bool,
    timeout_ms: Option<u64>,
}

// ========== 辅助函数 ==========

fn generate_properties(lines: usize) -> String {
    let mut content = String::from("# impower\npath=/tmp/impower\ncmd=date\nperiod=30\nhas_x=true\n");
    for i in 0..lines {
        content.push_str(&format!("extra_{:06}=value_{:06}\n", i, i));
    }
    content.push_str("TimeoutMs=1500\n");
    content
}

struct StaticEndpoint {
    configs: HashMap<String, String>,
}

impl ConfigEndpoint for StaticEndpoint {
    fn get_config_app(&self, app_id: &str) -> Result<ConfigApp, GconfError> {
        Ok(ConfigApp {
            app_id: app_id.to_string(),
            name: app_id.to_string(),
        })
    }

    fn list_configs(&self, _app_id: &str) -> Result<HashMap<String, String>, GconfError> {
        Ok(self.configs.clone())
    }

    fn watch(&self, _app_ids: &[String], _client_id: &str) -> Result<Vec<String>, GconfError> {
        Ok(Vec::new())
    }
}

// ========== 1. properties 解析 ==========

fn benchmark_properties_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("properties_parse");

    for lines in [10, 100, 1000] {
        let content = generate_properties(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &content, |b, content| {
            b.iter(|| black_box(Properties::parse(content)))
        });
    }

    group.finish();
}

// ========== 2. properties 绑定 ==========

fn benchmark_bind_properties(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind_properties");

    for lines in [10, 100, 1000] {
        let content = generate_properties(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &content, |b, content| {
            b.iter(|| {
                let mut imp = Impower::default();
                black_box(bind_properties(&mut imp, content));
                imp
            })
        });
    }

    group.finish();
}

// ========== 3. JSON 绑定 ==========

fn benchmark_bind_json(c: &mut Criterion) {
    let content = r#"{"path":"/tmp/impower","cmd":"date","period":30,"has_x":true,"timeout_ms":1500}"#;
    c.bench_function("bind_json", |b| {
        b.iter(|| {
            let mut imp = Impower::default();
            black_box(bind_json(&mut imp, content).is_ok());
            imp
        })
    });
}

// ========== 4. 缓存读取 ==========

fn benchmark_collection_read(c: &mut Criterion) {
    let configs: HashMap<String, String> = (0..1000)
        .map(|i| (format!("key_{:06}", i), format!("value_{:06}", i)))
        .collect();
    let collection = ConfigCollection::new(
        "impower",
        "impower",
        Arc::new(StaticEndpoint { configs }),
    );
    collection.refresh();

    c.bench_function("collection_get_value", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 1000;
            let key = format!("key_{:06}", i);
            black_box(collection.get_value(&key).map(|v| v.load()))
        })
    });
}

criterion_group!(
    benches,
    benchmark_properties_parse,
    benchmark_bind_properties,
    benchmark_bind_json,
    benchmark_collection_read
);
criterion_main!(benches);
