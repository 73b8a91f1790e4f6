//! 集成测试公用的内存配置中心

#![allow(dead_code)]

use crossbeam::channel::{unbounded, Receiver, Sender};
use gconf::{ConfigApp, ConfigEndpoint, GconfError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

pub struct MemoryEndpoint {
    configs: Mutex<HashMap<String, HashMap<String, String>>>,
    app_calls: AtomicUsize,
    last_watched: Mutex<Vec<String>>,
    changes_tx: Sender<Vec<String>>,
    changes_rx: Receiver<Vec<String>>,
}

impl MemoryEndpoint {
    pub fn new() -> Self {
        let (changes_tx, changes_rx) = unbounded();
        Self {
            configs: Mutex::new(HashMap::new()),
            app_calls: AtomicUsize::new(0),
            last_watched: Mutex::new(Vec::new()),
            changes_tx,
            changes_rx,
        }
    }

    pub fn set_configs(&self, app_id: &str, configs: &[(&str, &str)]) {
        let configs = configs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.configs
            .lock()
            .unwrap()
            .insert(app_id.to_string(), configs);
    }

    /// 修改配置并让 watch 返回该配置集合
    pub fn publish(&self, app_id: &str, configs: &[(&str, &str)]) {
        self.set_configs(app_id, configs);
        self.changes_tx.send(vec![app_id.to_string()]).unwrap();
    }

    pub fn app_calls(&self) -> usize {
        self.app_calls.load(Ordering::SeqCst)
    }

    pub fn last_watched(&self) -> Vec<String> {
        let mut ids = self.last_watched.lock().unwrap().clone();
        ids.sort();
        ids
    }
}

impl ConfigEndpoint for MemoryEndpoint {
    fn get_config_app(&self, app_id: &str) -> Result<ConfigApp, GconfError> {
        self.app_calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        if !self.configs.lock().unwrap().contains_key(app_id) {
            return Err(GconfError::Status {
                status: 404,
                url: app_id.to_string(),
            });
        }
        Ok(ConfigApp {
            app_id: app_id.to_string(),
            name: app_id.to_uppercase(),
        })
    }

    fn list_configs(&self, app_id: &str) -> Result<HashMap<String, String>, GconfError> {
        Ok(self
            .configs
            .lock()
            .unwrap()
            .get(app_id)
            .cloned()
            .unwrap_or_default())
    }

    fn watch(&self, app_ids: &[String], _client_id: &str) -> Result<Vec<String>, GconfError> {
        *self.last_watched.lock().unwrap() = app_ids.to_vec();
        Ok(self
            .changes_rx
            .recv_timeout(Duration::from_millis(20))
            .unwrap_or_default())
    }
}

/// 轮询等待条件成立
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
