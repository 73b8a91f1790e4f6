//! 测试用的内存配置中心

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::client::{ConfigApp, ConfigEndpoint};
use crate::error::GconfError;

pub(crate) struct FakeEndpoint {
    configs: Mutex<HashMap<String, HashMap<String, String>>>,
    fail_list: AtomicBool,
    fail_watch: AtomicBool,
    app_calls: AtomicUsize,
    watch_calls: AtomicUsize,
    changes_tx: Sender<Vec<String>>,
    changes_rx: Receiver<Vec<String>>,
}

impl FakeEndpoint {
    pub(crate) fn new() -> Self {
        let (changes_tx, changes_rx) = unbounded();
        Self {
            configs: Mutex::new(HashMap::new()),
            fail_list: AtomicBool::new(false),
            fail_watch: AtomicBool::new(false),
            app_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
            changes_tx,
            changes_rx,
        }
    }

    /// 设置配置集合的全部内容，同时使该配置集合可被解析
    pub(crate) fn set_configs(&self, app_id: &str, configs: &[(&str, &str)]) {
        let configs = configs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.configs
            .lock()
            .unwrap()
            .insert(app_id.to_string(), configs);
    }

    /// 让下一次 watch 返回指定的配置集合
    pub(crate) fn notify(&self, app_ids: &[&str]) {
        let _ = self
            .changes_tx
            .send(app_ids.iter().map(|s| s.to_string()).collect());
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_watch(&self, fail: bool) {
        self.fail_watch.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn app_calls(&self) -> usize {
        self.app_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn watch_calls(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }
}

impl ConfigEndpoint for FakeEndpoint {
    fn get_config_app(&self, app_id: &str) -> Result<ConfigApp, GconfError> {
        self.app_calls.fetch_add(1, Ordering::SeqCst);
        // 拉长创建过程，放大并发首次访问的竞争窗口
        thread::sleep(Duration::from_millis(20));

        if !self.configs.lock().unwrap().contains_key(app_id) {
            return Err(GconfError::Status {
                status: 404,
                url: format!("/getConfigApp?configAppId={}", app_id),
            });
        }
        Ok(ConfigApp {
            app_id: app_id.to_string(),
            name: format!("{}-name", app_id),
        })
    }

    fn list_configs(&self, app_id: &str) -> Result<HashMap<String, String>, GconfError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(GconfError::Transport("connection refused".to_string()));
        }
        Ok(self
            .configs
            .lock()
            .unwrap()
            .get(app_id)
            .cloned()
            .unwrap_or_default())
    }

    fn watch(&self, _app_ids: &[String], _client_id: &str) -> Result<Vec<String>, GconfError> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_watch.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
            return Err(GconfError::Transport("connection refused".to_string()));
        }
        match self.changes_rx.recv_timeout(Duration::from_millis(20)) {
            Ok(changed) => Ok(changed),
            Err(_) => Ok(Vec::new()),
        }
    }
}
