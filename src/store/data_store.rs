use crossbeam::channel::{self, Receiver, RecvTimeoutError, TryRecvError};
use dashmap::DashMap;
use garde::Validate;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::collection::ConfigCollection;
use crate::cfg::GconfConfig;
use crate::client::{ConfigEndpoint, GconfHttpClient};
use crate::crypto::{rsa_public_decrypt, PUBLIC_KEY};
use crate::error::GconfError;

/// 框架统一配置所在的配置集合
pub const GLOBAL_APP_ID: &str = "golang";

/// 后台任务与 `DataStore` 共享的状态
struct StoreShared {
    cache: DashMap<String, Arc<ConfigCollection>>,
    endpoint: Arc<dyn ConfigEndpoint>,
    client_id: String,
    // 只保护首次创建配置集合的过程，读缓存不加锁
    create_lock: Mutex<()>,
}

/// 后台 watch 任务句柄，drop 时发送停止信号并等待线程退出
struct WatchHandle {
    stop_sender: Option<channel::Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.send(());
        }

        if let Some(handle) = self.thread_handle.take() {
            // 在后台线程内部 drop 时不能等待自己
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

/// 配置同步存储
///
/// 缓存本进程访问过的所有配置集合，并在后台线程中通过长轮询监听变化：
/// - 首次访问某个配置集合时同步拉取，之后的读取直接命中缓存
/// - 后台线程对所有已缓存的配置集合发起 watch，对返回的配置集合执行刷新
/// - 同一个配置集合在整个生命周期内只会创建一次
///
/// # 示例
/// ```no_run
/// use gconf::cfg::GconfConfig;
/// use gconf::store::DataStore;
///
/// let store = DataStore::new(GconfConfig::new("userdoor")).unwrap();
/// if let Some(collection) = store.get_current_config_collection() {
///     println!("{:?}", collection.as_map());
/// }
/// store.shutdown();
/// ```
pub struct DataStore {
    app_id: String,
    shared: Arc<StoreShared>,
    watcher: Mutex<Option<WatchHandle>>,
}

impl DataStore {
    /// 使用 HTTP 客户端创建存储并启动后台任务
    pub fn new(config: GconfConfig) -> Result<Self, GconfError> {
        let client = GconfHttpClient::new(&config)?;
        Self::with_endpoint(config, Arc::new(client))
    }

    /// 使用指定的配置中心访问实现创建存储并启动后台任务
    pub fn with_endpoint(
        config: GconfConfig,
        endpoint: Arc<dyn ConfigEndpoint>,
    ) -> Result<Self, GconfError> {
        config.validate()?;

        let shared = Arc::new(StoreShared {
            cache: DashMap::new(),
            endpoint,
            client_id: config.generate_client_id(),
            create_lock: Mutex::new(()),
        });

        let (stop_tx, stop_rx) = channel::unbounded();
        let loop_shared = shared.clone();
        let idle_interval = config.idle_interval();
        let error_backoff = config.watch_error_backoff();
        let thread_handle = thread::spawn(move || {
            run_watch_loop(loop_shared, stop_rx, idle_interval, error_backoff);
        });

        log::info!(
            "gconf store started, app_id: {}, client_id: {}",
            config.app_id,
            shared.client_id
        );

        Ok(Self {
            app_id: config.app_id,
            shared,
            watcher: Mutex::new(Some(WatchHandle {
                stop_sender: Some(stop_tx),
                thread_handle: Some(thread_handle),
            })),
        })
    }

    /// 当前应用 ID
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// 发给配置中心的客户端标识
    pub fn client_id(&self) -> &str {
        &self.shared.client_id
    }

    /// 当前已缓存的配置集合 ID
    pub fn app_ids(&self) -> Vec<String> {
        self.shared.cache.iter().map(|e| e.key().clone()).collect()
    }

    /// 获取某个应用的配置集合
    ///
    /// 配置集合不存在或配置中心不可用时返回 None，且不缓存，下次调用会重试。
    pub fn get_config_collection(&self, app_id: &str) -> Option<Arc<ConfigCollection>> {
        if let Some(collection) = self.shared.cache.get(app_id) {
            return Some(collection.value().clone());
        }

        let _guard = self
            .shared
            .create_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // double check
        if let Some(collection) = self.shared.cache.get(app_id) {
            return Some(collection.value().clone());
        }

        let config_app = match self.shared.endpoint.get_config_app(app_id) {
            Ok(app) => app,
            Err(e) => {
                log::warn!("get config app failed, app_id: {}, error: {}", app_id, e);
                return None;
            }
        };

        let collection = Arc::new(ConfigCollection::new(
            app_id,
            config_app.name,
            self.shared.endpoint.clone(),
        ));
        collection.refresh();
        self.shared
            .cache
            .insert(app_id.to_string(), collection.clone());
        log::info!(
            "config collection loaded, app_id: {}, keys: {}",
            app_id,
            collection.len()
        );
        Some(collection)
    }

    /// 获取当前应用的配置集合
    pub fn get_current_config_collection(&self) -> Option<Arc<ConfigCollection>> {
        self.get_config_collection(&self.app_id)
    }

    /// 获取框架统一配置的配置集合，应用一般不需要调用
    pub fn get_global_config_collection(&self) -> Option<Arc<ConfigCollection>> {
        self.get_config_collection(GLOBAL_APP_ID)
    }

    /// 使用框架统一配置中的公钥解密敏感配置
    ///
    /// 密文为空、公钥不存在或解密失败时返回空字符串
    pub fn decrypt(&self, encrypted: &str) -> String {
        if encrypted.is_empty() {
            return String::new();
        }
        let Some(public_key) = self
            .get_global_config_collection()
            .and_then(|c| c.get_value(PUBLIC_KEY))
        else {
            log::warn!("decrypt failed, {} not found in {}", PUBLIC_KEY, GLOBAL_APP_ID);
            return String::new();
        };

        rsa_public_decrypt(&public_key.load(), encrypted).unwrap_or_else(|e| {
            log::warn!("decrypt failed, error: {}", e);
            String::new()
        })
    }

    /// 停止后台任务
    ///
    /// 会等待正在进行的 watch 请求返回，重复调用无副作用。
    /// 停止后缓存仍可读取，但不会再更新。
    pub fn shutdown(&self) {
        let handle = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(handle);
    }
}

fn should_stop(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

// 返回 true 表示等待期间收到了停止信号
fn wait_or_stop(stop_rx: &Receiver<()>, timeout: Duration) -> bool {
    !matches!(stop_rx.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
}

fn run_watch_loop(
    shared: Arc<StoreShared>,
    stop_rx: Receiver<()>,
    idle_interval: Duration,
    error_backoff: Duration,
) {
    log::info!("gconf watch loop started");

    while !should_stop(&stop_rx) {
        if shared.cache.is_empty() {
            if wait_or_stop(&stop_rx, idle_interval) {
                break;
            }
            continue;
        }

        // 快照之后新加入的配置集合在下一轮监听
        let app_ids: Vec<String> = shared.cache.iter().map(|e| e.key().clone()).collect();
        let changed = match shared.endpoint.watch(&app_ids, &shared.client_id) {
            Ok(changed) => changed,
            Err(e) => {
                log::warn!("watch failed, app_ids: {:?}, error: {}", app_ids, e);
                if !error_backoff.is_zero() && wait_or_stop(&stop_rx, error_backoff) {
                    break;
                }
                continue;
            }
        };

        for app_id in changed {
            let Some(collection) = shared.cache.get(&app_id).map(|e| e.value().clone()) else {
                log::debug!("watch returned unknown app_id: {}", app_id);
                continue;
            };
            // 刷新过程中的 panic 不能终止后台任务
            if panic::catch_unwind(AssertUnwindSafe(|| collection.refresh())).is_err() {
                log::error!("refresh panicked, app_id: {}", app_id);
            }
        }
    }

    log::info!("gconf watch loop stopped");
}
