//! 后端地址配置与本地键值存储
//!
//! 客户端支持多后端切换：base URL、websocket、accounts、teams 等地址
//! 都是运行期可替换的，并按用户 ID 持久化到键值存储中。
//! 键值存储本身是宿主提供的协作接口，这里只给出内存实现用于测试和 CLI。

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

/// 本地存储通用键名（token、cookie 等全局项）
pub mod sp_key {
    pub const USER_ID: &str = "userId";
    pub const TOKEN: &str = "token";
    pub const TOKEN_TYPE: &str = "token_type";
    pub const COOKIES: &str = "cookies";
}

const KEY_BASE_URL: &str = "BaseUrl_";
const KEY_WEBSOCKET_URL: &str = "WebsocketUrl_";
const KEY_TEAMS_URL: &str = "TeamsUrl_";
const KEY_ACCOUNTS_URL: &str = "AccountsUrl_";
const KEY_WEBSITE_URL: &str = "WebsiteUrl_";
const KEY_SIGN_IN_URL: &str = "SignInUrl_";

/// 持久化键值存储协作接口（宿主负责落盘）
pub trait KvStore: Send + Sync {
    /// 读取字符串，键不存在时返回 None
    fn get_string(&self, key: &str) -> Option<String>;

    /// 写入字符串
    fn put_string(&self, key: &str, val: &str);

    /// 删除键
    fn remove(&self, key: &str);
}

/// 进程内内存实现（测试与 CLI 使用）
#[derive(Default)]
pub struct MemoryKvStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.map.lock().expect("kv store 锁中毒").get(key).cloned()
    }

    fn put_string(&self, key: &str, val: &str) {
        self.map
            .lock()
            .expect("kv store 锁中毒")
            .insert(key.to_string(), val.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.lock().expect("kv store 锁中毒").remove(key);
    }
}

/// 服务器下发的后端端点集合
#[derive(Debug, Clone, Default)]
pub struct BackendEndpoints {
    pub backend_url: String,
    pub backend_ws_url: String,
    pub teams_url: String,
    pub accounts_url: String,
    pub website_url: String,
    pub sign_in_url: String,
}

/// 当前生效的后端地址配置
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// 配置所属的用户 ID（持久化键按它区分）
    pub cur_user_id: String,
    pub base_url: String,
    pub websocket_url: String,
    pub teams_url: String,
    pub accounts_url: String,
    pub website_url: String,
    pub sign_in_url: String,
}

impl ServerConfig {
    /// 仅指定 base URL 的最小配置
    pub fn new(user_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            cur_user_id: user_id.into(),
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// 从键值存储加载指定用户的配置，缺失项取默认值
    pub fn load(store: &dyn KvStore, user_id: &str, default_base_url: &str) -> Self {
        let get = |prefix: &str, def: &str| {
            store
                .get_string(&format!("{}{}", prefix, user_id))
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| def.to_string())
        };
        let config = Self {
            cur_user_id: user_id.to_string(),
            base_url: get(KEY_BASE_URL, default_base_url),
            websocket_url: get(KEY_WEBSOCKET_URL, ""),
            teams_url: get(KEY_TEAMS_URL, ""),
            accounts_url: get(KEY_ACCOUNTS_URL, ""),
            website_url: get(KEY_WEBSITE_URL, ""),
            sign_in_url: get(KEY_SIGN_IN_URL, ""),
        };
        info!(
            "[ServerConfig] 加载配置，用户ID: {}, baseUrl: {}",
            user_id, config.base_url
        );
        config
    }

    /// 用服务器下发的端点更新配置并持久化
    pub fn update_backend_config(&mut self, store: &dyn KvStore, endpoints: &BackendEndpoints) {
        info!(
            "[ServerConfig] 更新后端配置，用户ID: {}, backendUrl: {}",
            self.cur_user_id, endpoints.backend_url
        );
        self.base_url = endpoints.backend_url.clone();
        self.websocket_url = endpoints.backend_ws_url.clone();
        self.teams_url = endpoints.teams_url.clone();
        self.accounts_url = endpoints.accounts_url.clone();
        self.website_url = endpoints.website_url.clone();
        self.sign_in_url = endpoints.sign_in_url.clone();
        self.persist(store);
    }

    /// 清除当前用户的后端配置（保留用户 ID）
    pub fn remove_backend_config(&mut self, store: &dyn KvStore) {
        info!(
            "[ServerConfig] 清除后端配置，用户ID: {}",
            self.cur_user_id
        );
        for prefix in [
            KEY_BASE_URL,
            KEY_WEBSOCKET_URL,
            KEY_TEAMS_URL,
            KEY_ACCOUNTS_URL,
            KEY_WEBSITE_URL,
            KEY_SIGN_IN_URL,
        ] {
            store.remove(&format!("{}{}", prefix, self.cur_user_id));
        }
        self.base_url.clear();
        self.websocket_url.clear();
        self.teams_url.clear();
        self.accounts_url.clear();
        self.website_url.clear();
        self.sign_in_url.clear();
    }

    fn persist(&self, store: &dyn KvStore) {
        let put = |prefix: &str, val: &str| {
            store.put_string(&format!("{}{}", prefix, self.cur_user_id), val);
        };
        put(KEY_BASE_URL, &self.base_url);
        put(KEY_WEBSOCKET_URL, &self.websocket_url);
        put(KEY_TEAMS_URL, &self.teams_url);
        put(KEY_ACCOUNTS_URL, &self.accounts_url);
        put(KEY_WEBSITE_URL, &self.website_url);
        put(KEY_SIGN_IN_URL, &self.sign_in_url);
    }
}
