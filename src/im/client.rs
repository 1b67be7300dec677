//! HTTP 传输客户端
//!
//! 封装 reqwest：固定超时、按请求注入认证头（token/cookie 来自键值存储，
//! 运行期可变），以及 GET/POST/PUT/DELETE/multipart 各通用动词。
//! 客户端在进程启动时显式构造一次，通过依赖注入传给各服务。

use crate::im::config::{sp_key, KvStore, ServerConfig};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = "Secret (Rust)";

/// HTTP 传输客户端
///
/// 持有唯一的 reqwest 客户端、当前后端配置和键值存储。
/// 配置可在运行期被替换，后续请求自动使用新的 base URL。
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<RwLock<ServerConfig>>,
    store: Arc<dyn KvStore>,
}

impl HttpClient {
    /// 创建客户端（固定连接/读写超时，进程内只需构造一次）
    pub fn new(config: ServerConfig, store: Arc<dyn KvStore>) -> Result<Self> {
        let inner = reqwest::ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self {
            inner,
            config: Arc::new(RwLock::new(config)),
            store,
        })
    }

    /// 当前配置的只读快照
    pub fn config(&self) -> ServerConfig {
        self.config.read().expect("配置锁中毒").clone()
    }

    /// 整体替换后端配置（多后端切换）
    pub fn replace_config(&self, config: ServerConfig) {
        debug!(
            "[HttpClient] 切换后端配置，baseUrl: {}",
            config.base_url
        );
        *self.config.write().expect("配置锁中毒") = config;
    }

    /// 拼接完整请求 URL；`api` 已是完整 URL 时原样使用
    pub fn url(&self, api: &str) -> String {
        if api.starts_with("http://") || api.starts_with("https://") {
            return api.to_string();
        }
        let base = self.config.read().expect("配置锁中毒").base_url.clone();
        format!("{}{}", base.trim_end_matches('/'), api)
    }

    /// 每次请求注入的公共请求头
    ///
    /// token 为空时仅告警不拦截请求（保持原有 fail-open 行为），
    /// 由服务器以 401 响应，再走 token 刷新旁路。
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        let operation_id = Uuid::new_v4().to_string();
        if let Ok(v) = HeaderValue::from_str(&operation_id) {
            headers.insert(HeaderName::from_static("operationid"), v);
        }

        let token_type = self.store.get_string(sp_key::TOKEN_TYPE).unwrap_or_default();
        let token = self.store.get_string(sp_key::TOKEN).unwrap_or_default();
        if !token_type.is_empty() && !token.is_empty() {
            if let Ok(v) = HeaderValue::from_str(&format!("{} {}", token_type, token)) {
                headers.insert(reqwest::header::AUTHORIZATION, v);
            }
        } else {
            warn!(
                "[HttpClient] token 为空，跳过 Authorization 头 tokenType: {}, token: {}",
                token_type, token
            );
        }

        let cookie = self.store.get_string(sp_key::COOKIES).unwrap_or_default();
        if !cookie.is_empty() {
            if let Ok(v) = HeaderValue::from_str(&cookie) {
                headers.insert(reqwest::header::COOKIE, v);
            }
        } else {
            warn!("[HttpClient] cookie 为空");
        }
        headers
    }

    /// GET 请求（query 参数）
    pub fn get(&self, api: &str, params: &HashMap<String, String>) -> reqwest::RequestBuilder {
        self.inner
            .get(self.url(api))
            .headers(self.build_headers())
            .query(params)
    }

    /// POST JSON 请求体
    pub fn post_json(&self, api: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.inner
            .post(self.url(api))
            .headers(self.build_headers())
            .json(body)
    }

    /// POST 已序列化好的 JSON 字符串
    pub fn post_raw(&self, api: &str, body: String) -> reqwest::RequestBuilder {
        self.inner
            .post(self.url(api))
            .headers(self.build_headers())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=UTF-8",
            )
            .body(body)
    }

    /// POST 表单（urlencoded）
    pub fn post_form(&self, api: &str, params: &HashMap<String, String>) -> reqwest::RequestBuilder {
        self.inner
            .post(self.url(api))
            .headers(self.build_headers())
            .form(params)
    }

    /// PUT JSON 请求体
    pub fn put_json(&self, api: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.inner
            .put(self.url(api))
            .headers(self.build_headers())
            .json(body)
    }

    /// PUT 已序列化好的 JSON 字符串
    pub fn put_raw(&self, api: &str, body: String) -> reqwest::RequestBuilder {
        self.inner
            .put(self.url(api))
            .headers(self.build_headers())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=UTF-8",
            )
            .body(body)
    }

    /// DELETE（带 JSON 请求体）
    pub fn delete_json(&self, api: &str, body: &serde_json::Value) -> reqwest::RequestBuilder {
        self.inner
            .delete(self.url(api))
            .headers(self.build_headers())
            .json(body)
    }

    /// POST multipart 表单（文件上传）
    pub fn post_multipart(
        &self,
        api: &str,
        form: reqwest::multipart::Form,
    ) -> reqwest::RequestBuilder {
        self.inner
            .post(self.url(api))
            .headers(self.build_headers())
            .multipart(form)
    }

    /// 把本地文件列表组装成 multipart 表单，统一使用 `key_upload` 字段名
    pub async fn files_to_multipart_form(
        files: &[impl AsRef<Path>],
        key_upload: &str,
    ) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let path = file.as_ref();
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("读取上传文件失败: {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "file".to_string());
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/octet-stream")
                .context("构造 multipart part 失败")?;
            form = form.part(key_upload.to_string(), part);
        }
        Ok(form)
    }
}
