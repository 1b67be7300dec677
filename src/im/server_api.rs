//! 请求调度与响应归一化层
//!
//! 入口是 [`ServerApi::enqueue`]：把一个已构造好的请求交给 tokio 任务执行，
//! HTTP 交换和 JSON 解析都不占用调用方；解析结果统一归一化后按
//! `on_suc` / `on_suc_list` / `on_fail` + `on_complete` 的次序回调监听器。
//! 同时维护按 callKey 索引的在途请求注册表，支持显式取消。

use crate::im::listener::{EmptyTokenRefreshHook, OnHttpListener, TokenRefreshHook};
use crate::im::types::{ret_code, ApiEnvelope};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// 单次请求的归一化结果（成功/失败互斥）
enum Outcome<R> {
    Suc(R, String),
    SucList(Vec<R>, String),
    Fail {
        code: i32,
        message: String,
        /// 401 时置位，派发失败回调前先触发 token 刷新旁路
        refresh: bool,
    },
}

/// 请求调度器
///
/// 注册表策略：同一 callKey 的并发请求后写覆盖（last-writer-wins），
/// 被覆盖的任务不再可取消但仍会正常完成并回调。
#[derive(Clone)]
pub struct ServerApi {
    calls: Arc<Mutex<HashMap<String, AbortHandle>>>,
    refresh_hook: Arc<dyn TokenRefreshHook>,
}

impl Default for ServerApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerApi {
    /// 创建调度器（默认空 token 刷新钩子）
    pub fn new() -> Self {
        Self::with_refresh_hook(Arc::new(EmptyTokenRefreshHook))
    }

    /// 创建调度器并注入 token 刷新钩子
    pub fn with_refresh_hook(refresh_hook: Arc<dyn TokenRefreshHook>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
            refresh_hook,
        }
    }

    /// 派发请求
    ///
    /// * `call_key` — 在途注册表键，通常取 API 路径；
    /// * `for_org_json` — 原样模式：跳过 Envelope，直接按监听器类型解析 body；
    /// * 监听器恰好收到一次成功或失败，随后是 `on_complete`。
    ///
    /// 收到响应（含传输失败）时立即从注册表摘除，之后的解析与回调
    /// 不再受 [`cancel_call`](Self::cancel_call) 影响。
    pub fn enqueue<R, L>(
        &self,
        request: reqwest::RequestBuilder,
        call_key: &str,
        for_org_json: bool,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let key = call_key.to_string();
        debug!(
            "[ServerAPI] enqueue 开始, callKey: {}, forOrgJson: {}",
            key, for_org_json
        );
        let calls = Arc::clone(&self.calls);
        let refresh_hook = Arc::clone(&self.refresh_hook);
        let task_key = key.clone();
        // 先持锁再 spawn：任务摘除注册表前必须等注册完成，
        // 否则极快完成的任务会把已结束的句柄留在表里
        let mut registry = self.calls.lock().expect("注册表锁中毒");
        let handle = tokio::spawn(async move {
            let outcome = match request.send().await {
                Ok(response) => {
                    // 响应已到达，先摘除注册表再解析
                    calls.lock().expect("注册表锁中毒").remove(&task_key);
                    Self::classify_response::<R>(&task_key, response, for_org_json).await
                }
                Err(e) => {
                    calls.lock().expect("注册表锁中毒").remove(&task_key);
                    warn!("[ServerAPI] 请求传输失败, callKey: {}, err: {}", task_key, e);
                    Outcome::Fail {
                        code: ret_code::ERR_LOCAL,
                        message: format!("请求失败: {}", e),
                        refresh: false,
                    }
                }
            };
            Self::deliver(listener, outcome, refresh_hook).await;
        });
        registry.insert(key, handle.abort_handle());
    }

    /// 取消指定 callKey 的在途请求
    ///
    /// 请求已完成或不存在时是 no-op；不会传播到已经开始的解析阶段。
    pub fn cancel_call(&self, call_key: &str) {
        let mut calls = self.calls.lock().expect("注册表锁中毒");
        if let Some(handle) = calls.remove(call_key) {
            if !handle.is_finished() {
                info!("[ServerAPI] 取消请求, callKey: {}", call_key);
                handle.abort();
            }
        }
    }

    /// 指定 callKey 是否仍在途
    pub fn contains_call(&self, call_key: &str) -> bool {
        self.calls
            .lock()
            .expect("注册表锁中毒")
            .contains_key(call_key)
    }

    /// 按 HTTP 状态与 body 形态归一化响应
    async fn classify_response<R>(
        call_key: &str,
        response: reqwest::Response,
        for_org_json: bool,
    ) -> Outcome<R>
    where
        R: DeserializeOwned + Default,
    {
        let status = response.status();
        let status_reason = status.canonical_reason().unwrap_or("").to_string();
        let org_json = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                // 200 之外读 body 失败时归为 HTTP_NOT_200，无法再归因
                let code = if status.as_u16() == 200 {
                    ret_code::ERR_LOCAL
                } else {
                    ret_code::HTTP_NOT_200
                };
                return Outcome::Fail {
                    code,
                    message: format!("读取响应失败: {}", e),
                    refresh: false,
                };
            }
        };
        debug!(
            "[ServerAPI] 响应到达, callKey: {}, httpCode: {}, body: {}",
            call_key, status, org_json
        );

        if status.as_u16() == 200 {
            if for_org_json {
                Self::parse_raw::<R>(org_json)
            } else {
                Self::parse_envelope::<R>(org_json)
            }
        } else {
            let mut code = i32::from(status.as_u16());
            let mut message = status_reason;
            if !org_json.is_empty() {
                if for_org_json {
                    message = org_json.clone();
                } else {
                    match ApiEnvelope::from_json(&org_json) {
                        Ok(envelope) => {
                            // body 里带业务错误码时优先于 HTTP 状态
                            if envelope.code != 0 {
                                code = envelope.code;
                            }
                            message = if envelope.message.is_empty() {
                                org_json.clone()
                            } else {
                                envelope.message
                            };
                        }
                        Err(_) => message = org_json.clone(),
                    }
                }
            }
            warn!(
                "[ServerAPI] 请求失败, callKey: {}, code: {}, message: {}",
                call_key, code, message
            );
            Outcome::Fail {
                code,
                message,
                refresh: code == ret_code::HTTP_UNAUTHORIZED,
            }
        }
    }

    /// 原样模式：body 直接按监听器声明的类型解析
    fn parse_raw<R>(org_json: String) -> Outcome<R>
    where
        R: DeserializeOwned + Default,
    {
        if org_json.trim().is_empty() || ApiEnvelope::is_null_json(&org_json) {
            return Outcome::Suc(R::default(), org_json);
        }
        if ApiEnvelope::is_null_json_arr(&org_json) {
            return Outcome::SucList(Vec::new(), org_json);
        }
        if ApiEnvelope::is_arr(&org_json) {
            return match serde_json::from_str::<Vec<R>>(&org_json) {
                Ok(list) => Outcome::SucList(list, org_json),
                Err(e) => Outcome::Fail {
                    code: ret_code::ERR_LOCAL,
                    message: format!("JSON 解析异常: {}", e),
                    refresh: false,
                },
            };
        }
        match serde_json::from_str::<R>(&org_json) {
            Ok(r) => Outcome::Suc(r, org_json),
            Err(e) => Outcome::Fail {
                code: ret_code::ERR_LOCAL,
                message: format!("JSON 解析异常: {}", e),
                refresh: false,
            },
        }
    }

    /// Envelope 模式：先拆包装，校验业务码，再解析 data 片段
    fn parse_envelope<R>(org_json: String) -> Outcome<R>
    where
        R: DeserializeOwned + Default,
    {
        let envelope = match ApiEnvelope::from_json(&org_json) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Outcome::Fail {
                    code: ret_code::ERR_LOCAL,
                    message: format!("JSON 解析异常: {}", e),
                    refresh: false,
                }
            }
        };
        if envelope.code != ret_code::RET_OK {
            let message = if !envelope.message.is_empty() {
                envelope.message
            } else if !envelope.result.is_empty() {
                envelope.result
            } else {
                "error from server is empty".to_string()
            };
            return Outcome::Fail {
                code: envelope.code,
                message,
                refresh: false,
            };
        }
        if ApiEnvelope::is_arr(&envelope.result) {
            return match serde_json::from_str::<Vec<R>>(&envelope.result) {
                Ok(list) => Outcome::SucList(list, org_json),
                Err(e) => Outcome::Fail {
                    code: ret_code::ERR_LOCAL,
                    message: format!("JSON 解析异常: {}", e),
                    refresh: false,
                },
            };
        }
        if envelope.result.is_empty() || ApiEnvelope::is_null_json(&envelope.result) {
            return Outcome::Suc(R::default(), org_json);
        }
        match serde_json::from_str::<R>(&envelope.result) {
            Ok(r) => Outcome::Suc(r, org_json),
            Err(e) => Outcome::Fail {
                code: ret_code::ERR_LOCAL,
                message: format!("JSON 解析异常: {}", e),
                refresh: false,
            },
        }
    }

    /// 回调派发：恰好一次成功或失败，之后 `on_complete`
    async fn deliver<R, L>(
        listener: Arc<L>,
        outcome: Outcome<R>,
        refresh_hook: Arc<dyn TokenRefreshHook>,
    ) where
        R: Send,
        L: OnHttpListener<R> + ?Sized,
    {
        match outcome {
            Outcome::Suc(r, org_json) => listener.on_suc(r, org_json).await,
            Outcome::SucList(list, org_json) => listener.on_suc_list(list, org_json).await,
            Outcome::Fail {
                code,
                message,
                refresh,
            } => {
                if refresh {
                    info!("[ServerAPI] 收到 401，触发 token 刷新旁路");
                    refresh_hook.update_current_account_token().await;
                }
                listener.on_fail(code, message).await;
            }
        }
        listener.on_complete().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::im::client::HttpClient;
    use crate::im::config::{KvStore, MemoryKvStore, ServerConfig};
    use crate::im::types::api_path;
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct IdModel {
        #[serde(default)]
        id: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Suc(IdModel, String),
        SucList(Vec<IdModel>, String),
        Fail(i32, String),
        Complete,
    }

    struct RecordingListener {
        events: Mutex<Vec<Event>>,
        done: Notify,
    }

    impl RecordingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
                done: Notify::new(),
            })
        }

        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        async fn wait_done(&self) {
            tokio::time::timeout(Duration::from_secs(5), self.done.notified())
                .await
                .expect("等待 on_complete 超时");
        }
    }

    #[async_trait]
    impl OnHttpListener<IdModel> for RecordingListener {
        async fn on_suc(&self, r: IdModel, org_json: String) {
            self.events.lock().unwrap().push(Event::Suc(r, org_json));
        }

        async fn on_suc_list(&self, list: Vec<IdModel>, org_json: String) {
            self.events
                .lock()
                .unwrap()
                .push(Event::SucList(list, org_json));
        }

        async fn on_fail(&self, code: i32, err: String) {
            self.events.lock().unwrap().push(Event::Fail(code, err));
        }

        async fn on_complete(&self) {
            self.events.lock().unwrap().push(Event::Complete);
            self.done.notify_one();
        }
    }

    struct RecordingRefreshHook {
        hit: AtomicBool,
    }

    #[async_trait]
    impl TokenRefreshHook for RecordingRefreshHook {
        async fn update_current_account_token(&self) {
            self.hit.store(true, Ordering::SeqCst);
        }
    }

    /// 极简 HTTP 响应器：读完请求头后等待 `delay`，再写固定响应并关闭连接
    async fn spawn_mock_server(status_line: &str, body: &str, delay: Duration) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else {
                    break;
                };
                let response = response.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read_total = 0;
                    loop {
                        match sock.read(&mut buf[read_total..]).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => read_total += n,
                        }
                        if buf[..read_total].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                        if read_total == buf.len() {
                            break;
                        }
                    }
                    tokio::time::sleep(delay).await;
                    let _ = sock.write_all(response.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        addr
    }

    fn test_http_client(addr: SocketAddr) -> HttpClient {
        let store = Arc::new(MemoryKvStore::new());
        store.put_string(crate::im::config::sp_key::TOKEN_TYPE, "Bearer");
        store.put_string(crate::im::config::sp_key::TOKEN, "test-token");
        HttpClient::new(
            ServerConfig::new("u1", format!("http://{}", addr)),
            store,
        )
        .unwrap()
    }

    fn no_params() -> std::collections::HashMap<String, String> {
        std::collections::HashMap::new()
    }

    #[tokio::test]
    async fn envelope_ok_object_delivers_on_suc() {
        let body = r#"{"code":200,"msg":"","data":"{\"id\":\"abc\"}"}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(
            client.get(api_path::SELF_EXT_ID, &no_params()),
            api_path::SELF_EXT_ID,
            false,
            listener.clone(),
        );
        listener.wait_done().await;

        assert_eq!(
            listener.events(),
            vec![
                Event::Suc(
                    IdModel {
                        id: "abc".to_string()
                    },
                    body.to_string()
                ),
                Event::Complete
            ]
        );
        assert!(!api.contains_call(api_path::SELF_EXT_ID));
    }

    #[tokio::test]
    async fn envelope_ok_array_delivers_on_suc_list() {
        let body = r#"{"code":200,"msg":"","data":[{"id":"a"},{"id":"b"}]}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/list", &no_params()), "/list", false, listener.clone());
        listener.wait_done().await;

        let events = listener.events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::SucList(list, org_json) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[0].id, "a");
                assert_eq!(org_json, body);
            }
            other => panic!("期望 SucList，实际 {:?}", other),
        }
        assert_eq!(events[1], Event::Complete);
    }

    #[tokio::test]
    async fn envelope_ok_empty_result_delivers_default_instance() {
        let body = r#"{"code":200,"msg":"","data":"{}"}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/empty", &no_params()), "/empty", false, listener.clone());
        listener.wait_done().await;

        assert_eq!(
            listener.events()[0],
            Event::Suc(IdModel::default(), body.to_string())
        );
    }

    #[tokio::test]
    async fn raw_mode_null_json_delivers_default_instance() {
        let addr = spawn_mock_server("200 OK", "{}", Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/raw", &no_params()), "/raw", true, listener.clone());
        listener.wait_done().await;

        assert_eq!(
            listener.events(),
            vec![
                Event::Suc(IdModel::default(), "{}".to_string()),
                Event::Complete
            ]
        );
    }

    #[tokio::test]
    async fn raw_mode_array_delivers_list() {
        let body = r#"[{"id":"x"}]"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/raw-list", &no_params()), "/raw-list", true, listener.clone());
        listener.wait_done().await;

        match &listener.events()[0] {
            Event::SucList(list, _) => assert_eq!(list[0].id, "x"),
            other => panic!("期望 SucList，实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn envelope_error_code_delivers_on_fail() {
        let body = r#"{"code":2023,"msg":"rate limited","data":""}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/err", &no_params()), "/err", false, listener.clone());
        listener.wait_done().await;

        assert_eq!(
            listener.events(),
            vec![
                Event::Fail(2023, "rate limited".to_string()),
                Event::Complete
            ]
        );
    }

    #[tokio::test]
    async fn envelope_error_without_message_uses_fallback() {
        let body = r#"{"code":2023,"msg":"","data":""}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/err2", &no_params()), "/err2", false, listener.clone());
        listener.wait_done().await;

        assert_eq!(
            listener.events()[0],
            Event::Fail(2023, "error from server is empty".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_body_on_200_reports_err_local() {
        let addr = spawn_mock_server("200 OK", "not json {{{", Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/bad", &no_params()), "/bad", false, listener.clone());
        listener.wait_done().await;

        match &listener.events()[0] {
            Event::Fail(code, _) => assert_eq!(*code, ret_code::ERR_LOCAL),
            other => panic!("期望 Fail，实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_200_with_envelope_body_uses_inner_code() {
        let body = r#"{"code":4001,"msg":"boom"}"#;
        let addr = spawn_mock_server("500 Internal Server Error", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/500", &no_params()), "/500", false, listener.clone());
        listener.wait_done().await;

        assert_eq!(
            listener.events(),
            vec![Event::Fail(4001, "boom".to_string()), Event::Complete]
        );
    }

    #[tokio::test]
    async fn non_200_with_plain_body_uses_http_status_and_body() {
        let addr = spawn_mock_server("500 Internal Server Error", "oops", Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/500b", &no_params()), "/500b", false, listener.clone());
        listener.wait_done().await;

        assert_eq!(
            listener.events()[0],
            Event::Fail(500, "oops".to_string())
        );
    }

    #[tokio::test]
    async fn non_200_with_unreadable_body_reports_http_not_200() {
        // Content-Length 比实际 body 长，读取 body 必然失败
        let listener_sock = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener_sock.local_addr().unwrap();
        tokio::spawn(async move {
            let Ok((mut sock, _)) = listener_sock.accept().await else {
                return;
            };
            let mut buf = vec![0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let _ = sock
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\n\r\noops")
                .await;
            let _ = sock.shutdown().await;
        });
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/trunc", &no_params()), "/trunc", false, listener.clone());
        listener.wait_done().await;

        match &listener.events()[0] {
            Event::Fail(code, _) => assert_eq!(*code, ret_code::HTTP_NOT_200),
            other => panic!("期望 Fail，实际 {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthorized_triggers_refresh_hook_and_still_fails() {
        let addr = spawn_mock_server("401 Unauthorized", "", Duration::ZERO).await;
        let client = test_http_client(addr);
        let hook = Arc::new(RecordingRefreshHook {
            hit: AtomicBool::new(false),
        });
        let api = ServerApi::with_refresh_hook(hook.clone());
        let listener = RecordingListener::new();

        api.enqueue(client.get("/auth", &no_params()), "/auth", false, listener.clone());
        listener.wait_done().await;

        assert!(hook.hit.load(Ordering::SeqCst));
        assert_eq!(
            listener.events(),
            vec![
                Event::Fail(401, "Unauthorized".to_string()),
                Event::Complete
            ]
        );
    }

    #[tokio::test]
    async fn transport_error_reports_err_local_then_complete() {
        // 只为拿到一个已关闭的端口
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/dead", &no_params()), "/dead", false, listener.clone());
        listener.wait_done().await;

        let events = listener.events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            Event::Fail(code, _) => assert_eq!(*code, ret_code::ERR_LOCAL),
            other => panic!("期望 Fail，实际 {:?}", other),
        }
        assert_eq!(events[1], Event::Complete);
        assert!(!api.contains_call("/dead"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn registry_drops_key_even_when_task_finishes_before_enqueue_returns() {
        // 多线程 runtime 下，秒败的任务可能在 enqueue 返回前就跑完；
        // 注册表不能因此留下已结束的句柄
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let client = test_http_client(addr);
        let api = ServerApi::new();

        for i in 0..20 {
            let key = format!("/k{}", i);
            let listener = RecordingListener::new();
            api.enqueue(client.get(&key, &no_params()), &key, false, listener.clone());
            listener.wait_done().await;
            assert!(
                !api.contains_call(&key),
                "on_complete 之后注册表仍残留 {}",
                key
            );
        }
    }

    #[tokio::test]
    async fn cancel_before_response_prevents_delivery() {
        let body = r#"{"code":200,"msg":"","data":"{}"}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::from_millis(800)).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/slow", &no_params()), "/slow", false, listener.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(api.contains_call("/slow"));

        api.cancel_call("/slow");
        assert!(!api.contains_call("/slow"));

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert!(listener.events().is_empty());
    }

    #[tokio::test]
    async fn cancel_after_completion_is_noop() {
        let body = r#"{"code":200,"msg":"","data":"{}"}"#;
        let addr = spawn_mock_server("200 OK", body, Duration::ZERO).await;
        let client = test_http_client(addr);
        let api = ServerApi::new();
        let listener = RecordingListener::new();

        api.enqueue(client.get("/fast", &no_params()), "/fast", false, listener.clone());
        listener.wait_done().await;

        api.cancel_call("/fast");
        assert!(!api.contains_call("/fast"));
        // 已派发的结果不受影响
        assert_eq!(listener.events().len(), 2);
    }
}
