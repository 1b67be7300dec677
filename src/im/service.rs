//! 通用服务门面
//!
//! [`NormalServiceApi`]（Envelope 模式）与 [`SpecialServiceApi`]（原样模式）
//! 是端点服务的公共底座：组装请求体、选定 callKey，再交给调度层。
//! 两者都通过构造函数显式注入客户端与调度器，进程内各构造一次即可。

use crate::im::client::HttpClient;
use crate::im::listener::OnHttpListener;
use crate::im::server_api::ServerApi;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::error;

/// Envelope 模式服务门面
///
/// 默认 `for_org_json = false`：响应先拆 `{code, msg, data}` 包装再解析。
#[derive(Clone)]
pub struct NormalServiceApi {
    http: Arc<HttpClient>,
    server: Arc<ServerApi>,
}

impl NormalServiceApi {
    pub fn new(http: Arc<HttpClient>, server: Arc<ServerApi>) -> Self {
        Self { http, server }
    }

    /// GET 请求（Envelope 模式）
    pub fn get<R, L>(
        &self,
        api: &str,
        params: &HashMap<String, String>,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.get_with_mode(api, params, false, listener);
    }

    /// GET 请求，显式指定原样模式
    pub fn get_with_mode<R, L>(
        &self,
        api: &str,
        params: &HashMap<String, String>,
        for_org_json: bool,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.get(api, params), api, for_org_json, listener);
    }

    /// POST JSON 对象（Envelope 模式）
    pub fn post<R, L>(
        &self,
        api: &str,
        json: &serde_json::Value,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.post_with_mode(api, json, false, listener);
    }

    /// POST JSON 对象，显式指定原样模式
    pub fn post_with_mode<R, L>(
        &self,
        api: &str,
        json: &serde_json::Value,
        for_org_json: bool,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.post_json(api, json), api, for_org_json, listener);
    }

    /// POST 已序列化好的 JSON 字符串；空串按 `{}` 处理
    pub fn post_property<R, L>(
        &self,
        api: &str,
        property: impl Into<String>,
        for_org_json: bool,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let mut property = property.into();
        if property.is_empty() {
            property = "{}".to_string();
        }
        self.server
            .enqueue(self.http.post_raw(api, property), api, for_org_json, listener);
    }

    /// POST 表单（urlencoded，Envelope 模式）
    pub fn post_form<R, L>(
        &self,
        api: &str,
        params: &HashMap<String, String>,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.post_form(api, params), api, false, listener);
    }

    /// PUT JSON 对象（Envelope 模式）
    pub fn put<R, L>(
        &self,
        api: &str,
        json: &serde_json::Value,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.put_json(api, json), api, false, listener);
    }

    /// DELETE（带 JSON 请求体，Envelope 模式）
    pub fn delete<R, L>(
        &self,
        api: &str,
        json: &serde_json::Value,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.delete_json(api, json), api, false, listener);
    }

    /// 取消指定 API 的在途请求
    pub fn cancel(&self, api: &str) {
        self.server.cancel_call(api);
    }
}

/// 原样模式服务门面
///
/// 默认 `for_org_json = true`：body 不拆包装，直接按监听器类型解析。
/// 附带 multipart 文件上传入口。
#[derive(Clone)]
pub struct SpecialServiceApi {
    http: Arc<HttpClient>,
    server: Arc<ServerApi>,
}

impl SpecialServiceApi {
    pub fn new(http: Arc<HttpClient>, server: Arc<ServerApi>) -> Self {
        Self { http, server }
    }

    /// GET 请求（原样模式）
    pub fn get<R, L>(
        &self,
        api: &str,
        params: &HashMap<String, String>,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.get(api, params), api, true, listener);
    }

    /// POST 已序列化好的 JSON 字符串（原样模式）；空串按 `{}` 处理
    pub fn post<R, L>(
        &self,
        api: &str,
        property: impl Into<String>,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let mut property = property.into();
        if property.is_empty() {
            property = "{}".to_string();
        }
        self.server
            .enqueue(self.http.post_raw(api, property), api, true, listener);
    }

    /// PUT 已序列化好的 JSON 字符串（原样模式）
    pub fn put<R, L>(
        &self,
        api: &str,
        property: impl Into<String>,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.server
            .enqueue(self.http.put_raw(api, property.into()), api, true, listener);
    }

    /// 上传单个文件（multipart，原样模式）
    pub async fn upload_file<R, L>(
        &self,
        api: &str,
        file: impl AsRef<Path>,
        key_upload: &str,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.upload_files(api, &[file.as_ref()], key_upload, listener)
            .await;
    }

    /// 上传多个文件（multipart，原样模式）
    ///
    /// 读文件失败属于本地错误，直接走 `on_fail` 而不发起请求。
    pub async fn upload_files<R, L>(
        &self,
        api: &str,
        files: &[impl AsRef<Path>],
        key_upload: &str,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let form = match HttpClient::files_to_multipart_form(files, key_upload).await {
            Ok(form) => form,
            Err(e) => {
                error!("[SpecialServiceAPI] 组装上传表单失败: {}", e);
                listener
                    .on_fail(
                        crate::im::types::ret_code::ERR_LOCAL,
                        format!("组装上传表单失败: {}", e),
                    )
                    .await;
                listener.on_complete().await;
                return;
            }
        };
        self.server
            .enqueue(self.http.post_multipart(api, form), api, true, listener);
    }

    /// 取消指定 API 的在途请求
    pub fn cancel(&self, api: &str) {
        self.server.cancel_call(api);
    }
}
