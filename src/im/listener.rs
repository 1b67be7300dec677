//! HTTP 请求监听器回调接口
//!
//! 每次请求对应一个一次性的监听器，成功/失败互斥，最后总会收到
//! `on_complete`。结果类型通过泛型参数显式声明，调度层据此反序列化。

use async_trait::async_trait;

/// HTTP 请求结果监听器
///
/// `on_suc` 与 `on_suc_list` 互斥：单对象结果走前者，数组结果走后者，
/// `org_json` 始终携带原始响应 body。
#[async_trait]
pub trait OnHttpListener<R>: Send + Sync {
    /// 请求成功（单对象结果）
    async fn on_suc(&self, r: R, org_json: String);

    /// 请求成功（数组结果）
    async fn on_suc_list(&self, list: Vec<R>, org_json: String);

    /// 请求失败（本地错误、HTTP 错误或业务错误码统一走这里）
    async fn on_fail(&self, code: i32, err: String);

    /// 请求结束（成功或失败之后总会回调一次）
    async fn on_complete(&self) {}
}

/// token 刷新钩子
///
/// 收到 401 时调度层会先触发一次刷新，再把失败回调给原监听器。
/// 刷新本身是尽力而为的旁路操作，不会被重试。
#[async_trait]
pub trait TokenRefreshHook: Send + Sync {
    /// 刷新当前账号 token
    async fn update_current_account_token(&self);
}

/// 空实现（默认钩子，不做任何事）
pub struct EmptyTokenRefreshHook;

#[async_trait]
impl TokenRefreshHook for EmptyTokenRefreshHook {
    async fn update_current_account_token(&self) {}
}
