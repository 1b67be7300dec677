//! 二次验证（2FA）端点服务
//!
//! 创建/开启/关闭二次验证，以及邮箱验证码的发送与校验。

use crate::im::listener::OnHttpListener;
use crate::im::service::NormalServiceApi;
use serde::de::DeserializeOwned;
use std::sync::Arc;

mod verify_api {
    pub const CREATE: &str = "/self/2fa/create";
    pub const VERIFY: &str = "/self/2fa/verify";
    pub const CLOSE: &str = "/self/2fa/close";
    pub const SEND: &str = "/self/2fa/send";
    pub const ECODE: &str = "/self/2fa/ecode";
    pub const OPEN: &str = "/self/2fa/open";
}

/// 二次验证服务
#[derive(Clone)]
pub struct VerifyService {
    normal: NormalServiceApi,
}

impl VerifyService {
    pub fn new(normal: NormalServiceApi) -> Self {
        Self { normal }
    }

    /// 创建二次验证
    pub fn create<R, L>(&self, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.normal
            .post_property(verify_api::CREATE, "", false, listener);
    }

    /// 校验验证码与公钥
    pub fn verify<R, L>(&self, code: i32, pub_key: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let body = serde_json::json!({
            "code": code,
            "pubkey": pub_key,
        });
        self.normal.post(verify_api::VERIFY, &body, listener);
    }

    /// 关闭二次验证
    pub fn close<R, L>(&self, email_code: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let body = serde_json::json!({ "email_code": email_code });
        self.normal.post(verify_api::CLOSE, &body, listener);
    }

    /// 发送邮箱验证码；email 为空时退化为不带参数的请求
    pub fn send<R, L>(&self, email: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        if email.is_empty() {
            self.normal
                .post_property(verify_api::SEND, "", false, listener);
        } else {
            let api = format!("{}?email={}", verify_api::SEND, email);
            self.normal.post_property(&api, "", false, listener);
        }
    }

    /// 校验邮箱验证码
    pub fn ecode<R, L>(&self, email: &str, code: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let body = serde_json::json!({
            "email": email,
            "code": code,
        });
        self.normal.post(verify_api::ECODE, &body, listener);
    }

    /// 开启二次验证
    pub fn open<R, L>(&self, email_code: &str, passcode: i32, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let body = serde_json::json!({
            "email_code": email_code,
            "passcode": passcode,
        });
        self.normal.post(verify_api::OPEN, &body, listener);
    }

    /// 本地校验：验证码必须是 6 位数字
    pub fn check_code(code: &str) -> bool {
        code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_code_accepts_six_digits() {
        assert!(VerifyService::check_code("123456"));
        assert!(VerifyService::check_code("000000"));
    }

    #[test]
    fn check_code_rejects_other_shapes() {
        assert!(!VerifyService::check_code("12345"));
        assert!(!VerifyService::check_code("1234567"));
        assert!(!VerifyService::check_code("12a456"));
        assert!(!VerifyService::check_code(""));
        assert!(!VerifyService::check_code("１２３４５６"));
    }
}
