//! 会话相关端点服务
//!
//! 负责群邀请链接、入群、翻译等会话类 HTTP 请求的便捷入口。

use crate::im::listener::OnHttpListener;
use crate::im::service::{NormalServiceApi, SpecialServiceApi};
use crate::im::types::api_path;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// `/self/extid` 的结果模型
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdModel {
    #[serde(default)]
    pub id: String,
}

/// 会话 API 服务
#[derive(Clone)]
pub struct ConversationApiService {
    normal: NormalServiceApi,
    special: SpecialServiceApi,
}

impl ConversationApiService {
    pub fn new(normal: NormalServiceApi, special: SpecialServiceApi) -> Self {
        Self { normal, special }
    }

    /// 校验群邀请链接是否有效
    pub fn check_group_invite_url<R, L>(&self, invite_code: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.special.get(
            &api_path::conversation_invite_url_check(invite_code),
            &HashMap::new(),
            listener,
        );
    }

    /// 通过邀请码加入群
    pub fn join_group<R, L>(&self, invite_code: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.special
            .post(&api_path::conversation_join_invite(invite_code), "", listener);
    }

    /// 获取会话推荐邀请链接
    pub fn recommend_invite_url<R, L>(&self, conv_id: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.special.get(
            &api_path::recommend_invite_url(conv_id),
            &HashMap::new(),
            listener,
        );
    }

    /// 消息文本翻译
    pub fn translate<R, L>(&self, param: &serde_json::Value, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.normal
            .post(api_path::CONVERSATION_TRANSLATE, param, listener);
    }

    /// 设置用户备注名
    pub fn set_user_remark<R, L>(
        &self,
        user_id: &str,
        remark: &str,
        listener: Arc<L>,
    ) where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        let body = serde_json::json!({
            "userId": user_id,
            "remark": remark,
        });
        self.normal.post(api_path::USER_REMARK, &body, listener);
    }

    /// 查询当前账号的外部 ID
    pub fn self_ext_id<L>(&self, listener: Arc<L>)
    where
        L: OnHttpListener<IdModel> + ?Sized + 'static,
    {
        self.normal
            .get(api_path::SELF_EXT_ID, &HashMap::new(), listener);
    }

    /// 按外部 ID 查询用户（扫码加好友）
    pub fn user_by_ext_id<R, L>(&self, ext_id: &str, listener: Arc<L>)
    where
        R: DeserializeOwned + Default + Send + 'static,
        L: OnHttpListener<R> + ?Sized + 'static,
    {
        self.normal
            .get(&api_path::user_by_ext_id(ext_id), &HashMap::new(), listener);
    }
}
