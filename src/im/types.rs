//! 通用 HTTP 响应包装（Envelope）与错误码常量
//!
//! 服务器所有业务接口统一返回 `{"code": int, "msg": string, "data": ...}`，
//! 此模块负责把原始 body 字符串防御性地解析为统一的 [`ApiEnvelope`]。

use serde_json::Value;
use tracing::warn;

/// 业务层结果码常量（与服务器约定一致，HTTP 状态码之外的为本地哨兵值）
pub mod ret_code {
    /// 服务器业务成功
    pub const RET_OK: i32 = 200;
    /// HTTP 鉴权失效，需要刷新 token
    pub const HTTP_UNAUTHORIZED: i32 = 401;
    /// 本地错误（网络异常、JSON 解析失败等，没有服务器响应）
    pub const ERR_LOCAL: i32 = -528;
    /// HTTP 状态码非 200 且错误 body 读取失败，无法进一步归因
    pub const HTTP_NOT_200: i32 = -529;
}

/// 服务器 API 路径常量
pub mod api_path {
    /// 查询当前账号的外部 ID
    pub const SELF_EXT_ID: &str = "/self/extid";
    /// 扫码登录确认
    pub const SCAN_LOGIN: &str = "/self/accept2d";
    /// 登录 IP 代理配置
    pub const SIGNIN_IP_PROXY: &str = "/self/ipproxy";
    /// Android 版本更新信息
    pub const APP_VERSION_UPDATE_INFO: &str = "/prod/android";
    /// 设置用户备注名
    pub const USER_REMARK: &str = "/users/setRemark";
    /// 会话消息翻译
    pub const CONVERSATION_TRANSLATE: &str = "/thdmod/google/translate/text";
    /// 举报上传文件
    pub const REPORT_UPLOAD_FILE: &str = "/judge/file";

    /// 按外部 ID 查询用户
    pub fn user_by_ext_id(ext_id: &str) -> String {
        format!("/users/by/extid/{}", ext_id)
    }

    /// 会话邀请链接
    pub fn recommend_invite_url(conv_id: &str) -> String {
        format!("/conversations/{}/invite/url", conv_id)
    }

    /// 校验群邀请链接
    pub fn conversation_invite_url_check(invite_code: &str) -> String {
        format!("/conversations/{}/invite/url/check", invite_code)
    }

    /// 通过邀请码加入群
    pub fn conversation_join_invite(invite_code: &str) -> String {
        format!("/conversations/{}/join_invite", invite_code)
    }

    /// 举报会话内容
    pub fn report_conversation(conv_id: &str) -> String {
        format!("/judge/conversations/{}/accusation", conv_id)
    }

    /// 会话申诉解封
    pub fn conversation_apply_unblock(conv_id: &str) -> String {
        format!("/judge/conversations/{}/appeal", conv_id)
    }
}

/// 统一的 API 响应包装结构体
///
/// `result` 保留 `data` 字段的原始 JSON 片段（可能是对象、数组或空串），
/// 由调度层根据监听器声明的类型再做第二次反序列化。
#[derive(Debug, Clone, Default)]
pub struct ApiEnvelope {
    /// 业务结果码，缺失时为 0
    pub code: i32,
    /// 业务提示信息，缺失时为空串
    pub message: String,
    /// `data` 字段的原始 JSON 片段
    pub result: String,
}

impl ApiEnvelope {
    const KEY_CODE: &'static str = "code";
    const KEY_MSG: &'static str = "msg";
    const KEY_DATA: &'static str = "data";

    /// 从原始 body 字符串解析 Envelope
    ///
    /// 缺失字段取默认值；`data` 既可能是内嵌 JSON 字符串也可能直接是
    /// 对象/数组，后者重新序列化为片段。body 不是合法 JSON 时返回 Err，
    /// 由调用方归为本地错误，不会 panic。
    pub fn from_json(org_json: &str) -> anyhow::Result<ApiEnvelope> {
        if org_json.trim().is_empty() {
            warn!("[Envelope] 响应 body 为空，按空 Envelope 处理");
            return Ok(ApiEnvelope::default());
        }
        let value: Value = serde_json::from_str(org_json)?;
        let code = value
            .get(Self::KEY_CODE)
            .and_then(Value::as_i64)
            .unwrap_or(0) as i32;
        let message = value
            .get(Self::KEY_MSG)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let result = match value.get(Self::KEY_DATA) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            // data 直接内联对象/数组时，还原为原始片段供二次解析
            Some(other) => serde_json::to_string(other)?,
        };
        Ok(ApiEnvelope {
            code,
            message,
            result,
        })
    }

    /// 是否为空对象标记 `{}`
    pub fn is_null_json(result: &str) -> bool {
        result.trim() == "{}"
    }

    /// 是否为空数组标记 `[]`
    pub fn is_null_json_arr(result: &str) -> bool {
        result.trim() == "[]"
    }

    /// 是否为 JSON 数组（以 `[` 开头）
    pub fn is_arr(result: &str) -> bool {
        result.trim_start().starts_with('[')
    }

    /// 是否为 JSON 对象（以 `{` 开头）
    pub fn is_obj(result: &str) -> bool {
        result.trim_start().starts_with('{')
    }
}
