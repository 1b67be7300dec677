pub mod im;

// 重新导出常用类型和函数，方便外部使用
pub use im::{
    client::HttpClient,
    config::{BackendEndpoints, KvStore, MemoryKvStore, ServerConfig},
    conversation::ConversationApiService,
    listener::{OnHttpListener, TokenRefreshHook},
    server_api::ServerApi,
    service::{NormalServiceApi, SpecialServiceApi},
    types::{ret_code, ApiEnvelope},
    verify::VerifyService,
};
