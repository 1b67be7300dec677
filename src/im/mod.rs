pub mod client;
pub mod config;
pub mod conversation;
pub mod listener;
pub mod server_api;
pub mod service;
pub mod types;
pub mod verify;

// 重新导出常用类型，方便外部使用
pub use client::HttpClient;
pub use config::{BackendEndpoints, KvStore, MemoryKvStore, ServerConfig};
pub use conversation::ConversationApiService;
pub use listener::{EmptyTokenRefreshHook, OnHttpListener, TokenRefreshHook};
pub use server_api::ServerApi;
pub use service::{NormalServiceApi, SpecialServiceApi};
pub use types::{ret_code, ApiEnvelope};
pub use verify::VerifyService;
