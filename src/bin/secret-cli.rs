//! Secret CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于对指定后端发起单次 API 请求并打印回调结果，
//! 方便联调 Envelope 归一化与鉴权头注入。

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use secret_sdk_core_rust::im::config::sp_key;
use secret_sdk_core_rust::{
    HttpClient, KvStore, MemoryKvStore, NormalServiceApi, OnHttpListener, ServerApi, ServerConfig,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info};

/// Secret CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "secret-cli")]
#[command(about = "Secret CLI 客户端 - 对后端发起单次 API 请求", long_about = None)]
struct Args {
    /// 后端 base URL
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// API 路径（默认: /self/extid）
    #[arg(short, long, default_value = "/self/extid")]
    api: String,

    /// HTTP 方法（get 或 post）
    #[arg(short, long, default_value = "get")]
    method: String,

    /// POST 请求体（JSON 字符串）
    #[arg(short, long, default_value = "{}")]
    body: String,

    /// 认证 token
    #[arg(long, default_value = "")]
    token: String,

    /// 认证 token 类型（默认: Bearer）
    #[arg(long, default_value = "Bearer")]
    token_type: String,

    /// 原样模式：跳过 Envelope 拆包
    #[arg(long)]
    raw: bool,

    /// 日志级别（默认: info,secret_sdk_core_rust=debug）
    #[arg(long, default_value = "info,secret_sdk_core_rust=debug")]
    log_level: String,
}

/// 初始化日志（同时输出到 stdout 和文件）
fn init_logger(log_level: &str) {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    // 优先使用环境变量 RUST_LOG（如果设置了），否则使用命令行参数
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("无法创建日志文件 debug.log");

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("[CLI] 📝 日志已同时输出到控制台和文件: debug.log");
}

/// 打印回调结果的监听器，`on_complete` 后唤醒主任务
struct CliHttpListener {
    done: Notify,
}

#[async_trait]
impl OnHttpListener<serde_json::Value> for CliHttpListener {
    async fn on_suc(&self, r: serde_json::Value, org_json: String) {
        info!("[CLI] ✅ 请求成功: {}", r);
        info!("[CLI]    原始响应: {}", org_json);
    }

    async fn on_suc_list(&self, list: Vec<serde_json::Value>, org_json: String) {
        info!("[CLI] ✅ 请求成功（数组），条目数: {}", list.len());
        info!("[CLI]    原始响应: {}", org_json);
    }

    async fn on_fail(&self, code: i32, err: String) {
        error!("[CLI] ❌ 请求失败, code: {}, err: {}", code, err);
    }

    async fn on_complete(&self) {
        info!("[CLI] 请求结束");
        self.done.notify_one();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);

    let store = Arc::new(MemoryKvStore::new());
    if !args.token.is_empty() {
        store.put_string(sp_key::TOKEN_TYPE, &args.token_type);
        store.put_string(sp_key::TOKEN, &args.token);
    }

    let config = ServerConfig::new("cli", args.base_url.clone());
    let http = Arc::new(HttpClient::new(config, store)?);
    let server = Arc::new(ServerApi::new());
    let normal = NormalServiceApi::new(http, server);

    let listener = Arc::new(CliHttpListener {
        done: Notify::new(),
    });

    info!(
        "[CLI] 📡 发起请求: {} {}{}",
        args.method.to_uppercase(),
        args.base_url,
        args.api
    );
    match args.method.to_lowercase().as_str() {
        "get" => {
            normal.get_with_mode(&args.api, &HashMap::new(), args.raw, listener.clone());
        }
        "post" => {
            normal.post_property(&args.api, args.body.clone(), args.raw, listener.clone());
        }
        other => {
            anyhow::bail!("不支持的 HTTP 方法: {}", other);
        }
    }

    listener.done.notified().await;
    Ok(())
}
