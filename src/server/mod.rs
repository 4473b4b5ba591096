// Web服务器模块

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// 构建服务端路由
///
/// - `POST /upload`: multipart 上传，字段名 `files`
/// - `GET /download/:name`: 按文件名下载
pub fn build_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http()) // HTTP 请求日志
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .route("/upload", post(handlers::upload_files))
        .route("/download/:name", get(handlers::download_file))
        // 上传不限制请求体大小
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
        .layer(middleware)
}

/// 在已绑定的监听器上运行服务，直到 `shutdown` 完成或服务出错
///
/// 服务本身出错时返回错误，由调用方决定退出码；`shutdown` 先完成则正常返回。
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let server = axum::serve(listener, build_router(state));

    tokio::select! {
        result = server => {
            result.context("服务器错误")?;
        }
        _ = shutdown => {
            info!("收到停止信号，停止服务");
        }
    }

    Ok(())
}
