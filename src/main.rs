use anyhow::Context;
use clap::Parser;
use filedrop::{config::DEFAULT_CONFIG_PATH, logging, AppConfig, AppState};
use std::path::PathBuf;
use tracing::{info, warn};

/// filedrop 服务端：接收上传并按文件名提供下载
#[derive(Parser, Debug)]
#[command(name = "filedrop-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, config_error) = AppConfig::load_with_fallback(&args.config).await;

    // 初始化日志系统（必须保持 _log_guard 存活）
    let _log_guard = logging::init_logging(&config.log);

    info!("filedrop-server v{} 启动中...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!("配置文件加载失败，使用默认配置: {:#}", e);
    }

    let state = AppState::new(&config.server.upload_dir)
        .await
        .with_context(|| format!("创建上传目录失败: {:?}", config.server.upload_dir))?;

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("监听地址失败: {}", addr))?;

    info!("Server listening on http://{}", addr);

    filedrop::server::serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
