//! filedrop 命令行客户端
//!
//! ```text
//! filedrop upload <file-or-folder>
//! filedrop download <file-name> [--out DIR]
//! ```

use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use filedrop::config::{LogConfig, DEFAULT_CONFIG_PATH};
use filedrop::{logging, scan_dir, AppConfig, TransferClient};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// filedrop - upload files to and download files from a filedrop server
#[derive(Parser, Debug)]
#[command(name = "filedrop")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server base URL (overrides the configured one)
    #[arg(short, long, global = true, value_name = "URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a single file, or every file under a folder (recursively)
    Upload {
        /// File or folder to upload
        path: PathBuf,
    },

    /// Download a stored file by name
    Download {
        /// File name on the server
        name: String,

        /// Directory to save into
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{}", Cli::command().render_help());
            return ExitCode::FAILURE;
        }
    };

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let (config, config_error) = AppConfig::load_with_fallback(&config_path).await;

    // 命令行只输出到控制台
    let _log_guard = logging::init_logging(&LogConfig {
        enabled: false,
        ..config.log.clone()
    });
    if let Some(e) = config_error {
        warn!("配置文件加载失败，使用默认配置: {:#}", e);
    }

    let server_url = cli.server.unwrap_or(config.client.server_url);

    match run(cli.command, &server_url).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("CLI failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, server_url: &str) -> anyhow::Result<()> {
    let client = TransferClient::new(server_url)?;

    match command {
        Commands::Upload { path } => {
            let metadata = tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("cannot access {}", path.display()))?;

            // 文件夹递归展开为文件列表，单个文件直接上传
            let files = if metadata.is_dir() {
                scan_dir(&path)?
            } else {
                vec![path]
            };

            info!("Found {} file(s). Uploading...", files.len());
            client.upload_files(&files).await?;
        }
        Commands::Download { name, out } => {
            client.download(&name, &out).await?;
        }
    }

    Ok(())
}
