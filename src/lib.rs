// filedrop: 极简文件传输工具
// 客户端上传/下载文件，服务端以扁平目录存储

// 配置管理模块
pub mod config;

// 日志模块
pub mod logging;

// 客户端/服务端共享的接口类型
pub mod types;

// 客户端：文件夹扫描 + 传输
pub mod client;

// Web服务器模块
pub mod server;

// 导出常用类型
pub use client::{scan_dir, TransferClient, TransferError};
pub use config::AppConfig;
pub use server::{build_router, AppState};
pub use types::{ErrorResponse, UploadResponse};
