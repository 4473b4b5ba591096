// 传输客户端错误类型

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// 上传/下载过程中可能出现的错误
#[derive(Debug, Error)]
pub enum TransferError {
    /// 上传路径不存在或不是普通文件（在发出任何请求前检测）
    #[error("Not a valid file: {}", .0.display())]
    InvalidFile(PathBuf),

    /// 下载文件名不是单一路径分量
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// 服务端没有该文件
    #[error("File not found on server: {0}")]
    NotFound(String),

    /// 服务端返回非成功状态码
    #[error("server responded {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// 网络层错误（连接失败、DNS、响应流中断等）
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 本地文件读写错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// 是否为传输类错误（网络或状态码）
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}
