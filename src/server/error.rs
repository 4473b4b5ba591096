// API 错误类型

use crate::types::ErrorResponse;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// 处理器错误，统一转换为 `{ ok: false, error }` 响应
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File not found")]
    FileNotFound,

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// 文件 part 的字段名不是 `files`
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Failed to parse multipart data: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::InvalidFileName(_) | Self::UnexpectedField(_) => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", self);
        } else {
            tracing::warn!("请求被拒绝: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
