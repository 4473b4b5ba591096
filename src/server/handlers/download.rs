use crate::server::{ApiError, ApiResult, AppState};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::io::ErrorKind;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// GET /download/:name
/// 以附件形式流式返回上传目录中的文件
pub async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let path = state.resolve(&name)?;

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("下载文件不存在: {:?}", path);
            return Err(ApiError::FileNotFound);
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(ApiError::FileNotFound);
    }

    info!("开始下载: {} ({} bytes)", name, metadata.len());

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_LENGTH, metadata.len().to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(&name)),
    ];
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((headers, body).into_response())
}

/// 生成附件响应头，文件名按 RFC 5987 编码以支持非 ASCII 字符
fn content_disposition(name: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(name)
    )
}
