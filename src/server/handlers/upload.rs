use crate::server::{ApiError, ApiResult, AppState};
use crate::types::{UploadResponse, UPLOAD_FIELD};
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// POST /upload
/// 接收 multipart 上传，每个名为 `files` 的文件 part 按文件名最后一段存入上传目录
///
/// 同名文件直接覆盖（同一请求内和跨请求都是如此），响应中的 names 按接收顺序排列。
/// 请求中途失败时，本次请求已保存的文件会被删除，不会出现"失败但部分已保存"的情况。
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut saved: Vec<(String, PathBuf)> = Vec::new();

    if let Err(e) = receive_files(&state, &mut multipart, &mut saved).await {
        rollback(&saved).await;
        return Err(e);
    }

    info!("上传请求完成: {} 个文件", saved.len());

    let names = saved.into_iter().map(|(name, _)| name).collect();
    Ok(Json(UploadResponse::new(names)))
}

/// 边接收边落盘，不在内存中缓存整个文件
async fn receive_files(
    state: &AppState,
    multipart: &mut Multipart,
    saved: &mut Vec<(String, PathBuf)>,
) -> ApiResult<()> {
    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        let Some(raw_name) = field.file_name().map(str::to_string) else {
            debug!("忽略非文件字段: {}", field_name);
            continue;
        };

        if field_name != UPLOAD_FIELD {
            warn!("收到未知的文件字段: {}", field_name);
            return Err(ApiError::UnexpectedField(field_name));
        }

        let (name, path) = state.resolve_upload(&raw_name)?;
        let size = match save_field(&mut field, &path).await {
            Ok(size) => size,
            Err(e) => {
                // 删除写了一半的文件
                remove_quietly(&path).await;
                return Err(e);
            }
        };

        info!("文件已保存: {} ({} bytes)", name, size);
        saved.push((name, path));
    }

    Ok(())
}

/// 把一个 part 的内容流式写入文件，返回写入的字节数
async fn save_field(field: &mut Field<'_>, path: &Path) -> ApiResult<u64> {
    let mut file = File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

async fn rollback(saved: &[(String, PathBuf)]) {
    if saved.is_empty() {
        return;
    }
    warn!("上传请求失败，删除本次已保存的 {} 个文件", saved.len());
    for (_, path) in saved {
        remove_quietly(path).await;
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("清理文件失败: {:?}, 错误: {}", path, e);
    }
}
