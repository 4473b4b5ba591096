// 应用状态

use super::error::{ApiError, ApiResult};
use crate::types::{is_plain_file_name, upload_base_name};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// 服务端共享状态
///
/// 上传目录是唯一的共享可变资源，访问时不加锁，同名文件后写覆盖先写。
#[derive(Clone)]
pub struct AppState {
    upload_dir: Arc<PathBuf>,
}

impl AppState {
    /// 创建应用状态，上传目录不存在时自动创建
    pub async fn new(upload_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let mut upload_dir = upload_dir.into();
        if upload_dir.is_relative() {
            upload_dir = std::env::current_dir()?.join(upload_dir);
        }

        tokio::fs::create_dir_all(&upload_dir).await?;
        info!("上传目录: {}", upload_dir.display());

        Ok(Self {
            upload_dir: Arc::new(upload_dir),
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// 把客户端提交的文件名解析为上传目录下的路径
    pub fn resolve(&self, name: &str) -> ApiResult<PathBuf> {
        if !is_plain_file_name(name) {
            return Err(ApiError::InvalidFileName(name.to_string()));
        }
        Ok(self.upload_dir.join(name))
    }

    /// 解析上传 part 的文件名：只保留最后一段，返回存储名和目标路径
    pub fn resolve_upload(&self, raw_name: &str) -> ApiResult<(String, PathBuf)> {
        let name = upload_base_name(raw_name)
            .ok_or_else(|| ApiError::InvalidFileName(raw_name.to_string()))?;
        Ok((name.to_string(), self.upload_dir.join(name)))
    }
}
