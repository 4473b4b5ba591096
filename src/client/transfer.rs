//! 传输客户端
//!
//! - `upload_files`: 以 multipart/form-data 一次性上传一个或多个文件
//! - `download`: 按文件名下载，流式写入本地目录
//!
//! 两个方法都会记录错误日志后把错误原样返回，由调用方决定退出方式。
//! 不设置超时，也不做重试。

use super::error::TransferError;
use crate::types::{is_plain_file_name, ErrorResponse, UploadResponse, UPLOAD_FIELD};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info};

/// 文件传输客户端
#[derive(Debug, Clone)]
pub struct TransferClient {
    /// HTTP客户端
    client: Client,
    /// 服务端基础地址（不带末尾 `/`）
    base_url: String,
}

impl TransferClient {
    /// 创建新的传输客户端
    ///
    /// # 参数
    /// * `base_url` - 服务端地址，如 `http://localhost:3000`
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransferError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// 使用已有的 HTTP 客户端创建
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 上传一个或多个文件
    ///
    /// 所有路径都必须存在且是普通文件，否则在发送请求之前直接失败。
    /// 每个文件作为一个名为 `files` 的 part，文件名取路径的最后一段。
    pub async fn upload_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<UploadResponse, TransferError> {
        // 先整体校验，任何一个路径无效都不会发出请求
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            entries.push((path, validate_upload_path(path).await?));
        }

        // 文件名原样放入 Content-Disposition，不做百分号编码
        let mut form = Form::new().percent_encode_noop();
        for (path, file_name) in entries {
            let file = File::open(path).await?;
            let len = file.metadata().await?.len();
            debug!("添加上传文件: {} ({} bytes)", path.display(), len);

            let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
            let part = Part::stream_with_length(body, len)
                .file_name(file_name)
                .mime_str("application/octet-stream")?;
            form = form.part(UPLOAD_FIELD, part);
        }

        let url = format!("{}/upload", self.base_url);
        match self.send_upload(&url, form).await {
            Ok(resp) => {
                info!("Uploaded: {} file(s)", resp.count);
                info!("Names: {:?}", resp.names);
                Ok(resp)
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                Err(e)
            }
        }
    }

    async fn send_upload(&self, url: &str, form: Form) -> Result<UploadResponse, TransferError> {
        let response = self.client.post(url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(response.json::<UploadResponse>().await?)
    }

    /// 下载文件到指定目录，返回写入的本地路径
    ///
    /// 目标位置已有同名文件时直接覆盖。服务端返回 404 时不会创建本地文件。
    pub async fn download(
        &self,
        name: &str,
        out_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, TransferError> {
        match self.download_inner(name, out_dir.as_ref()).await {
            Ok(out_path) => {
                info!("Downloaded to {}", out_path.display());
                Ok(out_path)
            }
            Err(e) => {
                error!("Download failed: {}", e);
                Err(e)
            }
        }
    }

    async fn download_inner(&self, name: &str, out_dir: &Path) -> Result<PathBuf, TransferError> {
        if !is_plain_file_name(name) {
            return Err(TransferError::InvalidName(name.to_string()));
        }

        let url = format!("{}/download/{}", self.base_url, urlencoding::encode(name));
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransferError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let out_path = out_dir.join(name);
        let mut file = File::create(&out_path).await?;

        // 流式写入文件，任何分支返回时 file 都会被释放
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        // 刷新文件缓冲，确保数据全部落盘后才返回
        file.flush().await?;
        debug!("下载写入完成: {} ({} bytes)", out_path.display(), written);

        Ok(out_path)
    }
}

/// 校验上传路径并返回上传使用的文件名
async fn validate_upload_path(path: &Path) -> Result<String, TransferError> {
    let invalid = || TransferError::InvalidFile(path.to_path_buf());

    let metadata = tokio::fs::metadata(path).await.map_err(|_| invalid())?;
    if !metadata.is_file() {
        return Err(invalid());
    }

    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(invalid)
}

/// 把非成功响应转换为错误，优先使用服务端 JSON 中的 error 字段
async fn status_error(response: reqwest::Response) -> TransferError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => err.error,
        Err(_) if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body,
    };

    TransferError::Status { status, message }
}
