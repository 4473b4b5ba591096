// 客户端与服务端共享的接口数据类型

use serde::{Deserialize, Serialize};

/// multipart 中文件字段的固定名称
pub const UPLOAD_FIELD: &str = "files";

/// 上传接口成功响应
///
/// `{ "ok": true, "count": 2, "names": ["a.txt", "b.txt"] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    /// 本次请求收到的文件数
    pub count: usize,
    /// 按接收顺序排列的存储文件名（同名文件会重复出现）
    pub names: Vec<String>,
}

impl UploadResponse {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            ok: true,
            count: names.len(),
            names,
        }
    }
}

/// 错误响应
///
/// `{ "ok": false, "error": "File not found" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// 判断是否为单一路径分量的普通文件名
///
/// 拒绝空串、`.`、`..` 以及包含 `/`、`\`、NUL 的名称，防止路径穿越。
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// 从客户端提交的上传文件名中取出最后一段
///
/// 按 `/` 和 `\` 切分，`../evil.txt` 得到 `evil.txt`。
/// 取出的结果仍不是普通文件名（空、`.`、`..`、含 NUL）时返回 `None`。
pub fn upload_base_name(raw: &str) -> Option<&str> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    is_plain_file_name(base).then_some(base)
}
