//! 本地文件夹扫描
//!
//! 递归遍历目录，把所有非目录条目展平为一个绝对路径列表。
//! 不保留目录结构，不做任何过滤（隐藏文件、大小、类型都不过滤）。

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// 递归扫描文件夹
///
/// # 参数
/// - `root`: 要扫描的文件夹路径，相对路径会基于当前工作目录转为绝对路径
///
/// # 返回
/// - 所有非目录条目的绝对路径，顺序与目录读取顺序一致（不排序）
/// - 根路径不存在、不可读或不是文件夹时返回 I/O 错误
///
/// 符号链接不跟随，和其他非目录条目一样直接作为文件返回。
pub fn scan_dir(root: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let root = absolutize(root.as_ref())?;

    let metadata = std::fs::metadata(&root)?;
    if !metadata.is_dir() {
        return Err(io::Error::other(format!(
            "扫描路径不是文件夹: {}",
            root.display()
        )));
    }

    info!("开始扫描文件夹: {}", root.display());

    let mut files = Vec::new();
    // WalkDir 内部使用显式栈遍历，深层目录不会耗尽调用栈
    for entry in WalkDir::new(&root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }

        debug!("扫描到文件: {}", entry.path().display());
        files.push(entry.into_path());
    }

    info!("文件夹扫描完成: {} 个文件", files.len());

    Ok(files)
}

fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
