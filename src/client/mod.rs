// 客户端模块：文件夹扫描 + 上传/下载

pub mod error;
pub mod scan;
pub mod transfer;

pub use error::TransferError;
pub use scan::scan_dir;
pub use transfer::TransferClient;
