// API处理器模块

pub mod download;
pub mod upload;

pub use download::*;
pub use upload::*;
