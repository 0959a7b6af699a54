//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("无效的边 {origin} -> {destination}: 端点必须在 [1, {node_count}] 范围内")]
    InvalidEdge {
        origin: usize,
        destination: usize,
        node_count: usize,
    },

    #[error("数据格式错误 (第 {line} 行): {reason}")]
    InvalidFormat { line: usize, reason: String },

    #[error("无效参数: {0}")]
    InvalidArgument(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 错误: {0}")]
    Csv(#[from] csv::Error),

    #[error("序列化错误: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
