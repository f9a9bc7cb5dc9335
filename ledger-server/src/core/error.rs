use crate::storage::StorageError;
use thiserror::Error;

/// 服务器启动/运行错误
///
/// 请求级错误走 [`shared::AppError`]；这里只有让进程退出的错误。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("存储打开失败: {0}")]
    Storage(#[from] StorageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
