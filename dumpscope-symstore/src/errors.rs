//! シンボルストアのエラー型

use std::path::PathBuf;
use thiserror::Error;

/// シンボルストア操作のエラー
#[derive(Error, Debug)]
pub enum SymStoreError {
    /// ファイル名を持たないパスが渡された
    #[error("Not a symbol file path: {0:?}")]
    InvalidPath(PathBuf),

    /// オブジェクトファイルとして解析できない
    #[error("Failed to read debug identifier from {path:?}: {message}")]
    UnknownObject { path: PathBuf, message: String },

    /// 圧縮形式での保存はサポートしていない
    #[error("Compressed symbol storage is not supported: {0:?}")]
    CompressionUnsupported(PathBuf),

    /// I/O エラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
