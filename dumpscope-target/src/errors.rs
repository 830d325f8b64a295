//! プロセス制御のエラー型

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 外部プロセスの実行に関するエラー
#[derive(Error, Debug)]
pub enum TargetError {
    /// プロセスの起動に失敗した
    #[error("Failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 期限内にプロセスが終了しなかった（プロセスは強制終了済み）
    #[error("Timed out after {timeout:?} running {program:?} with: {context}")]
    Timeout {
        program: PathBuf,
        timeout: Duration,
        /// 実行していたコマンドなど、診断用の文字列
        context: String,
    },

    /// プロセスが0以外の終了コードで終了した
    #[error("{program:?} exited with {}", code.map_or_else(|| "no exit code".to_string(), |c| format!("code {}", c)))]
    ExitStatus {
        program: PathBuf,
        /// シグナルで終了した場合は None
        code: Option<i32>,
    },

    /// ログファイルの作成や読み取りなどの I/O エラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TargetError {
    /// タイムアウトによるエラーかどうか
    pub fn is_timeout(&self) -> bool {
        matches!(self, TargetError::Timeout { .. })
    }
}
