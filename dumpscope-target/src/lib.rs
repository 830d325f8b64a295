//! dumpscope 外部デバッガプロセス制御
//!
//! このクレートは、外部デバッガ（cdb.exe など）を子プロセスとして起動し、
//! 期限付きで完了を待機するための低レベル機能を提供します。
//! デバッガの出力は標準出力ではなくログファイル引数に書き込まれるため、
//! 一時ログファイルの作成・読み取り・削除もここで扱います。

pub mod capture;
pub mod errors;
pub mod process;
pub mod supervisor;

pub use capture::CaptureLog;
pub use errors::TargetError;
pub use process::Process;
pub use supervisor::{run_captured, Supervisor, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};

/// ターゲット制御の結果型
pub type Result<T> = std::result::Result<T, TargetError>;
