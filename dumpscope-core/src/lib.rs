//! dumpscope デバッガ自動化のコア機能
//!
//! このクレートは、クラッシュダンプ解析の中核となるロジックを提供します。
//! 外部デバッガの起動と監視、コマンドスクリプトの実行、出力の解析を統合し、
//! 構造化されたスタックトレースや生の解析結果を返します。

pub mod command;
pub mod config;
pub mod debugger;
pub mod errors;
pub mod runner;
pub mod windbg;

pub use command::Command;
pub use config::WinDbgConfig;
pub use debugger::{Debugger, DumpTarget};
pub use errors::Error;
pub use runner::{cdb_args, Invocation, ProcessRunner, ScriptRunner};
pub use windbg::WinDbg;

// 他のクレートから使用するために再エクスポート
pub use dumpscope_symstore::{SymStoreError, SymbolCache, SymbolStore};
pub use dumpscope_target::TargetError;
pub use dumpscope_transcript::{Frame, ScriptOptions, Stack, Variable, VariableValue};

/// デバッガの結果型
pub type Result<T> = std::result::Result<T, Error>;
