//! デバッガの抽象インターフェース

use crate::Result;
use dumpscope_transcript::Stack;
use std::path::PathBuf;

/// 解析対象（クラッシュダンプとシンボル・実行ファイル）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpTarget {
    /// クラッシュダンプのパス
    pub crash_dump: PathBuf,
    /// シンボルファイルのパス、またはシンボル検索式
    pub symbols: String,
    /// 実行ファイルのパス（任意）
    pub executable: Option<PathBuf>,
}

impl DumpTarget {
    /// 解析対象を作成する
    pub fn new(crash_dump: impl Into<PathBuf>, symbols: impl Into<String>) -> Self {
        Self {
            crash_dump: crash_dump.into(),
            symbols: symbols.into(),
            executable: None,
        }
    }

    /// 実行ファイルを指定する
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }
}

/// クラッシュダンプを解析するデバッガ
///
/// バックエンドごとに1つの実装を持ちます。
/// どの操作も外部プロセスの完了（またはタイムアウト）までブロックします。
pub trait Debugger {
    /// 構造化されたスタックトレースを取得する
    fn stack_trace(&self) -> Result<Stack>;

    /// デバッガの自動解析結果をそのまま取得する
    fn raw_analysis(&self) -> Result<String>;
}
