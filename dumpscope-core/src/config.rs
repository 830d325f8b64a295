//! WinDbg バックエンドの設定

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// 既定の cdb.exe の場所
pub const DEFAULT_CDB_PATH: &str = r"C:\Program Files (x86)\Windows Kits\10\Debuggers\x86\cdb.exe";

/// 公開シンボルサーバー
pub const DEFAULT_SYMBOL_SERVER: &str = "http://msdl.microsoft.com/download/symbols";

/// ダウンストリームシンボルストアのディレクトリ名（一時ディレクトリ直下）
pub const DOWNSTREAM_DIR_NAME: &str = "DownstreamSymbols";

/// 環境変数名
pub const ENV_CDB: &str = "DUMPSCOPE_CDB";
pub const ENV_DOWNSTREAM: &str = "DUMPSCOPE_DOWNSTREAM";
pub const ENV_SYMBOL_SERVER: &str = "DUMPSCOPE_SYMBOL_SERVER";
pub const ENV_TIMEOUT: &str = "DUMPSCOPE_TIMEOUT";

/// WinDbg（cdb）バックエンドの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinDbgConfig {
    /// cdb.exe のパス（windbg.exe は同じディレクトリにあるものとする）
    pub cdb_path: PathBuf,
    /// ダウンストリームシンボルストアのルート
    pub downstream_symbols: PathBuf,
    /// 上流のシンボルサーバー URL
    pub upstream_symbol_server: String,
    /// スクリプト実行のタイムアウト
    pub command_timeout: Duration,
    /// 終了確認の間隔
    pub poll_interval: Duration,
}

impl WinDbgConfig {
    /// 既定値に環境変数 `DUMPSCOPE_*` の値を上書きした設定を作成する
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数で設定値を上書きする
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_CDB) {
            config.cdb_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_DOWNSTREAM) {
            config.downstream_symbols = PathBuf::from(path);
        }
        if let Some(url) = lookup(ENV_SYMBOL_SERVER) {
            config.upstream_symbol_server = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.command_timeout = Duration::from_secs(secs),
                Err(_) => warn!(value = %secs, "ignoring invalid {}", ENV_TIMEOUT),
            }
        }

        config
    }

    /// 対話用の windbg.exe のパス
    pub fn windbg_path(&self) -> PathBuf {
        self.cdb_path.with_file_name("windbg.exe")
    }

    /// ダウンストリームストア・元の参照・上流サーバーを順に探すシンボル検索式
    pub fn symbol_search_path(&self, symbols: &str) -> String {
        format!(
            "SRV*{}*{}*{}",
            self.downstream_symbols.display(),
            symbols,
            self.upstream_symbol_server
        )
    }
}

impl Default for WinDbgConfig {
    fn default() -> Self {
        Self {
            cdb_path: PathBuf::from(DEFAULT_CDB_PATH),
            downstream_symbols: env::temp_dir().join(DOWNSTREAM_DIR_NAME),
            upstream_symbol_server: DEFAULT_SYMBOL_SERVER.to_string(),
            command_timeout: dumpscope_target::DEFAULT_TIMEOUT,
            poll_interval: dumpscope_target::DEFAULT_POLL_INTERVAL,
        }
    }
}
