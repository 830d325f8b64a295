//! 期限付き実行とログ取得

use crate::{CaptureLog, Process, Result, TargetError};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error};

/// スクリプト実行のデフォルトタイムアウト
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// 終了確認の間隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 外部デバッガの1回の実行を監視する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supervisor {
    /// `None` の場合は無期限
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl Supervisor {
    /// タイムアウトを指定して作成する
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// 終了確認の間隔を変更する
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// 外部プログラムを実行し、ログファイルに書かれた出力を返す
    ///
    /// `build_args` には一時ログファイルのパスが渡されるので、
    /// そのパスを含む引数リストを組み立てて返してください。
    /// 0以外の終了コードの場合は出力をログに残してから
    /// [`TargetError::ExitStatus`] を返します。
    /// タイムアウトした場合は出力を読まずにエラーを返します。
    pub fn run<F>(&self, program: &Path, build_args: F, context: &str) -> Result<String>
    where
        F: FnOnce(&Path) -> Vec<OsString>,
    {
        let log = CaptureLog::new()?;
        let args = build_args(log.path());

        debug!(program = ?program, args = ?args, "about to call debugger");

        let mut process = Process::spawn(program, &args)?;
        let status = process.wait_with_deadline(self.timeout, self.poll_interval, context)?;

        let output = log.read()?;

        if !status.success() {
            error!(program = ?program, status = ?status, "debugger error!\n{}", output);
            return Err(TargetError::ExitStatus {
                program: program.to_path_buf(),
                code: status.code(),
            });
        }

        debug!("Output:\n{}", output);
        Ok(output)
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TIMEOUT))
    }
}

/// デフォルト設定（60秒タイムアウト）で外部プログラムを実行する
pub fn run_captured<F>(program: &Path, build_args: F, context: &str) -> Result<String>
where
    F: FnOnce(&Path) -> Vec<OsString>,
{
    Supervisor::default().run(program, build_args, context)
}
