//! 外部デバッガプロセスの起動と監視

use crate::{Result, TargetError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 起動された外部デバッガプロセス
pub struct Process {
    child: Child,
    program: PathBuf,
    /// 終了を確認済みの場合の終了ステータス
    status: Option<ExitStatus>,
}

impl Process {
    /// 外部プログラムを起動する
    ///
    /// 標準入出力はすべて破棄されます。
    /// デバッガの出力はログファイル引数を経由して受け取る前提です。
    pub fn spawn<P, I, S>(program: P, args: I) -> Result<Self>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref().to_path_buf();
        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| TargetError::Spawn {
                program: program.clone(),
                source,
            })?;

        debug!(pid = child.id(), program = ?program, "spawned debugger process");

        Ok(Self {
            child,
            program,
            status: None,
        })
    }

    /// プロセスIDを取得する
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// 起動したプログラムのパスを取得する
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// プロセスが終了していれば終了ステータスを返す（ブロックしない）
    pub fn poll(&mut self) -> Result<Option<ExitStatus>> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
        }
        Ok(self.status)
    }

    /// 期限付きでプロセスの終了を待機する
    ///
    /// `poll_interval` ごとに終了を確認します。
    /// 期限までに終了しなかった場合はプロセスを強制終了し、
    /// [`TargetError::Timeout`] を返します。
    /// `timeout` が `None` の場合は無期限に待機します。
    pub fn wait_with_deadline(
        &mut self,
        timeout: Option<Duration>,
        poll_interval: Duration,
        context: &str,
    ) -> Result<ExitStatus> {
        // 非常に大きな値は無期限として扱う
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        loop {
            if let Some(status) = self.poll()? {
                return Ok(status);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    self.terminate()?;
                    return Err(TargetError::Timeout {
                        program: self.program.clone(),
                        timeout: timeout.unwrap_or_default(),
                        context: context.to_string(),
                    });
                }
            }

            thread::sleep(poll_interval);
        }
    }

    /// プロセスを強制終了する
    pub fn terminate(&mut self) -> Result<()> {
        if self.poll()?.is_some() {
            return Ok(());
        }

        warn!(pid = self.pid(), program = ?self.program, "terminating debugger process");
        if let Err(e) = self.child.kill() {
            // kill と終了が競合した場合は既に終了している
            if self.child.try_wait()?.is_none() {
                return Err(e.into());
            }
        }
        self.status = Some(self.child.wait()?);
        Ok(())
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}
