//! コマンドスクリプトの実行

use crate::{DumpTarget, Result};
use dumpscope_target::Supervisor;
use dumpscope_transcript::CommandScript;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// 1回のデバッガ起動に必要な情報
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// 起動するデバッガ
    pub program: &'a Path,
    /// 解析対象（シンボルは検索式に置き換え済み）
    pub target: &'a DumpTarget,
    pub script: &'a CommandScript,
    /// `None` の場合は無期限
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

/// コマンドスクリプトを実行し、出力全体を返す
pub trait ScriptRunner {
    fn run(&self, invocation: &Invocation<'_>) -> Result<String>;
}

/// 外部プロセスとして cdb/windbg を起動する
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ScriptRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation<'_>) -> Result<String> {
        let supervisor =
            Supervisor::new(invocation.timeout).with_poll_interval(invocation.poll_interval);
        let context = format!("{:?}", invocation.script.commands());

        let output = supervisor.run(
            invocation.program,
            |log| cdb_args(invocation.target, log, invocation.script.joined()),
            &context,
        )?;
        Ok(output)
    }
}

/// cdb のコマンドライン引数を組み立てる
pub fn cdb_args(target: &DumpTarget, log: &Path, script: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-z".into(),
        target.crash_dump.clone().into_os_string(),
        "-y".into(),
        target.symbols.clone().into(),
        "-logo".into(),
        log.as_os_str().to_os_string(),
        "-c".into(),
        script.into(),
    ];

    if let Some(exe) = &target.executable {
        args.push("-i".into());
        args.push(exe.clone().into_os_string());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdb_args() {
        let target = DumpTarget::new("crash.dmp", "SRV*down*TheCrasher.pdb*http://sym");
        let args = cdb_args(&target, Path::new("pda_1.log"), ".symopt+0x10;kcn;q");
        assert_eq!(
            args,
            [
                "-z",
                "crash.dmp",
                "-y",
                "SRV*down*TheCrasher.pdb*http://sym",
                "-logo",
                "pda_1.log",
                "-c",
                ".symopt+0x10;kcn;q",
            ]
            .iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_cdb_args_with_executable() {
        let target = DumpTarget::new("crash.dmp", "sym").with_executable("TheCrasher.exe");
        let args = cdb_args(&target, Path::new("log"), "q");
        assert_eq!(&args[8..], &[OsString::from("-i"), OsString::from("TheCrasher.exe")]);
    }
}
