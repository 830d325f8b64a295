//! cdb の出力を模した実行器を使った WinDbg バックエンドのテスト

use dumpscope_core::{
    Debugger, DumpTarget, Error, Invocation, ScriptOptions, ScriptRunner, SymStoreError,
    SymbolCache, TargetError, Variable, WinDbg, WinDbgConfig,
};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

const COMPACT: &str = " # ChildEBP RetAddr\n\
00 010ffc14 00889ad9 TheCrasher!main+0x1b\n\
WARNING: Stack unwind information not available. Following frames may be wrong.\n\
01 010ffc5c 7668fa29 KERNEL32!BaseThreadInitThunk+0x19";

const EXTENDED: &str = " # ChildEBP RetAddr\n\
00 010ffc14 00889ad9 TheCrasher!main(int argc = 0n1, char ** argv = 0x032053f0)+0x1b [c:\\users\\me\\thecrasher\\source.cpp @ 43]\n\
WARNING: Stack unwind information not available. Following frames may be wrong.\n\
01 010ffc5c 7668fa29 KERNEL32!BaseThreadInitThunk+0x19";

const THREAD: &str = ".  0  Id: 97cc.e00 Suspend: 0 Teb: 00f81000 Unfrozen\n      Priority: 0  Priority class: 32";

const ANALYSIS: &str = "FAULTING_IP: \nTheCrasher!main+1b\nEXCEPTION_CODE: (NTSTATUS) 0xc0000005";

const LAST_EVENT: &str = "Last event: 97cc.e00: Access violation - code c0000005";

/// 実行器に渡された内容
#[derive(Debug, Clone)]
struct Recorded {
    program: PathBuf,
    symbols: String,
    script: String,
    timeout: Option<Duration>,
}

/// `.echo` や `.frame` を解釈して cdb のログ出力を模す実行器
#[derive(Default, Clone)]
struct FakeCdb {
    recorded: Rc<RefCell<Vec<Recorded>>>,
}

impl FakeCdb {
    fn output_for(command: &str, frame: &Cell<usize>) -> Option<String> {
        if let Some(text) = command.strip_prefix(".echo ") {
            return Some(text.to_string());
        }
        if let Some(n) = command.strip_prefix(".frame ") {
            let n: usize = n.parse().ok()?;
            frame.set(n);
            return EXTENDED
                .lines()
                .find(|line| line.starts_with(&format!("{:02} ", n)))
                .map(str::to_string);
        }

        let output = match command {
            "kcn" => COMPACT.to_string(),
            "kpn" => EXTENDED.to_string(),
            "dv /t *" if frame.get() == 0 => {
                "int argc = 0n1\nchar ** argv = 0x032053f0\nchar * p = 0x00000000 \"\"".to_string()
            }
            "dv /t *" => "Unable to enumerate locals, HRESULT 0x80004005".to_string(),
            "~." => THREAD.to_string(),
            "!analyze -v" => ANALYSIS.to_string(),
            ".lastevent" => LAST_EVENT.to_string(),
            ".ecxr" => "eax=00000000 ebx=00b3d000 ecx=00000001".to_string(),
            _ => return None,
        };
        Some(output)
    }
}

impl ScriptRunner for FakeCdb {
    fn run(&self, invocation: &Invocation<'_>) -> dumpscope_core::Result<String> {
        self.recorded.borrow_mut().push(Recorded {
            program: invocation.program.to_path_buf(),
            symbols: invocation.target.symbols.clone(),
            script: invocation.script.joined().to_string(),
            timeout: invocation.timeout,
        });

        let frame = Cell::new(0);
        let mut log = vec![
            "Microsoft (R) Windows Debugger Version 10.0.17134.1 X86".to_string(),
            format!("0:000> {}", invocation.script.joined()),
        ];
        log.extend(
            invocation
                .script
                .commands()
                .iter()
                .filter_map(|command| Self::output_for(command, &frame)),
        );
        log.push("quit:".to_string());

        Ok(log.join("\n"))
    }
}

/// 常にタイムアウトする実行器
struct HangingCdb;

impl ScriptRunner for HangingCdb {
    fn run(&self, invocation: &Invocation<'_>) -> dumpscope_core::Result<String> {
        Err(TargetError::Timeout {
            program: invocation.program.to_path_buf(),
            timeout: invocation.timeout.unwrap_or_default(),
            context: invocation.script.joined().to_string(),
        }
        .into())
    }
}

/// 登録されたファイルを記録するシンボルキャッシュ
#[derive(Default)]
struct RecordingCache {
    added: RefCell<Vec<PathBuf>>,
}

impl SymbolCache for RecordingCache {
    fn add(&self, path: &Path, compressed: bool) -> Result<PathBuf, SymStoreError> {
        assert!(!compressed);
        self.added.borrow_mut().push(path.to_path_buf());
        Ok(path.to_path_buf())
    }
}

/// 存在する cdb を指す設定
fn config_with(cdb: &Path) -> WinDbgConfig {
    WinDbgConfig {
        cdb_path: cdb.to_path_buf(),
        downstream_symbols: PathBuf::from("/tmp/DownstreamSymbols"),
        command_timeout: Duration::from_secs(5),
        ..WinDbgConfig::default()
    }
}

fn open_fake(cdb: &Path, symbols: &str) -> (WinDbg<FakeCdb>, FakeCdb) {
    let runner = FakeCdb::default();
    let target = DumpTarget::new("TheCrasher.dmp", symbols);
    let windbg = WinDbg::with_runner(
        target,
        config_with(cdb),
        runner.clone(),
        &RecordingCache::default(),
    )
    .unwrap();
    (windbg, runner)
}

#[test]
fn test_missing_cdb_is_environment_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("cdb.exe");
    let target = DumpTarget::new("TheCrasher.dmp", "symbols");

    let result = WinDbg::with_runner(
        target,
        config_with(&missing),
        FakeCdb::default(),
        &RecordingCache::default(),
    );
    match result {
        Err(Error::Environment { path }) => assert_eq!(path, missing),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("expected an environment error"),
    }
}

#[test]
fn test_symbol_file_is_added_and_search_path_rewritten() {
    let cdb = NamedTempFile::new().unwrap();
    let pdb = NamedTempFile::new().unwrap();
    let symbols = pdb.path().to_string_lossy().into_owned();
    let cache = RecordingCache::default();

    let windbg = WinDbg::with_runner(
        DumpTarget::new("TheCrasher.dmp", symbols.clone()),
        config_with(cdb.path()),
        FakeCdb::default(),
        &cache,
    )
    .unwrap();

    assert_eq!(*cache.added.borrow(), vec![pdb.path().to_path_buf()]);
    assert_eq!(
        windbg.target().symbols,
        format!("SRV*/tmp/DownstreamSymbols*{}*http://msdl.microsoft.com/download/symbols", symbols)
    );
}

#[test]
fn test_search_expression_is_not_added_to_cache() {
    let cdb = NamedTempFile::new().unwrap();
    let cache = RecordingCache::default();

    let windbg = WinDbg::with_runner(
        DumpTarget::new("TheCrasher.dmp", "srv*c:\\symbols"),
        config_with(cdb.path()),
        FakeCdb::default(),
        &cache,
    )
    .unwrap();

    assert!(cache.added.borrow().is_empty());
    assert!(windbg.target().symbols.contains("*srv*c:\\symbols*"));
}

#[test]
fn test_stack_trace() {
    let cdb = NamedTempFile::new().unwrap();
    let (windbg, runner) = open_fake(cdb.path(), "srv*c:\\symbols");

    let stack = windbg.stack_trace().unwrap();
    assert_eq!(stack.thread_id(), Some(3584));
    assert_eq!(stack.depth(), 2);

    let main = &stack.frames()[0];
    assert_eq!(main.module, "TheCrasher");
    assert_eq!(main.index, 0);
    assert_eq!(main.function.as_deref(), Some("main+0x1b"));
    assert_eq!(main.source_file.as_deref(), Some("c:\\users\\me\\thecrasher\\source.cpp"));
    assert_eq!(main.line, Some(43));
    assert!(!main.warning_about_correctness);
    assert_eq!(
        main.variables,
        vec![
            Variable::new("int", "argc", 1i64),
            Variable::new("char **", "argv", "0x032053f0"),
            Variable::new("char *", "p", "0x00000000 \"\""),
        ]
    );

    let thunk = &stack.frames()[1];
    assert_eq!(thunk.module, "KERNEL32");
    assert_eq!(thunk.function.as_deref(), Some("BaseThreadInitThunk+0x19"));
    assert_eq!(thunk.source_file, None);
    assert!(thunk.warning_about_correctness);
    assert!(thunk.variables.is_empty());

    // kcn, kpn, フレームごとの変数, ~.
    let recorded = runner.recorded.borrow();
    assert_eq!(recorded.len(), 5);
    for call in recorded.iter() {
        assert_eq!(call.program, cdb.path());
        assert_eq!(call.timeout, Some(Duration::from_secs(5)));
        assert!(call.symbols.starts_with("SRV*"));
        assert!(call.script.contains(";.symopt+0x10;"));
        assert!(call.script.contains(";.ecxr;"));
        assert!(call.script.ends_with(";q"));
    }
    assert!(recorded[2].script.contains(";.frame 0;"));
    assert!(recorded[3].script.contains(";.frame 1;"));
}

#[test]
fn test_raw_analysis_is_demarcated() {
    let cdb = NamedTempFile::new().unwrap();
    let (windbg, _) = open_fake(cdb.path(), "symbols");

    let analysis = windbg.raw_analysis().unwrap();
    assert!(analysis.starts_with("== Start Calling !analyze -v =="));
    assert!(analysis.ends_with("== End Calling .lastevent =="));
    assert!(analysis.contains(ANALYSIS));
    assert!(analysis.contains(LAST_EVENT));
    assert!(!analysis.contains("eax="));
    assert!(!analysis.contains("quit:"));
}

#[test]
fn test_run_commands_without_markers_returns_everything() {
    let cdb = NamedTempFile::new().unwrap();
    let (windbg, _) = open_fake(cdb.path(), "symbols");

    let options = ScriptOptions {
        header_footer: false,
        ..ScriptOptions::default()
    };
    let output = windbg.run_commands([".lastevent"], options).unwrap();
    assert!(output.starts_with("Microsoft (R) Windows Debugger"));
    assert!(output.contains(LAST_EVENT));
}

#[test]
fn test_timeout_is_propagated() {
    let cdb = NamedTempFile::new().unwrap();
    let windbg = WinDbg::with_runner(
        DumpTarget::new("TheCrasher.dmp", "symbols"),
        config_with(cdb.path()),
        HangingCdb,
        &RecordingCache::default(),
    )
    .unwrap();

    let err = windbg.stack_trace().unwrap_err();
    assert!(err.is_timeout());
    assert!(err.to_string().contains("kcn"));
}

#[test]
fn test_launch_interactive() {
    let cdb = NamedTempFile::new().unwrap();
    let (windbg, runner) = open_fake(cdb.path(), "symbols");

    windbg.launch_interactive().unwrap();

    let recorded = runner.recorded.borrow();
    let call = recorded.last().unwrap();
    assert_eq!(call.program, cdb.path().with_file_name("windbg.exe"));
    assert_eq!(call.timeout, None);
    assert!(call.script.contains(";.symopt+0x10;"));
    assert!(call.script.contains(";.ecxr;"));
    assert!(!call.script.ends_with(";q"));
}
