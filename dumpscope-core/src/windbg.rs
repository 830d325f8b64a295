//! WinDbg（cdb）バックエンド

use crate::{
    Command, Debugger, DumpTarget, Error, Invocation, ProcessRunner, Result, ScriptRunner,
    WinDbgConfig,
};
use dumpscope_symstore::{SymbolCache, SymbolStore};
use dumpscope_transcript::script::start_marker;
use dumpscope_transcript::{
    parse_thread_id, parse_variables, CommandScript, ScriptOptions, Stack, StackParser,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// cdb を使ってクラッシュダンプを解析するデバッガ
///
/// 構築時にシンボルの準備を1度だけ行い、以降の操作では毎回 cdb を起動して
/// コマンドスクリプトを実行します。
pub struct WinDbg<R = ProcessRunner> {
    /// 解析対象（シンボルは検索式に置き換え済み）
    target: DumpTarget,
    config: WinDbgConfig,
    runner: R,
    parser: StackParser,
}

impl WinDbg<ProcessRunner> {
    /// 解析対象を開く
    ///
    /// シンボルファイルは設定のダウンストリームストアに登録されます。
    pub fn open(target: DumpTarget, config: WinDbgConfig) -> Result<Self> {
        let store = SymbolStore::new(config.downstream_symbols.clone());
        Self::with_runner(target, config, ProcessRunner, &store)
    }
}

impl<R: ScriptRunner> WinDbg<R> {
    /// 実行方法とシンボルキャッシュを指定して解析対象を開く
    ///
    /// cdb が見つからない場合は [`Error::Environment`] を返します。
    /// シンボルの参照がファイルであればキャッシュに登録し、参照を
    /// ダウンストリームストア・元の参照・上流サーバーの検索式に置き換えます。
    pub fn with_runner(
        mut target: DumpTarget,
        config: WinDbgConfig,
        runner: R,
        cache: &dyn SymbolCache,
    ) -> Result<Self> {
        if !config.cdb_path.is_file() {
            return Err(Error::Environment {
                path: config.cdb_path.clone(),
            });
        }

        let symbols = Path::new(&target.symbols);
        if symbols.is_file() {
            let stored = cache.add(symbols, false)?;
            debug!(
                symbols = %target.symbols,
                stored = %stored.display(),
                "added symbols to downstream store"
            );
        }
        target.symbols = config.symbol_search_path(&target.symbols);
        info!(dump = %target.crash_dump.display(), symbols = %target.symbols, "opened crash dump");

        Ok(Self {
            target,
            config,
            runner,
            parser: StackParser::default(),
        })
    }

    /// 解析対象（シンボルは検索式に置き換え済み）
    pub fn target(&self) -> &DumpTarget {
        &self.target
    }

    pub fn config(&self) -> &WinDbgConfig {
        &self.config
    }

    /// コマンド列を実行し、マーカーで切り出した出力を返す
    pub fn run_commands<I, S>(&self, commands: I, options: ScriptOptions) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = CommandScript::build(commands, options);
        let output = self.execute(
            &self.config.cdb_path,
            &script,
            Some(self.config.command_timeout),
        )?;
        Ok(script.demarcate(&output).to_string())
    }

    /// 対話用デバッガ（windbg.exe）を起動し、終了するまで待つ
    ///
    /// 初期化コマンドのみを実行し、終了コマンドは追加しません。
    pub fn launch_interactive(&self) -> Result<()> {
        let options = ScriptOptions {
            exit_after_commands: false,
            ..ScriptOptions::default()
        };
        let script = CommandScript::build(Vec::<String>::new(), options);
        let program = self.config.windbg_path();

        info!(program = %program.display(), "launching interactive debugger");
        self.execute(&program, &script, None)?;
        Ok(())
    }

    fn execute(
        &self,
        program: &Path,
        script: &CommandScript,
        timeout: Option<Duration>,
    ) -> Result<String> {
        debug!(program = %program.display(), script = script.joined(), "running debugger script");
        self.runner.run(&Invocation {
            program,
            target: &self.target,
            script,
            timeout,
            poll_interval: self.config.poll_interval,
        })
    }

    fn run(&self, commands: &[Command]) -> Result<String> {
        self.run_commands(commands.iter().map(Command::to_string), ScriptOptions::default())
    }
}

impl<R: ScriptRunner> Debugger for WinDbg<R> {
    #[instrument(skip(self))]
    fn stack_trace(&self) -> Result<Stack> {
        let compact = self.run(&[Command::CompactStack])?;
        let extended = self.run(&[Command::ExtendedStack])?;

        let frames = self.parser.assemble_frames(&compact, &extended, |index| {
            let output = self.run(&[Command::SetFrame(index), Command::DisplayVariables])?;
            // .frame の出力は変数の解析対象外
            let marker = start_marker(&Command::DisplayVariables.to_string());
            let section = output.find(&marker).map_or(&output[..], |pos| &output[pos..]);
            Ok::<_, Error>(parse_variables(section))
        })?;

        let thread_id = parse_thread_id(&self.run(&[Command::CurrentThread])?);
        debug!(depth = frames.len(), ?thread_id, "parsed stack trace");

        Ok(Stack::new(frames, thread_id))
    }

    #[instrument(skip(self))]
    fn raw_analysis(&self) -> Result<String> {
        self.run(&[Command::Analyze, Command::LastEvent])
    }
}
