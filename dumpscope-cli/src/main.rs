//! dumpscope CLI - コマンドラインインターフェース
//!
//! cdb/WinDbg を使ったクラッシュダンプ解析のコマンドと REPL インターフェース

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dumpscope_core::{
    Command, Debugger, DumpTarget, ScriptOptions, SymbolCache, SymbolStore, WinDbg, WinDbgConfig,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// dumpscope - Crash dump analysis with cdb/WinDbg
#[derive(Parser)]
#[command(name = "dumpscope")]
#[command(version = "0.1.0")]
#[command(about = "Scripted crash dump analysis through cdb/WinDbg", long_about = None)]
struct Cli {
    /// Path to cdb.exe (windbg.exe is expected next to it)
    #[arg(long, global = true, env = "DUMPSCOPE_CDB")]
    cdb: Option<PathBuf>,

    /// Root of the downstream symbol store
    #[arg(long, global = true, env = "DUMPSCOPE_DOWNSTREAM")]
    downstream: Option<PathBuf>,

    /// Timeout in seconds for each scripted debugger run [default: $DUMPSCOPE_TIMEOUT or 60]
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log filter (e.g. "debug", "dumpscope_core=trace")
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: DumpCommand,
}

#[derive(Args)]
struct TargetArgs {
    /// Path to the crash dump
    dump: PathBuf,

    /// Symbols file or symbol search expression
    #[arg(short, long)]
    symbols: String,

    /// Path to the executable image
    #[arg(short, long)]
    exe: Option<PathBuf>,
}

#[derive(Subcommand)]
enum DumpCommand {
    /// Print the stack trace of the faulting thread
    Stack {
        #[command(flatten)]
        target: TargetArgs,

        /// Print the stack as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the debugger's automated crash analysis
    Analyze {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Open the crash dump in WinDbg
    Launch {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run cdb commands interactively against the crash dump
    Shell {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Manage the downstream symbol store
    Symbols {
        #[command(subcommand)]
        command: SymbolsCommand,
    },
}

#[derive(Subcommand)]
enum SymbolsCommand {
    /// Add a symbols file or executable to the store
    Add {
        file: PathBuf,
    },

    /// Resolve a symbol server request path (name/KEY/name) inside the store
    Lookup {
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let config = load_config(&cli);
    debug!(?config, "loaded configuration");

    match cli.command {
        DumpCommand::Stack { target, json } => {
            let windbg = open(target, config)?;
            let stack = windbg.stack_trace().context("Failed to read the stack trace")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stack)?);
            } else {
                print!("{}", stack);
            }
        }
        DumpCommand::Analyze { target } => {
            let windbg = open(target, config)?;
            let analysis = windbg.raw_analysis().context("Failed to analyze the crash dump")?;
            println!("{}", analysis);
        }
        DumpCommand::Launch { target } => {
            let windbg = open(target, config)?;
            windbg.launch_interactive().context("Failed to launch WinDbg")?;
        }
        DumpCommand::Shell { target } => {
            let windbg = open(target, config)?;
            run_repl(&windbg)?;
        }
        DumpCommand::Symbols { command } => {
            let store = SymbolStore::new(config.downstream_symbols);
            handle_symbols(&store, command)?;
        }
    }

    Ok(())
}

/// ログ出力を初期化する（既定は warn 以上を標準エラーへ）
fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(filter) => EnvFilter::try_new(filter)
            .with_context(|| format!("Invalid log filter: {}", filter))?,
        None => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// 環境変数の設定にコマンドラインの指定を上書きする
fn load_config(cli: &Cli) -> WinDbgConfig {
    let mut config = WinDbgConfig::from_env();

    if let Some(cdb) = &cli.cdb {
        config.cdb_path = cdb.clone();
    }
    if let Some(downstream) = &cli.downstream {
        config.downstream_symbols = downstream.clone();
    }
    if let Some(secs) = cli.timeout {
        config.command_timeout = Duration::from_secs(secs);
    }

    config
}

/// 解析対象を開く
fn open(args: TargetArgs, config: WinDbgConfig) -> Result<WinDbg> {
    let mut target = DumpTarget::new(args.dump, args.symbols);
    if let Some(exe) = args.exe {
        target = target.with_executable(exe);
    }

    let dump = target.crash_dump.display().to_string();
    WinDbg::open(target, config).with_context(|| format!("Failed to open {}", dump))
}

fn handle_symbols(store: &SymbolStore, command: SymbolsCommand) -> Result<()> {
    match command {
        SymbolsCommand::Add { file } => {
            let stored = store
                .add(&file, false)
                .with_context(|| format!("Failed to add {} to the symbol store", file.display()))?;
            println!("{}", stored.display());
        }
        SymbolsCommand::Lookup { path } => match store.lookup(&path) {
            Some(found) => println!("{}", found.display()),
            None => bail!("{} is not in the symbol store at {}", path, store.root().display()),
        },
    }
    Ok(())
}

/// REPLループを実行する
fn run_repl(windbg: &WinDbg) -> Result<()> {
    println!("dumpscope - {}", windbg.target().crash_dump.display());
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let readline = rl.readline("(dumpscope) ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                match line {
                    "help" => print_help(),
                    "quit" | "exit" => break,
                    _ => {
                        if let Err(e) = handle_command(windbg, line) {
                            eprintln!("Error: {:#}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn handle_command(windbg: &WinDbg, line: &str) -> Result<()> {
    match line {
        "stack" => print!("{}", windbg.stack_trace()?),
        "analyze" => println!("{}", windbg.raw_analysis()?),
        _ => {
            let commands = Command::parse_batch(line);
            let output = windbg.run_commands(commands, ScriptOptions::default())?;
            println!("{}", output);
        }
    }
    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!();
    println!("  help           - Show this help message");
    println!("  quit/exit      - Exit the shell");
    println!();
    println!("Analysis commands:");
    println!("  stack          - Show the parsed stack trace");
    println!("  analyze        - Show the automated crash analysis");
    println!("  <cmd>[; <cmd>] - Run cdb commands and show their output");
    println!();
    println!("Examples:");
    println!("  kpn");
    println!("  .frame 1; dv /t *");
    println!("  lm");
}
