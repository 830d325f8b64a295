//! dumpscope デバッガ出力（トランスクリプト）解析
//!
//! このクレートは、外部デバッガに渡すコマンドスクリプトの組み立てと、
//! デバッガが出力したテキストの解析機能を提供します。
//! マーカーによる出力の切り出し、スタックフレーム・ローカル変数・スレッドIDの
//! 抽出などを行います。

pub mod parse;
pub mod script;
pub mod stack;
pub mod thread;
pub mod types;
pub mod variables;

pub use script::{CommandScript, ScriptOptions};
pub use stack::{StackParser, MAX_STACK_DEPTH};
pub use thread::parse_thread_id;
pub use types::{Frame, Stack, Variable, VariableValue};
pub use variables::{parse_variable_line, parse_variables};
