//! スタック・フレーム・変数の値型

use serde::Serialize;
use std::fmt;

/// 変数の値
///
/// デバッガは符号付き10進数に `0n` プレフィックスを付けて表示します。
/// 整数として解釈するのはその形式だけで、ポインタや文字列は生のテキストのまま保持します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Integer(i64),
    Text(String),
}

impl VariableValue {
    /// 整数値であれば取得する
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            VariableValue::Integer(i) => Some(*i),
            VariableValue::Text(_) => None,
        }
    }

    /// テキスト値であれば取得する
    pub fn as_text(&self) -> Option<&str> {
        match self {
            VariableValue::Integer(_) => None,
            VariableValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VariableValue::Integer(i) => write!(f, "{}", i),
            VariableValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Integer(value)
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Text(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Text(value.to_string())
    }
}

/// ローカル変数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// 型名（例: `char *`）
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub value: VariableValue,
}

impl Variable {
    /// 変数を作成する
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<VariableValue>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// スタックフレーム
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub module: String,
    /// 0 が最も内側（現在）のフレーム
    pub index: usize,
    /// `module!function` 形式でない場合は None
    pub function: Option<String>,
    pub source_file: Option<String>,
    pub line: Option<u32>,
    pub variables: Vec<Variable>,
    /// アンワインド情報が利用できず、内容が不正確な可能性がある
    pub warning_about_correctness: bool,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02} {}", self.index, self.module)?;
        if let Some(function) = &self.function {
            write!(f, "!{}", function)?;
        }
        if let Some(file) = &self.source_file {
            write!(f, " [{}", file)?;
            if let Some(line) = self.line {
                write!(f, " @ {}", line)?;
            }
            write!(f, "]")?;
        }
        if self.warning_about_correctness {
            write!(f, " (unwind information not available)")?;
        }
        Ok(())
    }
}

/// キャプチャされたスタック全体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    frames: Vec<Frame>,
    thread_id: Option<u32>,
}

impl Stack {
    /// スタックを作成する
    pub fn new(frames: Vec<Frame>, thread_id: Option<u32>) -> Self {
        Self { frames, thread_id }
    }

    /// 全てのフレームを取得する
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// スレッドIDを取得する
    pub fn thread_id(&self) -> Option<u32> {
        self.thread_id
    }

    /// スタックが空かどうか
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// スタックの深さ
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.thread_id {
            Some(tid) => writeln!(f, "Thread 0x{:x} ({})", tid, tid)?,
            None => writeln!(f, "Thread <unknown>")?,
        }
        for frame in &self.frames {
            writeln!(f, "{}", frame)?;
            for var in &frame.variables {
                writeln!(f, "      {} {} = {}", var.type_name, var.name, var.value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame {
            module: "TheCrasher".to_string(),
            index: 0,
            function: Some("main+0x1b".to_string()),
            source_file: Some(r"c:\src\source.cpp".to_string()),
            line: Some(43),
            variables: vec![Variable::new("int", "argc", 1i64)],
            warning_about_correctness: false,
        }
    }

    #[test]
    fn test_frame_display() {
        assert_eq!(
            frame().to_string(),
            r"#00 TheCrasher!main+0x1b [c:\src\source.cpp @ 43]"
        );
    }

    #[test]
    fn test_stack_display() {
        let stack = Stack::new(vec![frame()], Some(0xe00));
        let text = stack.to_string();
        assert!(text.starts_with("Thread 0xe00 (3584)\n"));
        assert!(text.contains("      int argc = 1\n"));
    }

    #[test]
    fn test_variable_value_accessors() {
        assert_eq!(VariableValue::Integer(5).as_integer(), Some(5));
        assert_eq!(VariableValue::from("0x0").as_text(), Some("0x0"));
        assert_eq!(VariableValue::from("0x0").as_integer(), None);
    }
}
