//! cdb コマンド

use dumpscope_transcript::script::COMMAND_SEPARATOR;
use std::fmt;

/// cdb に発行するコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 簡易形式のスタックトレース（フレーム番号付き）
    CompactStack,
    /// 引数・ソース位置付きのスタックトレース
    ExtendedStack,
    /// 指定したフレームを現在のフレームにする
    SetFrame(usize),
    /// 型情報付きでローカル変数を表示
    DisplayVariables,
    /// 現在のスレッドの状態表示
    CurrentThread,
    /// 自動クラッシュ解析
    Analyze,
    /// 最後のイベント表示
    LastEvent,
    /// そのまま渡すコマンド
    Raw(String),
}

impl Command {
    /// コマンド文字列をパースする
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let command = match parts.as_slice() {
            ["kcn"] => Command::CompactStack,
            ["kpn"] => Command::ExtendedStack,
            [".frame", n] => match n.parse() {
                Ok(n) => Command::SetFrame(n),
                Err(_) => Command::Raw(input.to_string()),
            },
            ["dv", "/t", "*"] => Command::DisplayVariables,
            ["~."] => Command::CurrentThread,
            ["!analyze", "-v"] => Command::Analyze,
            [".lastevent"] => Command::LastEvent,
            _ => Command::Raw(input.to_string()),
        };
        Some(command)
    }

    /// 区切り文字で連結されたコマンド列をパースする
    pub fn parse_batch(input: &str) -> Vec<Self> {
        input.split(COMMAND_SEPARATOR).filter_map(Self::parse).collect()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::CompactStack => write!(f, "kcn"),
            Command::ExtendedStack => write!(f, "kpn"),
            Command::SetFrame(n) => write!(f, ".frame {}", n),
            Command::DisplayVariables => write!(f, "dv /t *"),
            Command::CurrentThread => write!(f, "~."),
            Command::Analyze => write!(f, "!analyze -v"),
            Command::LastEvent => write!(f, ".lastevent"),
            Command::Raw(s) => write!(f, "{}", s),
        }
    }
}

impl From<Command> for String {
    fn from(command: Command) -> Self {
        command.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("kcn"), Some(Command::CompactStack));
        assert_eq!(Command::parse(" .frame 3 "), Some(Command::SetFrame(3)));
        assert_eq!(Command::parse("dv /t *"), Some(Command::DisplayVariables));
        assert_eq!(Command::parse("!analyze -v"), Some(Command::Analyze));
        assert_eq!(Command::parse("lm"), Some(Command::Raw("lm".to_string())));
        assert_eq!(Command::parse(".frame x"), Some(Command::Raw(".frame x".to_string())));
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_display_round_trips_parse() {
        for command in [
            Command::CompactStack,
            Command::ExtendedStack,
            Command::SetFrame(12),
            Command::DisplayVariables,
            Command::CurrentThread,
            Command::Analyze,
            Command::LastEvent,
        ] {
            assert_eq!(Command::parse(&command.to_string()), Some(command));
        }
    }

    #[test]
    fn test_parse_batch() {
        assert_eq!(
            Command::parse_batch("kcn; lm ;; ~."),
            vec![
                Command::CompactStack,
                Command::Raw("lm".to_string()),
                Command::CurrentThread
            ]
        );
    }
}
