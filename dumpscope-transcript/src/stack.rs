//! スタックトレース出力の解析

use crate::parse::{is_address_column, parse_frame_index};
use crate::{Frame, Variable};
use regex::Regex;

/// スタックの最大深さ
pub const MAX_STACK_DEPTH: usize = 100;

/// アンワインド情報が無いことを示すデバッガの通知
pub const UNWIND_UNAVAILABLE_NOTICE: &str = "Stack unwind information not available";

/// 行頭のフレーム番号と関数記述子の間にあるアドレス列の最大数
const MAX_ADDRESS_COLUMNS: usize = 2;

/// スタックトレース行のパーサー
pub struct StackParser {
    /// 拡張形式の行末にある `[<file> @ <line>]` の `@ <line>]` 部分
    source_location: Regex,
}

impl StackParser {
    /// パーサーを作成する
    pub fn new() -> Result<Self, regex::Error> {
        // 例: [c:\users\me\projects\thecrasher\source.cpp @ 43] の "@ 43]" 部分
        let source_location = Regex::new(r"@\s*(?P<line>\d+)\s*\]")?;
        Ok(Self { source_location })
    }

    /// 指定したフレーム番号の行を探す
    ///
    /// 空行は無視します。アンワインド情報が無いという通知行を見つけた場合は
    /// 警告フラグを立て、それ以降に見つかったフレームに適用します。
    /// 見つからない場合は None を返します。
    pub fn find_frame_line<'a>(&self, index: usize, trace: &'a str) -> Option<(&'a str, bool)> {
        let mut warning = false;

        for line in trace.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.contains(UNWIND_UNAVAILABLE_NOTICE) {
                warning = true;
                continue;
            }

            let first = match line.split_whitespace().next() {
                Some(token) => token,
                None => continue,
            };

            if parse_frame_index(first) == Some(index) {
                return Some((line, warning));
            }
        }

        None
    }

    /// `module!function` 記述子を分解する
    ///
    /// フレーム番号の後ろにあるアドレス列は読み飛ばします。
    /// `!` が無い場合はトークン全体をモジュール名とし、関数名は None になります。
    /// 記述子が無い行ではモジュール名は空文字列になります。
    pub fn parse_descriptor(&self, line: &str) -> (String, Option<String>) {
        let tokens: Vec<&str> = line.split_whitespace().skip(1).collect();

        let mut pos = 0;
        while pos < MAX_ADDRESS_COLUMNS
            && pos + 1 < tokens.len()
            && !tokens[pos].contains('!')
            && is_address_column(tokens[pos])
        {
            pos += 1;
        }

        match tokens.get(pos) {
            Some(descriptor) => match descriptor.split_once('!') {
                Some((module, function)) => (module.to_string(), Some(function.to_string())),
                None => (descriptor.to_string(), None),
            },
            None => (String::new(), None),
        }
    }

    /// 拡張形式の行からソースファイルと行番号を取り出す
    ///
    /// ファイルパスは括弧を含むことがあるので、最後の `@ <line>]` から
    /// 対応する開き括弧まで遡って取り出します。
    pub fn parse_source_location(&self, line: &str) -> Option<(String, u32)> {
        let caps = self.source_location.captures_iter(line).last()?;
        let at = caps.get(0)?.start();
        let number = caps.name("line")?.as_str().parse().ok()?;
        let open = find_open_bracket(&line[..at])?;
        let file = line[open + 1..at].trim();
        Some((file.to_string(), number))
    }

    /// 簡易形式と拡張形式のスタックトレースからフレーム列を組み立てる
    ///
    /// フレーム番号 0 から順に探し、行が見つからない番号か
    /// [`MAX_STACK_DEPTH`] に達した時点で終了します。
    /// 各フレームの変数は `variables_for` から取得します。
    pub fn assemble_frames<E, F>(
        &self,
        compact: &str,
        extended: &str,
        mut variables_for: F,
    ) -> Result<Vec<Frame>, E>
    where
        F: FnMut(usize) -> Result<Vec<Variable>, E>,
    {
        let mut frames = Vec::new();

        for index in 0..MAX_STACK_DEPTH {
            let (line, warning) = match self.find_frame_line(index, compact) {
                Some(found) => found,
                None => break,
            };

            let (module, function) = self.parse_descriptor(line);

            let (source_file, source_line) = match self
                .find_frame_line(index, extended)
                .and_then(|(ext, _)| self.parse_source_location(ext))
            {
                Some((file, line)) => (Some(file), Some(line)),
                None => (None, None),
            };

            let variables = variables_for(index)?;

            frames.push(Frame {
                module,
                index,
                function,
                source_file,
                line: source_line,
                variables,
                warning_about_correctness: warning,
            });
        }

        Ok(frames)
    }
}

/// 末尾から見て対応の取れていない開き括弧の位置
fn find_open_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            ']' => depth += 1,
            '[' if depth == 0 => return Some(i),
            '[' => depth -= 1,
            _ => {}
        }
    }
    None
}

impl Default for StackParser {
    fn default() -> Self {
        Self::new().expect("Failed to create StackParser")
    }
}
