//! デバッガに渡すコマンドスクリプトと出力の切り出し
//!
//! デバッガとの間には構造化された通信路が無く、1回の起動で得られるのは
//! すべてのコマンドの出力が連結されたテキストだけです。
//! そこで各コマンドの前後に `.echo` で開始・終了マーカーを出力させ、
//! 目的のコマンドの出力範囲をマーカーで切り出します。

use tracing::debug;

/// コマンドの区切り文字
pub const COMMAND_SEPARATOR: &str = ";";

/// 行番号表示を有効にするコマンド（cdb では既定で無効）
pub const ENABLE_LINE_NUMBERS: &str = ".symopt+0x10";

/// 例外発生時のコンテキストへ移動するコマンド
pub const EXCEPTION_CONTEXT: &str = ".ecxr";

/// デバッガを終了するコマンド
pub const QUIT: &str = "q";

/// コマンドスクリプトの組み立てオプション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOptions {
    /// 先頭で例外コンテキストへ移動する
    pub goto_exception_context: bool,
    /// 各コマンドの前後にマーカーを出力する
    pub header_footer: bool,
    /// 最後にデバッガを終了する
    pub exit_after_commands: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            goto_exception_context: true,
            header_footer: true,
            exit_after_commands: true,
        }
    }
}

/// 組み立て済みのコマンドスクリプト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScript {
    /// マーカーを含む最終的なコマンド列
    commands: Vec<String>,
    /// 区切り文字で連結したもの（デバッガの引数に渡す文字列）
    joined: String,
    header: Option<String>,
    footer: Option<String>,
}

impl CommandScript {
    /// コマンドリストからスクリプトを組み立てる
    ///
    /// 先頭に行番号の有効化、続いて（無効化されていなければ）例外コンテキストへの
    /// 移動が自動で追加されます。自動追加されたコマンドはヘッダーの対象外です。
    pub fn build<I, S>(commands: I, options: ScriptOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = vec![ENABLE_LINE_NUMBERS.to_string()];
        if options.goto_exception_context {
            list.push(EXCEPTION_CONTEXT.to_string());
        }
        let setup_count = list.len();

        list.extend(commands.into_iter().map(Into::into));
        if options.exit_after_commands {
            list.push(QUIT.to_string());
        }

        let mut header = None;
        let mut footer = None;

        let commands = if options.header_footer {
            let mut framed = Vec::with_capacity(list.len() * 3);
            for (i, command) in list.into_iter().enumerate() {
                let start = start_marker(&command);
                framed.push(echo(&start));

                // ヘッダーは最初の呼び出し元コマンドのみ
                if header.is_none() && i >= setup_count {
                    header = Some(start);
                }

                // 終了コマンドの後には何も実行されない
                let is_quit = command == QUIT;
                let end = end_marker(&command);
                framed.push(command);
                if !is_quit {
                    framed.push(echo(&end));
                    footer = Some(end);
                }
            }
            framed
        } else {
            list
        };

        let joined = commands.join(COMMAND_SEPARATOR);

        Self {
            commands,
            joined,
            header,
            footer,
        }
    }

    /// デバッガに渡す連結済み文字列を取得する
    pub fn joined(&self) -> &str {
        &self.joined
    }

    /// マーカーを含む最終的なコマンド列を取得する
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// ヘッダーマーカー（最初の呼び出し元コマンドの開始マーカー）
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// フッターマーカー（最後の終了マーカー）
    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    /// 出力全体から目的のコマンドの出力範囲を切り出す
    ///
    /// デバッガはコマンドラインをエコーするので、まず連結済み文字列の最後の出現位置の後ろに進み、
    /// そこからヘッダーとフッターに挟まれた範囲をマーカーごと返します。
    /// どちらかのマーカーが見つからない場合は出力全体をそのまま返します。
    pub fn demarcate<'a>(&self, transcript: &'a str) -> &'a str {
        let (header, footer) = match (&self.header, &self.footer) {
            (Some(h), Some(f)) => (h.as_str(), f.as_str()),
            _ => return transcript,
        };

        let search_from = transcript
            .rfind(self.joined.as_str())
            .map(|pos| pos + self.joined.len())
            .unwrap_or(0);

        match frame_between(transcript, search_from, header, footer) {
            Some(range) => &transcript[range],
            None => {
                debug!(header, footer, "output markers not found, using full transcript");
                transcript
            }
        }
    }
}

/// `from` 以降で最初の `header` から、その後の最初の `footer` の末尾までの範囲
fn frame_between(
    text: &str,
    from: usize,
    header: &str,
    footer: &str,
) -> Option<std::ops::Range<usize>> {
    let start = from + text[from..].find(header)?;
    let after_header = start + header.len();
    let end = after_header + text[after_header..].find(footer)? + footer.len();
    Some(start..end)
}

/// 開始マーカー
pub fn start_marker(command: &str) -> String {
    format!("== Start Calling {} ==", command)
}

/// 終了マーカー
pub fn end_marker(command: &str) -> String {
    format!("== End Calling {} ==", command)
}

fn echo(marker: &str) -> String {
    format!(".echo {}", marker)
}
