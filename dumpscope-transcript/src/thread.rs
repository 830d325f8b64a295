//! 現在のスレッド情報（`~.`）の解析

use crate::parse::parse_hex_u32;

/// スレッド情報の行に含まれるトークン
const ID_TOKEN: &str = "Id";

/// スレッドIDを取り出す
///
/// `Id: <pid>.<tid>` の `<tid>` 部分を16進数として解釈します。
/// `Id` を含む行のうち最初にパースできたものを使い、見つからない場合は None を返します。
///
/// # Examples
/// ```
/// use dumpscope_transcript::parse_thread_id;
///
/// let output = ".  0  Id: 97cc.e00 Suspend: 0 Teb: 00f81000 Unfrozen";
/// assert_eq!(parse_thread_id(output), Some(0xe00));
/// ```
pub fn parse_thread_id(output: &str) -> Option<u32> {
    output.lines().find_map(parse_thread_line)
}

fn parse_thread_line(line: &str) -> Option<u32> {
    let (_, after_id) = line.split_once(ID_TOKEN)?;
    let (_, after_dot) = after_id.split_once('.')?;
    let tid = after_dot.split_whitespace().next()?;
    parse_hex_u32(tid)
}
