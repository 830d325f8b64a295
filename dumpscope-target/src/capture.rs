//! デバッガ出力を受け取る一時ログファイル

use crate::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tempfile::TempPath;

/// 一時ファイル名のプレフィックス
const CAPTURE_PREFIX: &str = "pda_";

/// 1回の呼び出しごとに作成される一時ログファイル
///
/// 外部デバッガはこのパスにログを書き込みます。
/// ドロップ時にファイルは削除されます（削除エラーは無視されます）。
/// 失敗やタイムアウトの経路でも必ず後始末されます。
pub struct CaptureLog {
    path: TempPath,
}

impl CaptureLog {
    /// 一意な名前の一時ログファイルを作成する
    pub fn new() -> Result<Self> {
        let path = tempfile::Builder::new()
            .prefix(CAPTURE_PREFIX)
            .suffix(".log")
            .tempfile()?
            .into_temp_path();
        Ok(Self { path })
    }

    /// ログファイルのパスを取得する
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 書き込まれた内容を読み取る
    ///
    /// ファイルが存在しない場合は空文字列として扱います。
    /// 不正な UTF-8 は置換文字に変換されます。
    pub fn read(&self) -> Result<String> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}
