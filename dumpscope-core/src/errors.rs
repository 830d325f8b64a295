//! デバッガ操作のエラー型

use dumpscope_symstore::SymStoreError;
use dumpscope_target::TargetError;
use std::path::PathBuf;
use thiserror::Error;

/// デバッガ操作のエラー
///
/// どのエラーもその場では回復せず、そのまま呼び出し元に返します。
/// 出力の一部が解析できないこと（関数名やソース位置が無いなど）はエラーではありません。
#[derive(Error, Debug)]
pub enum Error {
    /// 外部デバッガが想定した場所に無い
    #[error("Could not find CDB: {}", path.display())]
    Environment { path: PathBuf },

    /// 外部デバッガの実行に失敗した（タイムアウト・0以外の終了コードなど）
    #[error(transparent)]
    Target(#[from] TargetError),

    /// ダウンストリームシンボルストアへの登録に失敗した
    #[error(transparent)]
    Symbols(#[from] SymStoreError),
}

impl Error {
    /// タイムアウトによるエラーかどうか
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Target(e) if e.is_timeout())
    }
}
