//! dumpscope ダウンストリームシンボルストア
//!
//! デバッガやデバッグクライアントがシンボルを解決できるように、
//! シンボルファイル・実行ファイルを Windows シンボルストアと同じ
//! `<ファイル名>/<キー>/<ファイル名>` のディレクトリ構成で保存します。
//! シンボルサーバーとして再配布するためのパス解決も提供します。

pub mod errors;
pub mod key;
pub mod store;

pub use errors::SymStoreError;
pub use key::symbol_store_key;
pub use store::{SymbolCache, SymbolStore};

/// シンボルストア操作の結果型
pub type Result<T> = std::result::Result<T, SymStoreError>;
