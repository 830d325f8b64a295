//! シンボルストア本体

use crate::{symbol_store_key, Result, SymStoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// シンボルファイルを登録できるキャッシュ
pub trait SymbolCache {
    /// シンボルファイルを登録し、保存先のパスを返す
    fn add(&self, path: &Path, compressed: bool) -> Result<PathBuf>;
}

/// `<root>/<ファイル名>/<キー>/<ファイル名>` 構成のシンボルストア
#[derive(Debug, Clone)]
pub struct SymbolStore {
    root: PathBuf,
}

impl SymbolStore {
    /// ルートディレクトリを指定して作成する（ディレクトリは必要になった時点で作成される）
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// ルートディレクトリを取得する
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// シンボルサーバーへのリクエストパスからストア内のファイルを探す
    ///
    /// `TheCrasher.pdb/3249D99D0C4049318610F4E4FB0B69361/TheCrasher.pdb` のような
    /// 相対パスを受け付けます。区切りは `/` と `\` のどちらでも構いません。
    /// 大文字小文字は区別しません。
    /// 絶対パスや `..` を含むパスは拒否し、None を返します。
    pub fn lookup(&self, request: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = request
            .split(|c: char| c == '/' || c == '\\')
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() || !segments.iter().all(|s| is_plain_segment(s)) {
            debug!(request, "rejected symbol request path");
            return None;
        }

        let mut current = self.root.clone();
        for segment in segments {
            current = resolve_segment(&current, segment)?;
        }

        current.is_file().then_some(current)
    }
}

impl SymbolCache for SymbolStore {
    fn add(&self, path: &Path, compressed: bool) -> Result<PathBuf> {
        // 圧縮形式（.pd_ など）は cab 形式が必要になる
        if compressed {
            return Err(SymStoreError::CompressionUnsupported(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| SymStoreError::InvalidPath(path.to_path_buf()))?;

        let data = fs::read(path)?;
        let key = symbol_store_key(path, &data)?;

        let dir = self.root.join(file_name).join(&key);
        let dest = dir.join(file_name);

        if dest.is_file() {
            debug!(dest = ?dest, "symbol file already in store");
            return Ok(dest);
        }

        fs::create_dir_all(&dir)?;

        // 他のセッションに書きかけのファイルを見せないよう、一時ファイル経由で置き換える
        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(&data)?;
        match temp.persist_noclobber(&dest) {
            Ok(_) => info!(src = ?path, dest = ?dest, "added symbol file to store"),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!(dest = ?dest, "symbol file was added concurrently");
            }
            Err(e) => return Err(e.error.into()),
        }

        Ok(dest)
    }
}

/// 1階層分のパス要素として安全かどうか
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains(':') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// 大文字小文字を区別せずにディレクトリ内の要素を探す
fn resolve_segment(dir: &Path, segment: &str) -> Option<PathBuf> {
    let exact = dir.join(segment);
    if exact.exists() {
        return Some(exact);
    }

    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_name().to_string_lossy().eq_ignore_ascii_case(segment))
        .map(|entry| entry.path())
}
