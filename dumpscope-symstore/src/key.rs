//! シンボルストアのキー計算

use crate::{Result, SymStoreError};
use std::path::Path;
use symbolic_debuginfo::{FileFormat, Object};

/// ファイル内容からシンボルストアのキーを求める
///
/// - PE: `TimeDateStamp`（8桁16進）+ `SizeOfImage`（16進）
/// - PDB などそれ以外: GUID（ハイフン無し）+ age（breakpad 形式）
///
/// キーは大文字で返します。
pub fn symbol_store_key(path: &Path, data: &[u8]) -> Result<String> {
    let object = Object::parse(data).map_err(|e| SymStoreError::UnknownObject {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let code_key = match object.file_format() {
        FileFormat::Pe => object.code_id().map(|id| id.as_str().to_string()),
        _ => None,
    };

    let key = match code_key {
        Some(key) => key,
        None => {
            let debug_id = object.debug_id();
            if debug_id.is_nil() {
                return Err(SymStoreError::UnknownObject {
                    path: path.to_path_buf(),
                    message: "no debug identifier".to_string(),
                });
            }
            debug_id.breakpad().to_string()
        }
    };

    Ok(key.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpad_symbol_key() {
        let data = b"MODULE windows x86 3249d99d0c4049318610f4e4fb0b69361 TheCrasher.pdb\n";
        let key = symbol_store_key(Path::new("TheCrasher.sym"), data).unwrap();
        assert_eq!(key, "3249D99D0C4049318610F4E4FB0B69361");
    }

    #[test]
    fn test_unknown_object() {
        let err = symbol_store_key(Path::new("notes.txt"), b"just some text").unwrap_err();
        assert!(matches!(err, SymStoreError::UnknownObject { .. }));
    }
}
