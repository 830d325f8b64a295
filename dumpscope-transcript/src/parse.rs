//! トークン単位のパースユーティリティ

/// デバッガが符号付き10進数に付けるプレフィックス
pub const SIGNED_DECIMAL_PREFIX: &str = "0n";

/// フレーム番号（10進数）をパース
///
/// # Examples
/// ```
/// use dumpscope_transcript::parse::parse_frame_index;
///
/// assert_eq!(parse_frame_index("00"), Some(0));
/// assert_eq!(parse_frame_index("12"), Some(12));
/// assert_eq!(parse_frame_index("=="), None);
/// ```
pub fn parse_frame_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// `0n` プレフィックス付きの符号付き10進数をパース
///
/// プレフィックスが無い場合やパースできない場合は None を返します。
///
/// # Examples
/// ```
/// use dumpscope_transcript::parse::parse_signed_decimal;
///
/// assert_eq!(parse_signed_decimal("0n1"), Some(1));
/// assert_eq!(parse_signed_decimal("0n-42"), Some(-42));
/// assert_eq!(parse_signed_decimal("0x032053f0"), None);
/// ```
pub fn parse_signed_decimal(s: &str) -> Option<i64> {
    s.strip_prefix(SIGNED_DECIMAL_PREFIX)?.trim().parse().ok()
}

/// 16進数をパース（0xプレフィックスは任意）
///
/// # Examples
/// ```
/// use dumpscope_transcript::parse::parse_hex_u32;
///
/// assert_eq!(parse_hex_u32("e00"), Some(0xe00));
/// assert_eq!(parse_hex_u32("0x97CC"), Some(0x97cc));
/// ```
pub fn parse_hex_u32(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

/// スタック行のアドレス列（Child-SP / RetAddr）かどうか
///
/// 32bit は `010ffc14` のような8桁、64bit は `00000000`0019ff70` のように
/// バッククォートで区切られた16桁で表示されます。
pub fn is_address_column(token: &str) -> bool {
    let digits: String = token.chars().filter(|&c| c != '`').collect();
    matches!(digits.len(), 8 | 16) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
