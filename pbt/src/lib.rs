//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// ヘッダー生成
// ========================================

/// フレーミングに影響しない拡張ヘッダー名
pub fn extension_header_name() -> impl Strategy<Value = String> {
    "X-[A-Za-z]{1,12}".prop_map(|s| s)
}

/// ヘッダー値 (CR / LF を含まない)
pub fn header_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ;=/.-]{0,32}".prop_map(|s| s)
}

/// 拡張ヘッダーの並び
pub fn extension_headers() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((extension_header_name(), header_value()), 0..6)
}

/// ボディ
pub fn arb_body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..512)
}

/// 空でないチャンクの並び
pub fn arb_chunks() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..128), 0..6)
}

// ========================================
// レスポンス組み立て
// ========================================

/// ステータスラインとヘッダーを組み立てる (空行まで)
pub fn response_head(status_line: &str, headers: &[(String, String)]) -> Vec<u8> {
    let mut head = format!("{}\r\n", status_line);
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    head.into_bytes()
}

/// チャンク列をチャンク転送の形式にエンコードする
pub fn chunked_body(chunks: &[Vec<u8>], uppercase: bool) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in chunks {
        let size = if uppercase {
            format!("{:X}\r\n", chunk.len())
        } else {
            format!("{:x}\r\n", chunk.len())
        };
        out.extend_from_slice(size.as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

/// `data` を `cuts` の位置で分割する
///
/// `cuts` の各値は `data.len()` で割った余りを分割位置として使う。
pub fn split_at_points(data: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![Vec::new()];
    }
    let mut points: Vec<usize> = cuts.iter().map(|c| c % data.len()).collect();
    points.sort_unstable();
    points.dedup();

    let mut fragments = Vec::new();
    let mut start = 0;
    for point in points {
        if point > start {
            fragments.push(data[start..point].to_vec());
            start = point;
        }
    }
    fragments.push(data[start..].to_vec());
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_preserves_bytes() {
        let data = b"abcdefgh";
        let fragments = split_at_points(data, &[3, 3, 11, 0]);
        assert_eq!(fragments.concat(), data);
        assert_eq!(fragments, vec![b"abc".to_vec(), b"defgh".to_vec()]);
    }

    #[test]
    fn chunked_body_format() {
        let encoded = chunked_body(&[b"Wiki".to_vec(), vec![0; 26]], true);
        assert!(encoded.starts_with(b"4\r\nWiki\r\n1A\r\n"));
        assert!(encoded.ends_with(b"\r\n0\r\n\r\n"));
        assert!(chunked_body(&[], false).starts_with(b"0\r\n\r\n"));
    }
}
