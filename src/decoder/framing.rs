//! ボディのフレーミング判定

use crate::error::Error;
use crate::response::header_lines;

/// ボディのフレーミング方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Transfer-Encoding: chunked
    Chunked,
    /// Content-Length で指定された固定長
    ContentLength(usize),
    /// 接続が閉じるまでがボディ (close-delimited)
    CloseDelimited,
}

/// バッファ済みのヘッダーブロックからフレーミング方式を決定する
///
/// 1. Transfer-Encoding に chunked トークンがあれば chunked
/// 2. Content-Length が数字のみで構成されていれば固定長
/// 3. それ以外は close-delimited
///
/// Content-Length が複数ある場合 (ヘッダーの重複、`5, 5` のようなリスト) は
/// すべて同じ値であればその値を使い、異なる値が混ざっていればエラー。
/// 数字以外を含む Content-Length は存在しないものとして扱う。
/// 数字のみでも `usize` に収まらない場合はエラー。
pub(crate) fn determine_framing(headers: &[u8]) -> Result<Framing, Error> {
    if is_chunked(headers) {
        return Ok(Framing::Chunked);
    }

    match content_length(headers)? {
        Some(len) => Ok(Framing::ContentLength(len)),
        None => Ok(Framing::CloseDelimited),
    }
}

fn is_chunked(headers: &[u8]) -> bool {
    header_lines(headers)
        .filter(|(name, _)| name.eq_ignore_ascii_case(b"Transfer-Encoding"))
        .flat_map(|(_, value)| value.split(|b| *b == b','))
        .any(|token| token.trim_ascii().eq_ignore_ascii_case(b"chunked"))
}

fn content_length(headers: &[u8]) -> Result<Option<usize>, Error> {
    let values = header_lines(headers)
        .filter(|(name, _)| name.eq_ignore_ascii_case(b"Content-Length"))
        .flat_map(|(_, value)| value.split(|b| *b == b','));

    let mut length = None;
    for value in values {
        let Some(n) = parse_length(value.trim_ascii())? else {
            return Ok(None);
        };
        match length {
            Some(prev) if prev != n => {
                return Err(Error::MalformedResponse(
                    "Content-Length: mismatched values".to_string(),
                ));
            }
            _ => length = Some(n),
        }
    }
    Ok(length)
}

fn parse_length(value: &[u8]) -> Result<Option<usize>, Error> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return Ok(None);
    }

    let mut len: usize = 0;
    for digit in value {
        len = len
            .checked_mul(10)
            .and_then(|n| n.checked_add(usize::from(digit - b'0')))
            .ok_or_else(|| Error::MalformedResponse("Content-Length overflow".to_string()))?;
    }
    Ok(Some(len))
}

/// 16 進数の 1 文字を値に変換
pub(crate) fn hex_value(b: u8) -> Option<usize> {
    match b {
        b'0'..=b'9' => Some(usize::from(b - b'0')),
        b'a'..=b'f' => Some(usize::from(b - b'a' + 10)),
        b'A'..=b'F' => Some(usize::from(b - b'A' + 10)),
        _ => None,
    }
}
