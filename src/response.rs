/// HTTP レスポンス
///
/// 受信したステータスライン、ヘッダー、ボディを 1 つのバッファに連続して保持する。
/// チャンクサイズ行やチャンク区切りの CRLF はバッファに含まれない。
///
/// ```text
/// |<- status_length ->|CRLF|<- header_length ->|CRLF|<- body_length ->|
/// ^ 0                      ^ headers_offset()       ^ body_offset()
/// ```
///
/// `header_length` はヘッダー行とその CRLF を含み、ヘッダー終端の空行は含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    buf: Vec<u8>,
    status_length: usize,
    header_length: usize,
    body_length: usize,
}

impl Response {
    pub(crate) fn from_parts(
        buf: Vec<u8>,
        status_length: usize,
        header_length: usize,
        body_length: usize,
    ) -> Self {
        debug_assert_eq!(buf.len(), status_length + 2 + header_length + 2 + body_length);
        Self {
            buf,
            status_length,
            header_length,
            body_length,
        }
    }

    /// レスポンス全体のバイト列
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// レスポンス全体のバイト数
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 空かどうか (デコード済みのレスポンスは常に false)
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// ステータスラインの長さ (CRLF を除く)
    pub fn status_length(&self) -> usize {
        self.status_length
    }

    /// ヘッダーブロックの長さ (終端の空行を除く)
    pub fn header_length(&self) -> usize {
        self.header_length
    }

    /// ボディの長さ
    pub fn body_length(&self) -> usize {
        self.body_length
    }

    /// ヘッダーブロックの開始位置
    pub fn headers_offset(&self) -> usize {
        self.status_length + 2
    }

    /// ボディの開始位置
    pub fn body_offset(&self) -> usize {
        self.headers_offset() + self.header_length + 2
    }

    /// ステータスライン (例: `HTTP/1.1 200 OK`)
    pub fn status_line(&self) -> &[u8] {
        &self.buf[..self.status_length]
    }

    /// ヘッダーブロック
    pub fn headers(&self) -> &[u8] {
        let start = self.headers_offset();
        &self.buf[start..start + self.header_length]
    }

    /// ボディ
    pub fn body(&self) -> &[u8] {
        let start = self.body_offset();
        &self.buf[start..start + self.body_length]
    }

    /// バッファを取り出す
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// ボディを取り出す
    pub fn into_body(self) -> Vec<u8> {
        let start = self.body_offset();
        let mut buf = self.buf;
        buf.drain(..start);
        buf
    }

    /// ステータスコードを取得
    ///
    /// ステータスラインの 2 番目のトークンが 3 桁の数字でない場合は `None`
    pub fn status_code(&self) -> Option<u16> {
        let code = self.status_line().split(|b| *b == b' ').nth(1)?;
        if code.len() != 3 || !code.iter().all(u8::is_ascii_digit) {
            return None;
        }
        std::str::from_utf8(code).ok()?.parse().ok()
    }

    /// ヘッダー行を (名前, 値) で列挙する
    ///
    /// 値の前後の空白は取り除く。コロンのない行は読み飛ばす。
    pub fn header_lines(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        header_lines(self.headers())
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.header_lines()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.as_bytes()))
            .map(|(_, v)| v)
    }

    /// ヘッダーを文字列として取得 (UTF-8 でない場合は `None`)
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name).and_then(|v| std::str::from_utf8(v).ok())
    }
}

/// ヘッダーブロックを (名前, 値) に分解する
pub(crate) fn header_lines(block: &[u8]) -> impl Iterator<Item = (&[u8], &[u8])> {
    block
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter_map(|line| {
            let colon = line.iter().position(|b| *b == b':')?;
            Some((line[..colon].trim_ascii(), line[colon + 1..].trim_ascii()))
        })
}
