//! HTTP レスポンスデコーダー

use crate::error::Error;
use crate::limits::DecoderLimits;
use crate::log::{debug, trace};
use crate::response::Response;

use super::framing::{Framing, determine_framing, hex_value};
use super::state::DecoderState;

/// HTTP レスポンスデコーダー (Sans I/O)
///
/// 任意の位置で分割されたバイト列を受け取り、1 バイトずつ状態を進める。
/// ステータスライン、ヘッダー、ボディはそのまま 1 つのバッファに蓄積し、
/// チャンクサイズ行やチャンク区切りは読み捨てる。
///
/// ```rust
/// use http11_transport::ResponseDecoder;
///
/// let mut decoder = ResponseDecoder::new();
/// decoder.feed(b"HTTP/1.1 200 OK\r\nTransfer-Enc").unwrap();
/// decoder.feed(b"oding: chunked\r\n\r\n4\r\nWi").unwrap();
/// decoder.feed(b"ki\r\n5\r\npedia\r\n0\r\n\r\n").unwrap();
///
/// let response = decoder.take_response().unwrap();
/// assert_eq!(response.body(), b"Wikipedia");
/// ```
#[derive(Debug)]
pub struct ResponseDecoder {
    buf: Vec<u8>,
    state: DecoderState,
    /// 状態ごとに意味が変わる残りバイト数
    ///
    /// - `ChunkSize`: 読み取り中のチャンクサイズ
    /// - `ChunkBody`: チャンクの残りバイト数
    /// - `FinalChunkCRLF`: 終端チャンク後の CRLF の残りバイト数
    /// - `FixedLength`: ボディの残りバイト数
    remaining: usize,
    status_length: usize,
    header_length: usize,
    body_length: usize,
    framing: Option<Framing>,
    limits: DecoderLimits,
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDecoder {
    /// 新しいデコーダーを作成
    pub fn new() -> Self {
        Self::with_limits(DecoderLimits::default())
    }

    /// 制限付きでデコーダーを作成
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self {
            buf: Vec::new(),
            state: DecoderState::StatusLine,
            remaining: 0,
            status_length: 0,
            header_length: 0,
            body_length: 0,
            framing: None,
            limits,
        }
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// 現在の状態を取得
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// ヘッダーから決定したフレーミング方式 (ヘッダー読み取り中は `None`)
    pub fn framing(&self) -> Option<Framing> {
        self.framing
    }

    /// レスポンスが完了しているかどうか
    pub fn is_complete(&self) -> bool {
        self.state == DecoderState::Complete
    }

    /// close-delimited ボディを読み取り中かどうか
    pub fn is_close_delimited(&self) -> bool {
        self.state == DecoderState::ReadUntilClose
    }

    /// これまでに蓄積したバイト列
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// 受信データを投入
    ///
    /// 消費したバイト数を返す。レスポンスが完了した時点で消費を止めるため、
    /// 戻り値が `data.len()` より小さい場合は残りが次のレスポンスの先頭になる。
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, Error> {
        if self.state == DecoderState::Complete {
            return Ok(0);
        }

        // 断片と予備の 1 バイト分を先に確保する
        let requested = data.len() + 1;
        self.buf
            .try_reserve(requested)
            .map_err(|_| Error::Allocation { requested })?;

        let mut pos = 0;
        while pos < data.len() && self.state != DecoderState::Complete {
            match self.state {
                DecoderState::ChunkBody
                | DecoderState::FixedLength
                | DecoderState::ReadUntilClose => {
                    pos += self.feed_body(&data[pos..])?;
                }
                _ => {
                    self.feed_byte(data[pos])?;
                    pos += 1;
                }
            }
        }
        Ok(pos)
    }

    /// 接続終了を通知
    ///
    /// close-delimited ボディを読み取り中であれば完了する。
    /// それ以外の状態で接続が閉じられた場合はレスポンスが途中で切れている。
    pub fn mark_eof(&mut self) -> Result<(), Error> {
        match self.state {
            DecoderState::ReadUntilClose => {
                debug!("close-delimited body complete: {} bytes", self.body_length);
                self.state = DecoderState::Complete;
                Ok(())
            }
            DecoderState::Complete => Ok(()),
            state => Err(Error::TruncatedResponse { state }),
        }
    }

    /// 完了したレスポンスを取り出す
    ///
    /// 完了していない場合は `None`。取り出した後はデコーダーが初期状態に戻り、
    /// 同じ接続の次のレスポンスをデコードできる。
    pub fn take_response(&mut self) -> Option<Response> {
        if self.state != DecoderState::Complete {
            return None;
        }
        let buf = std::mem::take(&mut self.buf);
        let response = Response::from_parts(
            buf,
            self.status_length,
            self.header_length,
            self.body_length,
        );
        self.reset();
        Some(response)
    }

    /// デコーダーをリセット (途中のバッファは破棄する)
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = DecoderState::StatusLine;
        self.remaining = 0;
        self.status_length = 0;
        self.header_length = 0;
        self.body_length = 0;
        self.framing = None;
    }

    fn feed_byte(&mut self, byte: u8) -> Result<(), Error> {
        if self.state.is_content() {
            self.buf.push(byte);
            if self.state.is_head() && self.buf.len() > self.limits.max_head_size {
                return Err(Error::HeadTooLarge {
                    size: self.buf.len(),
                    limit: self.limits.max_head_size,
                });
            }
        }

        match self.state {
            DecoderState::StatusLine => {
                if byte == b'\r' {
                    self.state = DecoderState::StatusLineCR;
                } else {
                    self.status_length += 1;
                }
            }
            DecoderState::StatusLineCR => {
                // ステータスラインの LF の後は行頭
                self.state = DecoderState::HeaderCRLF;
            }
            DecoderState::Headers => {
                self.header_length += 1;
                if byte == b'\r' {
                    self.state = DecoderState::HeaderCR;
                }
            }
            DecoderState::HeaderCR => {
                self.header_length += 1;
                self.state = DecoderState::HeaderCRLF;
            }
            DecoderState::HeaderCRLF => {
                if byte == b'\r' {
                    self.state = DecoderState::HeaderCRLFCR;
                } else {
                    self.header_length += 1;
                    self.state = DecoderState::Headers;
                }
            }
            DecoderState::HeaderCRLFCR => self.finish_head()?,
            DecoderState::ChunkSize => match hex_value(byte) {
                Some(value) => {
                    self.remaining = self
                        .remaining
                        .checked_mul(16)
                        .and_then(|n| n.checked_add(value))
                        .ok_or_else(|| {
                            Error::MalformedResponse("chunk size overflow".to_string())
                        })?;
                }
                None if byte == b'\r' => self.state = DecoderState::ChunkSizeCR,
                None => self.state = DecoderState::ChunkExtension,
            },
            DecoderState::ChunkExtension => {
                if byte == b'\r' {
                    self.state = DecoderState::ChunkSizeCR;
                }
            }
            DecoderState::ChunkSizeCR => {
                self.body_length = self.checked_body_length(self.remaining)?;
                if self.remaining == 0 {
                    trace!("last chunk, body {} bytes", self.body_length);
                    self.remaining = 2;
                    self.state = DecoderState::FinalChunkCRLF;
                } else {
                    trace!("chunk of {} bytes", self.remaining);
                    self.state = DecoderState::ChunkBody;
                }
            }
            DecoderState::ChunkTrailingCR => self.state = DecoderState::ChunkTrailingLF,
            DecoderState::ChunkTrailingLF => {
                self.remaining = 0;
                self.state = DecoderState::ChunkSize;
            }
            DecoderState::FinalChunkCRLF => {
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.complete();
                }
            }
            // ボディは feed_body で処理する
            DecoderState::ChunkBody
            | DecoderState::FixedLength
            | DecoderState::ReadUntilClose
            | DecoderState::Complete => {}
        }
        Ok(())
    }

    /// ボディのバイト列をまとめて処理し、消費したバイト数を返す
    fn feed_body(&mut self, data: &[u8]) -> Result<usize, Error> {
        match self.state {
            DecoderState::ChunkBody | DecoderState::FixedLength => {
                let n = data.len().min(self.remaining);
                self.buf.extend_from_slice(&data[..n]);
                self.remaining -= n;
                if self.remaining == 0 {
                    if self.state == DecoderState::FixedLength {
                        self.complete();
                    } else {
                        self.state = DecoderState::ChunkTrailingCR;
                    }
                }
                Ok(n)
            }
            DecoderState::ReadUntilClose => {
                self.body_length = self.checked_body_length(data.len())?;
                self.buf.extend_from_slice(data);
                Ok(data.len())
            }
            _ => Ok(0),
        }
    }

    /// ヘッダー終端の LF を受信した時点でフレーミング方式を決定する
    fn finish_head(&mut self) -> Result<(), Error> {
        let start = self.status_length + 2;
        let headers = &self.buf[start..start + self.header_length];
        let framing = determine_framing(headers)?;
        debug!("response head complete: {:?}", framing);

        match framing {
            Framing::Chunked => {
                self.remaining = 0;
                self.state = DecoderState::ChunkSize;
            }
            Framing::ContentLength(0) => {
                self.complete();
            }
            Framing::ContentLength(len) => {
                self.body_length = self.checked_body_length(len)?;
                self.remaining = len;
                self.state = DecoderState::FixedLength;
            }
            Framing::CloseDelimited => {
                self.state = DecoderState::ReadUntilClose;
            }
        }
        self.framing = Some(framing);
        Ok(())
    }

    /// ボディ長に `additional` を加えた値を制限と照合して返す
    fn checked_body_length(&self, additional: usize) -> Result<usize, Error> {
        let size = self
            .body_length
            .checked_add(additional)
            .ok_or_else(|| Error::MalformedResponse("body length overflow".to_string()))?;
        if size > self.limits.max_body_size {
            return Err(Error::BodyTooLarge {
                size,
                limit: self.limits.max_body_size,
            });
        }
        Ok(size)
    }

    fn complete(&mut self) {
        debug!(
            "response complete: status {} bytes, headers {} bytes, body {} bytes",
            self.status_length, self.header_length, self.body_length
        );
        self.state = DecoderState::Complete;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(data: &[u8]) -> Response {
        let mut decoder = ResponseDecoder::new();
        let consumed = decoder.feed(data).unwrap();
        assert_eq!(consumed, data.len());
        decoder.take_response().unwrap()
    }

    #[test]
    fn content_length_lengths() {
        let response = decode_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(response.status_length(), 15);
        assert_eq!(response.header_length(), 19);
        assert_eq!(response.body_length(), 5);
        assert_eq!(response.body(), b"hello");
        assert_eq!(response.len(), 15 + 2 + 19 + 2 + 5);
    }

    #[test]
    fn chunked_body_strips_metadata() {
        let response = decode_all(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
              4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n",
        );
        assert_eq!(response.body(), b"Wikipedia");
        assert_eq!(response.body_length(), 9);
        assert_eq!(
            response.as_bytes(),
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nWikipedia"
        );
    }

    #[test]
    fn chunk_extension_is_skipped() {
        let response = decode_all(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
              5;name=value\r\nhello\r\n0;last\r\n\r\n",
        );
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn uppercase_hex_chunk_size() {
        let body = vec![b'z'; 0x1A];
        let mut data = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n1A\r\n".to_vec();
        data.extend_from_slice(&body);
        data.extend_from_slice(b"\r\n0\r\n\r\n");
        assert_eq!(decode_all(&data).body(), body.as_slice());
    }

    #[test]
    fn content_length_zero_completes_immediately() {
        let mut decoder = ResponseDecoder::new();
        decoder
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
            .unwrap();
        assert!(decoder.is_complete());
        let response = decoder.take_response().unwrap();
        assert_eq!(response.body(), b"");
        assert_eq!(response.body_length(), 0);
    }

    #[test]
    fn empty_header_block() {
        let mut decoder = ResponseDecoder::new();
        decoder.feed(b"HTTP/1.0 200 OK\r\n\r\nabc").unwrap();
        assert!(decoder.is_close_delimited());
        decoder.mark_eof().unwrap();
        let response = decoder.take_response().unwrap();
        assert_eq!(response.header_length(), 0);
        assert_eq!(response.headers(), b"");
        assert_eq!(response.body(), b"abc");
    }

    #[test]
    fn close_delimited_needs_eof() {
        let mut decoder = ResponseDecoder::new();
        decoder
            .feed(b"HTTP/1.1 200 OK\r\nServer: test\r\n\r\npartial")
            .unwrap();
        assert_eq!(decoder.framing(), Some(Framing::CloseDelimited));
        assert!(decoder.take_response().is_none());
        decoder.feed(b" body").unwrap();
        decoder.mark_eof().unwrap();
        let response = decoder.take_response().unwrap();
        assert_eq!(response.body(), b"partial body");
        assert_eq!(response.body_length(), 12);
    }

    #[test]
    fn invalid_content_length_falls_back_to_close() {
        let mut decoder = ResponseDecoder::new();
        decoder
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: five\r\n\r\nhello")
            .unwrap();
        assert_eq!(decoder.state(), DecoderState::ReadUntilClose);
    }

    #[test]
    fn repeated_content_length_frames_body() {
        let data = b"HTTP/1.1 200 OK\r\nContent-Length: 5, 5\r\n\r\nhelloHTTP/1.1";
        let mut decoder = ResponseDecoder::new();
        assert_eq!(decoder.feed(data).unwrap(), data.len() - 8);
        assert_eq!(decoder.framing(), Some(Framing::ContentLength(5)));
        assert_eq!(decoder.take_response().unwrap().body(), b"hello");
    }

    #[test]
    fn conflicting_content_length_is_malformed() {
        let mut decoder = ResponseDecoder::new();
        assert!(matches!(
            decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 5, 6\r\n\r\nhello"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn eof_in_fixed_length_body_is_truncated() {
        let mut decoder = ResponseDecoder::new();
        decoder
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nhello")
            .unwrap();
        assert!(matches!(
            decoder.mark_eof(),
            Err(Error::TruncatedResponse {
                state: DecoderState::FixedLength
            })
        ));
    }

    #[test]
    fn eof_in_headers_is_truncated() {
        let mut decoder = ResponseDecoder::new();
        decoder.feed(b"HTTP/1.1 200 OK\r\nServer: te").unwrap();
        assert!(matches!(
            decoder.mark_eof(),
            Err(Error::TruncatedResponse {
                state: DecoderState::Headers
            })
        ));
    }

    #[test]
    fn feed_stops_at_complete() {
        let mut decoder = ResponseDecoder::new();
        let data = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nokHTTP/1.1";
        let consumed = decoder.feed(data).unwrap();
        assert_eq!(consumed, data.len() - b"HTTP/1.1".len());
        assert_eq!(decoder.feed(b"more").unwrap(), 0);
        assert_eq!(decoder.take_response().unwrap().body(), b"ok");
        assert_eq!(decoder.state(), DecoderState::StatusLine);
    }

    #[test]
    fn decoder_is_reusable() {
        let mut decoder = ResponseDecoder::new();
        decoder
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\na")
            .unwrap();
        assert_eq!(decoder.take_response().unwrap().body(), b"a");
        decoder
            .feed(b"HTTP/1.1 404 Not Found\r\nContent-Length: 1\r\n\r\nb")
            .unwrap();
        let response = decoder.take_response().unwrap();
        assert_eq!(response.status_code(), Some(404));
        assert_eq!(response.body(), b"b");
    }

    #[test]
    fn chunk_size_overflow() {
        let mut decoder = ResponseDecoder::new();
        let result = decoder.feed(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
              fffffffffffffffffffffffff\r\n",
        );
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[test]
    fn content_length_over_limit() {
        let limits = DecoderLimits {
            max_body_size: 4,
            ..Default::default()
        };
        let mut decoder = ResponseDecoder::with_limits(limits);
        let result = decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
        assert!(matches!(
            result,
            Err(Error::BodyTooLarge { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn chunked_total_over_limit() {
        let limits = DecoderLimits {
            max_body_size: 8,
            ..Default::default()
        };
        let mut decoder = ResponseDecoder::with_limits(limits);
        let result = decoder.feed(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
              5\r\nhello\r\n5\r\nworld\r\n0\r\n\r\n",
        );
        assert!(matches!(
            result,
            Err(Error::BodyTooLarge { size: 10, limit: 8 })
        ));
    }

    #[test]
    fn close_delimited_over_limit() {
        let limits = DecoderLimits {
            max_body_size: 3,
            ..Default::default()
        };
        let mut decoder = ResponseDecoder::with_limits(limits);
        decoder.feed(b"HTTP/1.1 200 OK\r\n\r\nabc").unwrap();
        assert!(matches!(
            decoder.feed(b"d"),
            Err(Error::BodyTooLarge { size: 4, limit: 3 })
        ));
    }

    #[test]
    fn head_over_limit() {
        let limits = DecoderLimits {
            max_head_size: 16,
            ..Default::default()
        };
        let mut decoder = ResponseDecoder::with_limits(limits);
        let result = decoder.feed(b"HTTP/1.1 200 OK\r\nServer: test\r\n\r\n");
        assert!(matches!(
            result,
            Err(Error::HeadTooLarge { size: 17, limit: 16 })
        ));
    }

    #[test]
    fn reset_discards_partial_response() {
        let mut decoder = ResponseDecoder::new();
        decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Le").unwrap();
        decoder.reset();
        assert_eq!(decoder.state(), DecoderState::StatusLine);
        assert!(decoder.buffered().is_empty());
        assert_eq!(decoder.framing(), None);
    }
}
