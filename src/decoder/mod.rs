//! HTTP/1.1 レスポンスデコーダーモジュール
//!
//! Sans I/O 設計に基づくインクリメンタルデコーダーを提供。
//! 受信データはどの位置で分割されていてもよい (数字の途中、CRLF の途中、
//! ヘッダーの途中)。ヘッダーを読み終えた時点でフレーミング方式を決め、
//! 同じバイト列のまま読み戻しや先読みなしにボディの読み取りへ切り替える。
//!
//! ## 使い方
//!
//! ```rust
//! use http11_transport::{DecoderState, Framing, ResponseDecoder};
//!
//! let mut decoder = ResponseDecoder::new();
//!
//! decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhel").unwrap();
//! assert_eq!(decoder.framing(), Some(Framing::ContentLength(5)));
//! assert_eq!(decoder.state(), DecoderState::FixedLength);
//!
//! decoder.feed(b"lo").unwrap();
//! let response = decoder.take_response().unwrap();
//! assert_eq!(response.status_line(), b"HTTP/1.1 200 OK");
//! assert_eq!(response.headers(), b"Content-Length: 5\r\n");
//! assert_eq!(response.body(), b"hello");
//! ```
//!
//! ### close-delimited ボディ
//!
//! Transfer-Encoding: chunked も有効な Content-Length もない場合は
//! 接続が閉じるまでがボディになる。EOF を受信したら `mark_eof()` を呼ぶ。
//!
//! ```rust
//! use http11_transport::ResponseDecoder;
//!
//! let mut decoder = ResponseDecoder::new();
//! decoder.feed(b"HTTP/1.0 200 OK\r\n\r\nuntil close").unwrap();
//! assert!(decoder.is_close_delimited());
//!
//! decoder.mark_eof().unwrap();
//! assert_eq!(decoder.take_response().unwrap().body(), b"until close");
//! ```

mod framing;
mod response;
mod state;

// 公開 API
pub use framing::Framing;
pub use response::ResponseDecoder;
pub use state::DecoderState;
