//! # http11_transport
//!
//! 組み込み用の HTTP/1.1 クライアントトランスポート (Sans I/O)
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用 (`log` フィーチャーで `log` クレートに出力)
//! - **インクリメンタルデコード**: 任意の位置で分割された受信データを 1 バイトずつ処理
//! - **単一バッファ**: ステータスライン、ヘッダー、ボディを 1 つのバッファに連続して保持
//! - **多重化**: スレッドなしで複数の接続を poll しながら受信できる
//!
//! ## 使い方
//!
//! ```rust
//! use http11_transport::{Request, ResponseDecoder};
//!
//! // リクエストを作成してエンコード
//! let request = Request::new("example.com", "/")
//!     .user_agent("http11_transport");
//! let bytes = request.encode();
//! assert!(bytes.starts_with(b"GET / HTTP/1.1\r\nHost: example.com\r\n"));
//! // bytes を送信...
//!
//! // レスポンスをデコード
//! let mut decoder = ResponseDecoder::new();
//! decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok").unwrap();
//! let response = decoder.take_response().unwrap();
//! assert_eq!(response.body(), b"ok");
//! ```
//!
//! 接続済みのストリームがある場合は [`Session`] が送受信をまとめて行う。
//!
//! ```rust,no_run
//! use std::net::TcpStream;
//!
//! use http11_transport::{Request, Session};
//!
//! # fn main() -> Result<(), http11_transport::Error> {
//! let stream = TcpStream::connect("example.com:80")?;
//! let mut session = Session::new(stream);
//! session.send(&Request::new("example.com", "/"))?;
//! let response = session.receive()?;
//! println!("{}", String::from_utf8_lossy(response.body()));
//! # Ok(())
//! # }
//! ```

mod decoder;
mod encoder;
mod error;
mod limits;
mod log;
mod request;
mod response;
mod session;

pub use decoder::{DecoderState, Framing, ResponseDecoder};
pub use encoder::encode_request;
pub use error::Error;
pub use limits::DecoderLimits;
pub use request::Request;
pub use response::Response;
pub use session::{DEFAULT_READ_BUFFER_SIZE, Receive, Session, Transport};
