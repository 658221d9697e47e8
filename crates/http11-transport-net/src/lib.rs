//! http11_transport_net - http11_transport 用の TCP / TLS トランスポート
//!
//! `http11_transport` は I/O を持たないため、実際の接続はこのクレートが提供する。
//! TLS には rustls を使用し、証明書の検証には OS のルート証明書ストアを使う。
//!
//! ## Features
//!
//! - `blocking` - std の `TcpStream` を使用したブロッキング接続 (デフォルト有効)
//! - `async` - tokio と tokio-rustls を使用した非同期接続 (デフォルト有効)
//! - `full` - すべての機能を有効化
//!
//! ## ブロッキング
//!
//! ```no_run
//! use http11_transport::{Request, Session};
//! use http11_transport_net::{TlsContext, connect};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tls = TlsContext::new()?;
//! let mut session = Session::new(connect("example.com", true, &tls)?);
//! session.send(&Request::new("example.com", "/"))?;
//! let response = session.receive()?;
//! println!("{:?}", response.status_code());
//! session.into_transport().disconnect();
//! # Ok(())
//! # }
//! ```
//!
//! ## 非同期
//!
//! ```ignore
//! use http11_transport::Request;
//! use http11_transport_net::{AsyncConnection, ConnectOptions, TlsContext};
//!
//! let tls = TlsContext::new()?;
//! let mut conn =
//!     AsyncConnection::connect("example.com", 443, true, &tls, &ConnectOptions::default()).await?;
//! conn.send(&Request::new("example.com", "/")).await?;
//! let response = conn.receive().await?;
//! ```

mod error;
mod options;
mod tls;

#[cfg(feature = "async")]
mod connection;
#[cfg(feature = "blocking")]
mod transport;

#[cfg(feature = "async")]
pub use connection::AsyncConnection;
pub use error::{Error, Result};
pub use options::{ConnectOptions, default_port};
pub use tls::TlsContext;
#[cfg(feature = "blocking")]
pub use transport::{NetTransport, connect, connect_to};
