//! tokio を使用した非同期接続
//!
//! `http11_transport::ResponseDecoder` をそのまま tokio の I/O で駆動する。
//!
//! ## 使い方
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
//! conn.shutdown().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use http11_transport::{DecoderLimits, Request, Response, ResponseDecoder};
use rustls_pki_types::ServerName;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::error::{Error, Result};
use crate::options::ConnectOptions;
use crate::tls::TlsContext;

/// 非同期 HTTP 接続
///
/// 1 つの接続で送信と受信を交互に行う。パイプライン化はしない。
pub struct AsyncConnection {
    stream: ConnectionStream,
    decoder: ResponseDecoder,
    read_timeout: Duration,
    write_timeout: Duration,
    /// 前のレスポンスの完了後に受信した残り
    leftover: Vec<u8>,
}

enum ConnectionStream {
    Plain(TcpStream),
    Tls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
}

impl AsyncConnection {
    /// ホストとポートを指定して接続を確立
    ///
    /// `secure` が true の場合は TLS で接続する。
    /// 接続タイムアウトは TLS ハンドシェイクまでを含む。
    /// ここでの失敗 (タイムアウトを含む) はすべて `Error::Connect` として返す。
    pub async fn connect(
        host: &str,
        port: u16,
        secure: bool,
        tls: &TlsContext,
        options: &ConnectOptions,
    ) -> Result<Self> {
        let stream = match tokio::time::timeout(
            options.connect_timeout,
            connect_stream(host, port, secure, tls),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
        .map_err(|e| {
            log::debug!("failed to connect to {}:{}: {}", host, port, e);
            Error::connect(host, port, e)
        })?;
        log::debug!("connected to {}:{} (tls: {})", host, port, secure);

        Ok(Self {
            stream,
            decoder: ResponseDecoder::new(),
            read_timeout: options.read_timeout,
            write_timeout: options.write_timeout,
            leftover: Vec::new(),
        })
    }

    /// デコーダーの制限を設定 (ビルダーパターン)
    pub fn with_limits(mut self, limits: DecoderLimits) -> Self {
        self.decoder = ResponseDecoder::with_limits(limits);
        self
    }

    /// 読み取りタイムアウトを設定
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    /// 書き込みタイムアウトを設定
    pub fn set_write_timeout(&mut self, timeout: Duration) {
        self.write_timeout = timeout;
    }

    /// TLS 接続かどうかを返す
    pub fn is_tls(&self) -> bool {
        matches!(self.stream, ConnectionStream::Tls(_))
    }

    /// リクエストを送信
    ///
    /// 書き込みタイムアウトまでに送り切れなければ `Error::Timeout`。
    pub async fn send(&mut self, request: &Request) -> Result<()> {
        let bytes = request.encode();
        tokio::time::timeout(self.write_timeout, self.write(&bytes)).await??;
        Ok(())
    }

    /// レスポンスを受信
    ///
    /// 完了前に接続が閉じられた場合や読み取りがタイムアウトした場合はエラー。
    /// エラーの場合、途中まで受信したレスポンスは破棄される。
    pub async fn receive(&mut self) -> Result<Response> {
        let result = self.receive_inner().await;
        if result.is_err() {
            self.decoder.reset();
        }
        result
    }

    async fn receive_inner(&mut self) -> Result<Response> {
        if !self.leftover.is_empty() {
            let leftover = std::mem::take(&mut self.leftover);
            self.feed(&leftover)?;
            if let Some(response) = self.decoder.take_response() {
                return Ok(response);
            }
        }

        let mut buf = [0u8; 8192];
        loop {
            let n = tokio::time::timeout(self.read_timeout, self.read(&mut buf)).await??;
            if n == 0 {
                self.decoder.mark_eof()?;
            } else {
                self.feed(&buf[..n])?;
            }

            if let Some(response) = self.decoder.take_response() {
                return Ok(response);
            }
        }
    }

    /// 接続を閉じる (TLS の場合は close_notify を送る)
    pub async fn shutdown(mut self) -> Result<()> {
        match &mut self.stream {
            ConnectionStream::Plain(stream) => stream.shutdown().await?,
            ConnectionStream::Tls(stream) => stream.shutdown().await?,
        }
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        match &mut self.stream {
            ConnectionStream::Plain(stream) => {
                stream.write_all(data).await?;
                stream.flush().await
            }
            ConnectionStream::Tls(stream) => {
                stream.write_all(data).await?;
                stream.flush().await
            }
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.stream {
            ConnectionStream::Plain(stream) => stream.read(buf).await,
            ConnectionStream::Tls(stream) => stream.read(buf).await,
        }
    }

    fn feed(&mut self, data: &[u8]) -> Result<()> {
        let consumed = self.decoder.feed(data)?;
        if consumed < data.len() {
            self.leftover.extend_from_slice(&data[consumed..]);
        }
        Ok(())
    }
}

async fn connect_stream(
    host: &str,
    port: u16,
    secure: bool,
    tls: &TlsContext,
) -> Result<ConnectionStream> {
    let stream = TcpStream::connect((host, port)).await?;
    stream.set_nodelay(true)?;
    if !secure {
        return Ok(ConnectionStream::Plain(stream));
    }

    let connector = TlsConnector::from(Arc::clone(tls.config()));
    let server_name = ServerName::try_from(host.to_string())?;
    let tls_stream = connector
        .connect(server_name, stream)
        .await
        .map_err(|e| Error::Tls(e.to_string()))?;
    Ok(ConnectionStream::Tls(Box::new(tls_stream)))
}
