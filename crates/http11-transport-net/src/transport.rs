//! ブロッキング TCP / TLS トランスポート
//!
//! ## 使い方
//!
//! ```no_run
//! use http11_transport::{Request, Session};
//! use http11_transport_net::{TlsContext, connect};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tls = TlsContext::new()?;
//! let transport = connect("en.wikipedia.org", true, &tls)?;
//!
//! let mut session = Session::new(transport);
//! session.send(&Request::new("en.wikipedia.org", "/wiki/HTTP"))?;
//! let response = session.receive()?;
//! println!("{}", String::from_utf8_lossy(response.body()));
//!
//! session.into_transport().disconnect();
//! # Ok(())
//! # }
//! ```

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;

use http11_transport::Transport;
use rustls::{ClientConnection, StreamOwned};
use rustls_pki_types::ServerName;

use crate::error::{Error, Result};
use crate::options::{ConnectOptions, default_port};
use crate::tls::TlsContext;

/// 接続済みのトランスポート (平文または TLS)
///
/// ブロッキングモードでは、読み書きタイムアウトの満了を
/// `ErrorKind::TimedOut` の I/O エラーとして返す。
#[derive(Debug)]
pub struct NetTransport {
    stream: Stream,
    nonblocking: bool,
}

#[derive(Debug)]
enum Stream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

/// ホストに接続する
///
/// `secure` が true の場合は 443 番ポートに TLS で、false の場合は 80 番ポートに接続する。
pub fn connect(host: &str, secure: bool, tls: &TlsContext) -> Result<NetTransport> {
    connect_to(
        host,
        default_port(secure),
        secure,
        tls,
        &ConnectOptions::default(),
    )
}

/// ホストとポートを指定して接続する
///
/// 名前解決で得たアドレスに順に接続を試みる。
/// TLS の場合はハンドシェイクの完了までをこの関数で行う。
///
/// ここでの失敗はすべて `Error::Connect` として返す。
pub fn connect_to(
    host: &str,
    port: u16,
    secure: bool,
    tls: &TlsContext,
    options: &ConnectOptions,
) -> Result<NetTransport> {
    establish(host, port, secure, tls, options).map_err(|e| {
        log::debug!("failed to connect to {}:{}: {}", host, port, e);
        Error::connect(host, port, e)
    })
}

fn establish(
    host: &str,
    port: u16,
    secure: bool,
    tls: &TlsContext,
    options: &ConnectOptions,
) -> Result<NetTransport> {
    let stream = connect_tcp(host, port, options)?;

    if !secure {
        log::debug!("connected to {}:{}", host, port);
        return Ok(NetTransport::new(Stream::Plain(stream)));
    }

    let server_name = ServerName::try_from(host.to_string())?;
    let conn = ClientConnection::new(Arc::clone(tls.config()), server_name)?;
    let mut tls_stream = StreamOwned::new(conn, stream);
    if tls_stream.conn.is_handshaking() {
        tls_stream
            .conn
            .complete_io(&mut tls_stream.sock)
            .map_err(|e| Error::Tls(e.to_string()))?;
    }
    log::debug!(
        "connected to {}:{} ({:?})",
        host,
        port,
        tls_stream.conn.protocol_version()
    );
    Ok(NetTransport::new(Stream::Tls(Box::new(tls_stream))))
}

fn connect_tcp(host: &str, port: u16, options: &ConnectOptions) -> Result<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::DnsResolution(format!("{}: {}", host, e)))?;

    let mut last_error = None;
    for addr in addrs {
        log::trace!("connecting to {}", addr);
        match TcpStream::connect_timeout(&addr, options.connect_timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(options.read_timeout))?;
                stream.set_write_timeout(Some(options.write_timeout))?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => {
                log::debug!("failed to connect to {}: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(Error::Io(e)),
        None => Err(Error::DnsResolution(format!("{}: no addresses", host))),
    }
}

impl NetTransport {
    fn new(stream: Stream) -> Self {
        Self {
            stream,
            nonblocking: false,
        }
    }

    /// TLS 接続かどうかを返す
    pub fn is_tls(&self) -> bool {
        matches!(self.stream, Stream::Tls(_))
    }

    /// 下位の TCP ソケット
    pub fn socket(&self) -> &TcpStream {
        match &self.stream {
            Stream::Plain(stream) => stream,
            Stream::Tls(stream) => &stream.sock,
        }
    }

    /// ノンブロッキングモードを設定
    ///
    /// ノンブロッキングの場合、読み取るデータがなければ
    /// `Session::receive_incremental()` は `Receive::Pending` を返す。
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> Result<()> {
        self.socket().set_nonblocking(nonblocking)?;
        self.nonblocking = nonblocking;
        Ok(())
    }

    /// 切断する
    ///
    /// TLS の場合は close_notify を送ってから TCP を閉じる。
    pub fn disconnect(self) {
        let stream = match self.stream {
            Stream::Plain(stream) => stream,
            Stream::Tls(tls) => {
                let mut tls = *tls;
                tls.conn.send_close_notify();
                if let Err(e) = tls.conn.complete_io(&mut tls.sock) {
                    log::debug!("failed to send close_notify: {}", e);
                }
                tls.sock
            }
        };
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            log::debug!("failed to shutdown socket: {}", e);
        }
    }

    /// ブロッキングソケットのタイムアウト満了 (EAGAIN) を `TimedOut` に置き換える
    fn timed_out(&self, e: std::io::Error) -> std::io::Error {
        if !self.nonblocking && e.kind() == ErrorKind::WouldBlock {
            std::io::Error::new(ErrorKind::TimedOut, e)
        } else {
            e
        }
    }
}

impl Transport for NetTransport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let result = match &mut self.stream {
            Stream::Plain(stream) => Read::read(stream, buf),
            Stream::Tls(stream) => Read::read(stream, buf),
        };
        result.map_err(|e| self.timed_out(e))
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let result = match &mut self.stream {
            Stream::Plain(stream) => Write::write(stream, buf),
            Stream::Tls(stream) => Write::write(stream, buf),
        };
        result.map_err(|e| self.timed_out(e))
    }

    fn has_pending(&mut self) -> bool {
        match &mut self.stream {
            Stream::Plain(_) => false,
            // エラーは次の read で返す
            Stream::Tls(stream) => match stream.conn.process_new_packets() {
                Ok(state) => state.plaintext_bytes_to_read() > 0,
                Err(_) => true,
            },
        }
    }
}
