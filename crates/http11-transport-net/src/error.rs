//! http11-transport-net エラー型

use std::fmt;

/// http11-transport-net エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー
    Io(std::io::Error),
    /// HTTP デコードエラー
    Http(http11_transport::Error),
    /// TLS エラー
    Tls(String),
    /// 読み書きのタイムアウト
    Timeout,
    /// DNS 解決エラー
    DnsResolution(String),
    /// 接続の確立に失敗 (名前解決、TCP 接続、TLS ハンドシェイク、接続タイムアウト)
    Connect {
        host: String,
        port: u16,
        source: Box<Error>,
    },
}

impl Error {
    /// 接続確立中のエラーを `Connect` で包む
    pub(crate) fn connect(host: &str, port: u16, source: Error) -> Self {
        match source {
            e @ Error::Connect { .. } => e,
            source => Error::Connect {
                host: host.to_string(),
                port,
                source: Box::new(source),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Tls(e) => write!(f, "TLS error: {}", e),
            Error::Timeout => write!(f, "timeout"),
            Error::DnsResolution(msg) => write!(f, "DNS resolution error: {}", msg),
            Error::Connect { host, port, source } => {
                write!(f, "failed to connect to {}:{}: {}", host, port, source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            Error::Connect { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<http11_transport::Error> for Error {
    fn from(e: http11_transport::Error) -> Self {
        Error::Http(e)
    }
}

#[cfg(feature = "async")]
impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

impl From<rustls::Error> for Error {
    fn from(e: rustls::Error) -> Self {
        Error::Tls(e.to_string())
    }
}

impl From<rustls_pki_types::InvalidDnsNameError> for Error {
    fn from(e: rustls_pki_types::InvalidDnsNameError) -> Self {
        Error::Tls(e.to_string())
    }
}

/// 接続確立までの失敗は `Connection`、転送中の失敗は `Io` として扱う
impl From<Error> for http11_transport::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Http(e) => e,
            Error::Io(e) => http11_transport::Error::Io(e),
            Error::Timeout => http11_transport::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "timeout",
            )),
            e @ (Error::Connect { .. } | Error::Tls(_) | Error::DnsResolution(_)) => {
                http11_transport::Error::Connection(e.to_string())
            }
        }
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
