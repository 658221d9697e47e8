//! セッション (1 接続分の送受信)
//!
//! [`Transport`] から読み取った断片を [`ResponseDecoder`] に投入し、
//! レスポンスが完了するまで繰り返す。
//!
//! ## 複数接続の多重化
//!
//! `receive_incremental()` は 1 回の呼び出しで 1 断片だけ読み取るため、
//! poll / select で読み取り可能になった接続に対してだけ呼び出せば、
//! スレッドなしで複数の転送を同時に進められる。
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use http11_transport::{Receive, Request, Session, Transport};
//!
//! /// メモリ上のバイト列を返すだけのトランスポート
//! struct Canned(Cursor<Vec<u8>>, Vec<u8>);
//!
//! impl Transport for Canned {
//!     fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
//!         std::io::Read::read(&mut self.0, buf)
//!     }
//!
//!     fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
//!         self.1.extend_from_slice(buf);
//!         Ok(buf.len())
//!     }
//! }
//!
//! let reply = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok".to_vec();
//! let mut session = Session::new(Canned(Cursor::new(reply), Vec::new()));
//! session.send(&Request::new("example.com", "/")).unwrap();
//!
//! loop {
//!     match session.receive_incremental().unwrap() {
//!         Receive::Pending => continue,
//!         Receive::Complete(response) => {
//!             assert_eq!(response.body(), b"ok");
//!             break;
//!         }
//!     }
//! }
//! ```

use std::io::ErrorKind;

use crate::decoder::{DecoderState, ResponseDecoder};
use crate::error::Error;
use crate::limits::DecoderLimits;
use crate::log::{debug, trace, warning};
use crate::request::Request;
use crate::response::Response;

/// 1 回の読み取りサイズのデフォルト値
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// 接続済みのバイトストリーム
///
/// TCP か TLS かはセッションからは区別しない。
pub trait Transport {
    /// 最大 `buf.len()` バイトを読み取る。0 は EOF
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// バイト列を書き込み、書き込んだバイト数を返す
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    /// ソケットを読まずに読み取れるデータが残っているかどうか
    ///
    /// TLS のように復号済みデータを内部に保持するトランスポートは、
    /// ソケットの読み取り可能通知が来なくても続けて読み取る必要がある。
    fn has_pending(&mut self) -> bool {
        false
    }
}

impl Transport for std::net::TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        std::io::Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::Write::write(self, buf)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        (**self).write(buf)
    }

    fn has_pending(&mut self) -> bool {
        (**self).has_pending()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        (**self).write(buf)
    }

    fn has_pending(&mut self) -> bool {
        (**self).has_pending()
    }
}

/// `receive_incremental()` の結果
#[derive(Debug)]
pub enum Receive {
    /// まだデータが必要
    Pending,
    /// レスポンス完了
    Complete(Response),
}

/// 1 接続分のセッション
///
/// トランスポート、デコーダー (状態とバッファ)、読み取り用バッファを所有する。
/// セッション間で共有する状態はない。
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    decoder: ResponseDecoder,
    read_buf: Vec<u8>,
    /// 前のレスポンスの完了後に同じ断片で受信した残り
    leftover: Vec<u8>,
}

impl<T: Transport> Session<T> {
    /// 新しいセッションを作成
    pub fn new(transport: T) -> Self {
        Self::with_limits(transport, DecoderLimits::default())
    }

    /// 制限付きでセッションを作成
    pub fn with_limits(transport: T, limits: DecoderLimits) -> Self {
        Self {
            transport,
            decoder: ResponseDecoder::with_limits(limits),
            read_buf: vec![0; DEFAULT_READ_BUFFER_SIZE],
            leftover: Vec::new(),
        }
    }

    /// 1 回の読み取りサイズを設定 (ビルダーパターン)
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buf = vec![0; size.max(1)];
        self
    }

    /// デコーダーの現在の状態
    pub fn state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// トランスポートへの参照
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// トランスポートへの可変参照
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// セッションを破棄してトランスポートを取り出す
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// リクエストを送信
    pub fn send(&mut self, request: &Request) -> Result<(), Error> {
        let bytes = request.encode();
        debug!(
            "sending {} {} ({} bytes)",
            request.method(),
            request.path,
            bytes.len()
        );

        let mut written = 0;
        while written < bytes.len() {
            match self.transport.write(&bytes[written..]) {
                Ok(0) => {
                    return Err(Error::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        "failed to write request",
                    )));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        Ok(())
    }

    /// レスポンスを 1 断片分受信する
    ///
    /// トランスポートから 1 回読み取ってデコーダーに投入する。
    /// 完了していなければ `Receive::Pending` を返すので、データが届いたら再度呼び出す。
    /// ノンブロッキングのトランスポートで読み取るデータがない場合も `Pending` を返す。
    ///
    /// エラーの場合、途中まで受信したレスポンスは破棄される。
    pub fn receive_incremental(&mut self) -> Result<Receive, Error> {
        match self.receive_fragment() {
            Ok(receive) => Ok(receive),
            Err(e) => {
                warning!("discarding partial response: {}", e);
                self.decoder.reset();
                Err(e)
            }
        }
    }

    /// レスポンス全体を受信する
    ///
    /// 完了するまで `receive_incremental()` を繰り返す。
    /// ブロッキングのトランスポートで使う。
    pub fn receive(&mut self) -> Result<Response, Error> {
        loop {
            if let Receive::Complete(response) = self.receive_incremental()? {
                return Ok(response);
            }
        }
    }

    fn receive_fragment(&mut self) -> Result<Receive, Error> {
        if !self.leftover.is_empty() {
            let leftover = std::mem::take(&mut self.leftover);
            self.feed(&leftover)?;
            if let Some(response) = self.decoder.take_response() {
                return Ok(Receive::Complete(response));
            }
        }

        loop {
            let n = match self.transport.read(&mut self.read_buf) {
                Ok(n) => n,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                    return Ok(Receive::Pending);
                }
                Err(e) => return Err(Error::Io(e)),
            };

            if n == 0 {
                debug!("EOF in {:?}", self.decoder.state());
                self.decoder.mark_eof()?;
                break;
            }

            trace!("read {} bytes", n);
            let fragment = std::mem::take(&mut self.read_buf);
            let result = self.feed(&fragment[..n]);
            self.read_buf = fragment;
            result?;

            if self.decoder.is_complete() || !self.transport.has_pending() {
                break;
            }
        }

        match self.decoder.take_response() {
            Some(response) => Ok(Receive::Complete(response)),
            None => Ok(Receive::Pending),
        }
    }

    /// デコーダーに投入し、完了後の残りを次のレスポンス用に保持する
    fn feed(&mut self, data: &[u8]) -> Result<(), Error> {
        let consumed = self.decoder.feed(data)?;
        if consumed < data.len() {
            debug!(
                "keeping {} bytes received after the response",
                data.len() - consumed
            );
            self.leftover.extend_from_slice(&data[consumed..]);
        }
        Ok(())
    }
}
