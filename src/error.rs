use std::fmt;

use crate::decoder::DecoderState;

/// HTTP トランスポートエラー
///
/// どのエラーも現在のリクエスト/レスポンスサイクルにとって致命的であり、
/// 内部でリトライはしない。
#[derive(Debug)]
pub enum Error {
    /// 接続エラー (DNS 解決、ソケット接続、TLS ハンドシェイク)
    Connection(String),
    /// 転送中の読み書きエラー
    Io(std::io::Error),
    /// フレーミングの完了条件を満たす前に EOF を受信した
    TruncatedResponse {
        /// EOF を受信した時点のデコーダー状態
        state: DecoderState,
    },
    /// バッファの確保に失敗
    Allocation { requested: usize },
    /// 不正なレスポンス (チャンクサイズや Content-Length のオーバーフロー、Content-Length の不一致)
    MalformedResponse(String),
    /// ステータスラインとヘッダーの合計サイズ超過
    HeadTooLarge { size: usize, limit: usize },
    /// ボディサイズ超過
    BodyTooLarge { size: usize, limit: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(msg) => write!(f, "connection error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::TruncatedResponse { state } => {
                write!(f, "truncated response: unexpected EOF in {:?}", state)
            }
            Error::Allocation { requested } => {
                write!(f, "allocation error: failed to reserve {} bytes", requested)
            }
            Error::MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            Error::HeadTooLarge { size, limit } => {
                write!(f, "response head too large: {} > {}", size, limit)
            }
            Error::BodyTooLarge { size, limit } => {
                write!(f, "response body too large: {} > {}", size, limit)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
