//! 接続設定

use std::time::Duration;

/// 接続設定
///
/// タイムアウトはトランスポート側の責務であり、デコーダーやセッションは持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// 接続タイムアウト (TLS ハンドシェイクを含む、デフォルト: 30 秒)
    pub connect_timeout: Duration,
    /// 読み取りタイムアウト (デフォルト: 60 秒)
    pub read_timeout: Duration,
    /// 書き込みタイムアウト (デフォルト: 60 秒)
    pub write_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(60),
        }
    }
}

impl ConnectOptions {
    /// 接続タイムアウトを設定
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 読み取りタイムアウトを設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// 書き込みタイムアウトを設定
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// スキームに応じたデフォルトポート
pub fn default_port(secure: bool) -> u16 {
    if secure { 443 } else { 80 }
}
