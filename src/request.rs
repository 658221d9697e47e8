/// HTTP リクエスト
///
/// メソッドは明示しない。空でないボディがあれば `POST`、なければ `GET` になる。
/// フィールドの値はエスケープも検証もせずにそのまま送信するため、
/// ヘッダーとして安全な文字列を渡すのは呼び出し側の責務。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// 接続先ホスト (例: "example.com")
    pub host: String,
    /// リクエストパス (スラッシュで始まる、例: "/index.html")
    pub path: String,
    /// User-Agent ヘッダー
    pub user_agent: Option<String>,
    /// Referer ヘッダー
    pub referer: Option<String>,
    /// Cookie ヘッダー
    pub cookie: Option<String>,
    /// ボディ (POST 時のフォームデータ)
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// 新しい GET リクエストを作成
    pub fn new(host: &str, path: &str) -> Self {
        Self {
            host: host.to_string(),
            path: path.to_string(),
            user_agent: None,
            referer: None,
            cookie: None,
            body: None,
        }
    }

    /// User-Agent を設定 (ビルダーパターン)
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    /// Referer を設定 (ビルダーパターン)
    pub fn referer(mut self, referer: &str) -> Self {
        self.referer = Some(referer.to_string());
        self
    }

    /// Cookie を設定 (ビルダーパターン)
    pub fn cookie(mut self, cookie: &str) -> Self {
        self.cookie = Some(cookie.to_string());
        self
    }

    /// ボディを設定 (ビルダーパターン)
    ///
    /// 空でないボディを設定すると POST リクエストになる。
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// 送信するボディ (空の場合は `None`)
    pub fn payload(&self) -> Option<&[u8]> {
        self.body.as_deref().filter(|body| !body.is_empty())
    }

    /// HTTP メソッドを取得
    pub fn method(&self) -> &'static str {
        if self.payload().is_some() {
            "POST"
        } else {
            "GET"
        }
    }
}
