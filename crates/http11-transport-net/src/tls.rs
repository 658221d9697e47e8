//! TLS クライアントコンテキスト

use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};
use rustls_platform_verifier::ConfigVerifierExt;

use crate::error::Result;

/// TLS クライアントコンテキスト
///
/// 呼び出し側で一度だけ作成し、`connect` に渡す。
/// プロセス全体で共有するグローバルな状態は持たない。
#[derive(Debug, Clone)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
}

impl TlsContext {
    /// OS のルート証明書ストアを使用するコンテキストを作成
    pub fn new() -> Result<Self> {
        let config = ClientConfig::with_platform_verifier()?;
        Ok(Self::from_config(Arc::new(config)))
    }

    /// 指定したルート証明書で検証するコンテキストを作成
    pub fn with_root_store(roots: RootCertStore) -> Self {
        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Self::from_config(Arc::new(config))
    }

    /// カスタムの TLS 設定からコンテキストを作成
    pub fn from_config(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    /// TLS 設定を取得
    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }
}
