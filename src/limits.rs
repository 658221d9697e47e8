/// デコーダーの制限設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderLimits {
    /// ステータスラインとヘッダーの最大合計サイズ (デフォルト: 64KB)
    ///
    /// 終端の空行を含む。
    pub max_head_size: usize,
    /// 最大ボディサイズ (デフォルト: 10MB)
    ///
    /// Content-Length の宣言値、チャンクサイズの累計、
    /// close-delimited で受信したバイト数のいずれにも適用される。
    pub max_body_size: usize,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_head_size: 64 * 1024,        // 64KB
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl DecoderLimits {
    /// 制限なしの設定を作成
    pub fn unlimited() -> Self {
        Self {
            max_head_size: usize::MAX,
            max_body_size: usize::MAX,
        }
    }
}
