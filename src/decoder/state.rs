//! デコード状態の定義

/// レスポンスデコーダーの状態
///
/// 各状態は受信したバイトをバッファへ保存するか ([`is_content`](Self::is_content))、
/// 制御のためだけに消費するかを自身で知っている。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderState {
    /// ステータスライン読み取り中
    StatusLine,
    /// ステータスラインの CR の直後
    StatusLineCR,
    /// ヘッダー行読み取り中
    Headers,
    /// ヘッダー行の CR の直後
    HeaderCR,
    /// 行頭 (ステータスラインまたはヘッダー行の CRLF の直後)
    HeaderCRLF,
    /// 空行の CR の直後 (次の LF でヘッダー終端)
    HeaderCRLFCR,
    /// チャンクサイズ (16 進数) 読み取り中
    ChunkSize,
    /// チャンク拡張の読み飛ばし中
    ChunkExtension,
    /// チャンクサイズ行の CR の直後
    ChunkSizeCR,
    /// チャンクデータ読み取り中
    ChunkBody,
    /// チャンクデータ直後の CR 待ち
    ChunkTrailingCR,
    /// チャンクデータ直後の LF 待ち
    ChunkTrailingLF,
    /// 終端チャンク後の CRLF 読み飛ばし中
    FinalChunkCRLF,
    /// Content-Length で指定された固定長ボディ読み取り中
    FixedLength,
    /// 接続が閉じるまでボディを読み取り中
    ReadUntilClose,
    /// 完了
    Complete,
}

impl DecoderState {
    /// 受信したバイトをバッファへ保存する状態かどうか
    pub fn is_content(self) -> bool {
        matches!(
            self,
            DecoderState::StatusLine
                | DecoderState::StatusLineCR
                | DecoderState::Headers
                | DecoderState::HeaderCR
                | DecoderState::HeaderCRLF
                | DecoderState::HeaderCRLFCR
                | DecoderState::ChunkBody
                | DecoderState::FixedLength
                | DecoderState::ReadUntilClose
        )
    }

    /// ステータスラインまたはヘッダーを読み取り中かどうか
    pub fn is_head(self) -> bool {
        matches!(
            self,
            DecoderState::StatusLine
                | DecoderState::StatusLineCR
                | DecoderState::Headers
                | DecoderState::HeaderCR
                | DecoderState::HeaderCRLF
                | DecoderState::HeaderCRLFCR
        )
    }
}
