//! Session の結合テスト
//!
//! 断片を順に返すトランスポートを使い、接続切断や多重化のシナリオで
//! セッションとデコーダーが正しく振る舞うことを確認する。
//!
//! 任意の分割位置での正しさは PBT (pbt/tests/prop_decoder.rs) で確認しているため、
//! ここでは I/O の結果 (EOF、WouldBlock、読み取り可能な残りデータ) に依存する
//! シナリオだけを扱う。

use std::collections::VecDeque;
use std::io::ErrorKind;

use http11_transport::{DecoderLimits, DecoderState, Error, Receive, Request, Session, Transport};

// ========================================
// テスト用トランスポート
// ========================================

enum Step {
    Data(Vec<u8>),
    WouldBlock,
}

/// 用意した手順どおりに読み取り結果を返すトランスポート
///
/// 手順を使い切った後は EOF を返す。
#[derive(Default)]
struct Scripted {
    steps: VecDeque<Step>,
    written: Vec<u8>,
    /// `has_pending()` が true を返す回数
    pending: usize,
}

impl Scripted {
    fn new(fragments: &[&[u8]]) -> Self {
        Self {
            steps: fragments.iter().map(|f| Step::Data(f.to_vec())).collect(),
            ..Self::default()
        }
    }

    /// 断片の間に WouldBlock を挟む
    fn nonblocking(fragments: &[&[u8]]) -> Self {
        let mut steps = VecDeque::new();
        for fragment in fragments {
            steps.push_back(Step::WouldBlock);
            steps.push_back(Step::Data(fragment.to_vec()));
        }
        Self {
            steps,
            ..Self::default()
        }
    }
}

impl Transport for Scripted {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.steps.pop_front() {
            Some(Step::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(Step::Data(data[n..].to_vec()));
                }
                Ok(n)
            }
            Some(Step::WouldBlock) => Err(std::io::Error::from(ErrorKind::WouldBlock)),
            None => Ok(0),
        }
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn has_pending(&mut self) -> bool {
        if self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }
}

fn truncated_state(fragments: &[&[u8]]) -> DecoderState {
    let mut session = Session::new(Scripted::new(fragments));
    match session.receive() {
        Err(Error::TruncatedResponse { state }) => state,
        other => panic!("expected truncated response, got {:?}", other),
    }
}

// ========================================
// 接続切断
// ========================================

#[test]
fn eof_during_status_line() {
    assert_eq!(truncated_state(&[b"HTTP/1.1 20"]), DecoderState::StatusLine);
}

#[test]
fn eof_without_any_data() {
    assert_eq!(truncated_state(&[]), DecoderState::StatusLine);
}

#[test]
fn eof_during_headers() {
    assert_eq!(
        truncated_state(&[b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n"]),
        DecoderState::HeaderCRLF
    );
}

#[test]
fn eof_during_fixed_length_body() {
    assert_eq!(
        truncated_state(&[b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n", b"partial"]),
        DecoderState::FixedLength
    );
}

#[test]
fn eof_during_chunk_size() {
    assert_eq!(
        truncated_state(&[b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n1"]),
        DecoderState::ChunkSize
    );
}

#[test]
fn eof_during_chunk_body() {
    assert_eq!(
        truncated_state(&[
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n",
            b"a\r\n01234",
        ]),
        DecoderState::ChunkBody
    );
}

#[test]
fn eof_before_last_chunk() {
    assert_eq!(
        truncated_state(&[b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n"]),
        DecoderState::ChunkSize
    );
}

#[test]
fn eof_after_last_chunk_size() {
    assert_eq!(
        truncated_state(&[b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n0\r\n"]),
        DecoderState::FinalChunkCRLF
    );
}

#[test]
fn close_delimited_then_eof_again() {
    let mut session = Session::new(Scripted::new(&[
        b"HTTP/1.0 200 OK\r\nServer: test\r\n\r\n",
        b"until ",
        b"close",
    ]));
    let response = session.receive().unwrap();
    assert_eq!(response.body(), b"until close");
    assert_eq!(response.header("server"), Some(&b"test"[..]));

    // 接続は閉じているため、次の受信は何も読めずに失敗する
    assert!(matches!(
        session.receive(),
        Err(Error::TruncatedResponse {
            state: DecoderState::StatusLine
        })
    ));
}

// ========================================
// 同一接続での連続したレスポンス
// ========================================

#[test]
fn two_responses_in_one_fragment() {
    let mut session = Session::new(Scripted::new(&[
        b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\none\
          HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\ntwo\r\n0\r\n\r\n",
    ]));
    session.send(&Request::new("example.com", "/1")).unwrap();
    assert_eq!(session.receive().unwrap().body(), b"one");
    session.send(&Request::new("example.com", "/2")).unwrap();
    assert_eq!(session.receive().unwrap().body(), b"two");
    assert_eq!(
        session.transport().written,
        b"GET /1 HTTP/1.1\r\nHost: example.com\r\n\r\nGET /2 HTTP/1.1\r\nHost: example.com\r\n\r\n"
    );
}

#[test]
fn small_read_buffer() {
    let mut session = Session::new(Scripted::new(&[
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n",
    ]))
    .read_buffer_size(3);
    let response = session.receive().unwrap();
    assert_eq!(response.body(), b"Wikipedia");
    assert_eq!(response.status_length(), 15);
    assert_eq!(response.header_length(), 28);
}

#[test]
fn pending_transport_data_is_drained() {
    let mut transport = Scripted::new(&[
        b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\n\r\n",
        b"abc",
        b"def",
    ]);
    transport.pending = 2;
    let mut session = Session::new(transport);

    // 残りデータがある間は 1 回の呼び出しで読み続ける
    let Receive::Complete(response) = session.receive_incremental().unwrap() else {
        panic!("expected complete response");
    };
    assert_eq!(response.body(), b"abcdef");
}

#[test]
fn head_limit_discards_partial_response() {
    let limits = DecoderLimits {
        max_head_size: 32,
        ..DecoderLimits::default()
    };
    let mut session = Session::with_limits(
        Scripted::new(&[b"HTTP/1.1 200 OK\r\nX-Long-Header: aaaaaaaaaaaaaaaa\r\n\r\n"]),
        limits,
    );
    assert!(matches!(
        session.receive(),
        Err(Error::HeadTooLarge { limit: 32, .. })
    ));
    assert_eq!(session.state(), DecoderState::StatusLine);
}

// ========================================
// 多重化
// ========================================

#[test]
fn multiplexed_sessions() {
    let replies: [&[&[u8]]; 3] = [
        &[
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n",
            b"fir",
            b"st",
        ],
        &[
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n",
            b"6\r\nsec",
            b"ond\r\n",
            b"0\r\n\r\n",
        ],
        &[b"HTTP/1.0 200 OK\r\n\r\n", b"third"],
    ];
    let mut sessions: Vec<Session<Scripted>> = replies
        .iter()
        .map(|fragments| Session::new(Scripted::nonblocking(fragments)))
        .collect();
    let mut bodies: Vec<Option<Vec<u8>>> = vec![None; sessions.len()];

    // すべての転送が完了するまで順番に 1 断片ずつ進める
    let mut rounds = 0;
    while bodies.iter().any(Option::is_none) {
        rounds += 1;
        assert!(rounds < 100);
        for (session, body) in sessions.iter_mut().zip(bodies.iter_mut()) {
            if body.is_some() {
                continue;
            }
            if let Receive::Complete(response) = session.receive_incremental().unwrap() {
                *body = Some(response.into_body());
            }
        }
    }

    assert_eq!(
        bodies,
        vec![
            Some(b"first".to_vec()),
            Some(b"second".to_vec()),
            Some(b"third".to_vec()),
        ]
    );
}

#[test]
fn borrowed_transport() {
    let mut transport = Scripted::new(&[b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok"]);
    {
        let mut session = Session::new(&mut transport);
        session
            .send(&Request::new("example.com", "/").cookie("a=b"))
            .unwrap();
        assert_eq!(session.receive().unwrap().body(), b"ok");
    }
    assert_eq!(
        transport.written,
        b"GET / HTTP/1.1\r\nHost: example.com\r\nCookie: a=b\r\n\r\n"
    );
}
