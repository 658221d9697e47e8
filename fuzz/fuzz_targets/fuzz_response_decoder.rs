#![no_main]

use arbitrary::Arbitrary;
use http11_transport::{DecoderLimits, Response, ResponseDecoder};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    data: Vec<u8>,
    split_size: u8,
    close: bool,
}

fn limits() -> DecoderLimits {
    DecoderLimits {
        max_head_size: 8 * 1024,
        max_body_size: 64 * 1024,
    }
}

/// 分割して投入し、完了したレスポンスと消費したバイト数を返す
fn decode(data: &[u8], split_size: usize, close: bool) -> Option<(Response, usize)> {
    let mut decoder = ResponseDecoder::with_limits(limits());
    let mut consumed = 0;
    for part in data.chunks(split_size) {
        consumed += decoder.feed(part).ok()?;
        if decoder.is_complete() {
            break;
        }
    }
    if close {
        decoder.mark_eof().ok()?;
    }
    decoder.take_response().map(|response| (response, consumed))
}

fuzz_target!(|input: FuzzInput| {
    let split_size = (input.split_size as usize).max(1);

    let whole = decode(&input.data, input.data.len().max(1), input.close);
    let fragmented = decode(&input.data, split_size, input.close);

    // 分割位置によって結果が変わってはならない
    assert_eq!(whole, fragmented);

    if let Some((response, consumed)) = whole {
        assert!(consumed <= input.data.len());
        assert_eq!(
            response.len(),
            response.status_length() + 2 + response.header_length() + 2 + response.body_length()
        );
        assert_eq!(response.body().len(), response.body_length());
        assert_eq!(
            response.status_line(),
            &input.data[..response.status_length()]
        );
    }
});
