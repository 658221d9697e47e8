#![no_main]

use arbitrary::Arbitrary;
use http11_transport::ResponseDecoder;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzChunked {
    chunks: Vec<Vec<u8>>,
    extensions: Vec<bool>,
    uppercase: bool,
    split_hint: u8,
}

fn normalize_chunks(mut chunks: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    chunks.retain(|chunk| !chunk.is_empty());
    if chunks.len() > 64 {
        chunks.truncate(64);
    }
    chunks
}

fn encode(input: &FuzzChunked, chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut data = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
    for (i, chunk) in chunks.iter().enumerate() {
        let size = if input.uppercase {
            format!("{:X}", chunk.len())
        } else {
            format!("{:x}", chunk.len())
        };
        data.extend_from_slice(size.as_bytes());
        if input.extensions.get(i).copied().unwrap_or(false) {
            data.extend_from_slice(b";name=value");
        }
        data.extend_from_slice(b"\r\n");
        data.extend_from_slice(chunk);
        data.extend_from_slice(b"\r\n");
    }
    data.extend_from_slice(b"0\r\n\r\n");
    data
}

fuzz_target!(|input: FuzzChunked| {
    let chunks = normalize_chunks(input.chunks.clone());
    let expected = chunks.concat();
    let encoded = encode(&input, &chunks);
    let split_size = (input.split_hint as usize).max(1);

    let mut decoder = ResponseDecoder::new();
    let mut consumed = 0;
    for part in encoded.chunks(split_size) {
        consumed += decoder.feed(part).expect("valid chunked response");
    }
    assert_eq!(consumed, encoded.len());

    let response = decoder.take_response().expect("complete response");
    assert_eq!(response.body(), expected.as_slice());
    assert_eq!(response.body_length(), expected.len());
});
