#![no_main]

use arbitrary::Arbitrary;
use http11_transport::{Request, encode_request};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzRequest {
    host: String,
    path: String,
    user_agent: Option<String>,
    referer: Option<String>,
    cookie: Option<String>,
    body: Option<Vec<u8>>,
}

fuzz_target!(|input: FuzzRequest| {
    let mut request = Request::new(&input.host, &input.path);
    if let Some(v) = &input.user_agent {
        request = request.user_agent(v);
    }
    if let Some(v) = &input.referer {
        request = request.referer(v);
    }
    if let Some(v) = &input.cookie {
        request = request.cookie(v);
    }
    if let Some(v) = input.body {
        request = request.body(v);
    }

    let encoded = encode_request(&request);
    assert_eq!(encoded.len(), request.encoded_len());

    match request.payload() {
        Some(body) => {
            assert!(encoded.starts_with(b"POST "));
            assert!(encoded.ends_with(body));
        }
        None => {
            assert!(encoded.starts_with(b"GET "));
            assert!(encoded.ends_with(b"\r\n\r\n"));
        }
    }
});
