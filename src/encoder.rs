use crate::request::Request;

const HTTP_VERSION: &[u8] = b"HTTP/1.1";
const FORM_CONTENT_TYPE: &[u8] = b"application/x-www-form-urlencoded";

/// リクエストをエンコード
///
/// 事前に [`Request::encoded_len`] でサイズを求め、一度だけ確保する。
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut buf = Vec::with_capacity(request.encoded_len());

    // Request line: METHOD SP PATH SP VERSION CRLF
    buf.extend_from_slice(request.method().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(request.path.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(HTTP_VERSION);
    buf.extend_from_slice(b"\r\n");

    put_header(&mut buf, b"Host", request.host.as_bytes());
    if let Some(user_agent) = &request.user_agent {
        put_header(&mut buf, b"User-Agent", user_agent.as_bytes());
    }
    if let Some(referer) = &request.referer {
        put_header(&mut buf, b"Referer", referer.as_bytes());
    }
    if let Some(cookie) = &request.cookie {
        put_header(&mut buf, b"Cookie", cookie.as_bytes());
    }
    if let Some(body) = request.payload() {
        put_header(&mut buf, b"Content-Length", body.len().to_string().as_bytes());
        put_header(&mut buf, b"Content-Type", FORM_CONTENT_TYPE);
    }

    // End of headers
    buf.extend_from_slice(b"\r\n");

    if let Some(body) = request.payload() {
        buf.extend_from_slice(body);
    }

    debug_assert_eq!(buf.len(), request.encoded_len());
    buf
}

fn put_header(buf: &mut Vec<u8>, name: &[u8], value: &[u8]) {
    buf.extend_from_slice(name);
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value);
    buf.extend_from_slice(b"\r\n");
}

/// "Name: value\r\n" のバイト数
fn header_len(name: &[u8], value_len: usize) -> usize {
    name.len() + 2 + value_len + 2
}

/// 10 進数表記の桁数
fn decimal_len(mut n: usize) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

impl Request {
    /// エンコード後のバイト数
    pub fn encoded_len(&self) -> usize {
        // METHOD SP PATH SP HTTP/1.1 CRLF
        let mut size = self.method().len() + 1 + self.path.len() + 1 + HTTP_VERSION.len() + 2;
        size += header_len(b"Host", self.host.len());
        if let Some(user_agent) = &self.user_agent {
            size += header_len(b"User-Agent", user_agent.len());
        }
        if let Some(referer) = &self.referer {
            size += header_len(b"Referer", referer.len());
        }
        if let Some(cookie) = &self.cookie {
            size += header_len(b"Cookie", cookie.len());
        }
        if let Some(body) = self.payload() {
            size += header_len(b"Content-Length", decimal_len(body.len()));
            size += header_len(b"Content-Type", FORM_CONTENT_TYPE.len());
            size += body.len();
        }
        size + 2
    }

    /// リクエストをバイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        encode_request(self)
    }
}
