//! Outbound request encoding.
//!
//! Writes a deliberately small subset of HTTP/1.1: request line, the
//! caller's headers, blank line. Nothing is added on the caller's behalf
//! (no `Host`, no `Content-Length`, no body), since extra fields confuse
//! some devices.

use super::headers::write_headers;
use crate::base::neterror::NetError;
use bytes::{BufMut, Bytes, BytesMut};
use http::{header::HOST, Request, Uri};

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// The request-target for the request line.
///
/// `*` stays `*` (SSDP's `M-SEARCH * HTTP/1.1`); otherwise the path and
/// query, with an empty path written as `/`.
pub fn request_target(uri: &Uri) -> &str {
    match uri.path_and_query().map(|pq| pq.as_str()) {
        Some(target) if !target.is_empty() => target,
        _ => "/",
    }
}

/// The `host:port` datagrams for this request are sent to.
///
/// Taken from the URI authority when present, else from the `Host` header.
pub fn destination_host<B>(req: &Request<B>) -> Result<String, NetError> {
    if let Some(authority) = req.uri().authority() {
        return Ok(authority.as_str().to_string());
    }
    req.headers()
        .get(HOST)
        .ok_or_else(|| NetError::AddressInvalid("request has no host".to_string()))?
        .to_str()
        .map(str::to_string)
        .map_err(|_| NetError::AddressInvalid("Host header is not valid text".to_string()))
}

/// Serialize `req` into one datagram payload.
pub fn serialize_request<B>(req: &Request<B>) -> Result<Bytes, NetError> {
    let mut buf = BytesMut::with_capacity(256);

    buf.put_slice(req.method().as_str().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(request_target(req.uri()).as_bytes());
    buf.put_slice(b" HTTP/1.1\r\n");
    write_headers(&mut buf, req.headers());
    buf.put_slice(b"\r\n");

    if buf.len() > MAX_DATAGRAM_SIZE {
        return Err(NetError::InvalidRequest(format!(
            "request of {} bytes exceeds maximum datagram size {}",
            buf.len(),
            MAX_DATAGRAM_SIZE
        )));
    }
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn msearch() -> Request<()> {
        Request::builder()
            .method("M-SEARCH")
            .uri("*")
            .header("HOST", "239.255.255.250:1900")
            .header("MAN", "\"ssdp:discover\"")
            .header("MX", "2")
            .header("ST", "ssdp:all")
            .body(())
            .unwrap()
    }

    #[test]
    fn test_serialize_msearch() {
        let payload = serialize_request(&msearch()).unwrap();
        assert_eq!(
            &payload[..],
            b"M-SEARCH * HTTP/1.1\r\n\
              Host: 239.255.255.250:1900\r\n\
              Man: \"ssdp:discover\"\r\n\
              Mx: 2\r\n\
              St: ssdp:all\r\n\
              \r\n"
        );
    }

    #[test]
    fn test_default_method_is_get() {
        let req = Request::builder()
            .uri("http://192.168.1.1:1900/desc.xml?x=1")
            .body(())
            .unwrap();
        assert_eq!(req.method(), Method::GET);

        let payload = serialize_request(&req).unwrap();
        assert_eq!(&payload[..], b"GET /desc.xml?x=1 HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_request_target_forms() {
        assert_eq!(request_target(&Uri::from_static("*")), "*");
        assert_eq!(request_target(&Uri::from_static("http://10.0.0.1:1900")), "/");
        assert_eq!(request_target(&Uri::from_static("/a/b?c=d")), "/a/b?c=d");
    }

    #[test]
    fn test_destination_prefers_uri_authority() {
        let req = Request::builder()
            .uri("http://10.0.0.1:5000/")
            .header("Host", "239.255.255.250:1900")
            .body(())
            .unwrap();
        assert_eq!(destination_host(&req).unwrap(), "10.0.0.1:5000");
    }

    #[test]
    fn test_destination_from_host_header() {
        assert_eq!(destination_host(&msearch()).unwrap(), "239.255.255.250:1900");
    }

    #[test]
    fn test_destination_missing() {
        let req = Request::builder().uri("*").body(()).unwrap();
        assert!(matches!(
            destination_host(&req),
            Err(NetError::AddressInvalid(_))
        ));
    }

    #[test]
    fn test_oversized_request_rejected() {
        let req = Request::builder()
            .uri("*")
            .header("X-Padding", "a".repeat(MAX_DATAGRAM_SIZE))
            .body(())
            .unwrap();
        assert!(matches!(
            serialize_request(&req),
            Err(NetError::InvalidRequest(_))
        ));
    }
}
