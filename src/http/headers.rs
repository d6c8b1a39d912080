//! Header formatting for HTTPU requests.
//!
//! `http::HeaderMap` stores names lowercased. Many UPnP stacks compare
//! header names case-sensitively, so names go out on the wire in canonical
//! title case (`Man`, `St`, `Mx`, `Cache-Control`).

use bytes::{BufMut, BytesMut};
use http::HeaderMap;

/// Header added to every received response, naming the local IP the
/// client was listening on when the reply arrived.
///
/// The name matches the one existing UPnP discovery code already reads.
pub const LOCAL_ADDRESS_HEADER: &str = "goupnp-local-address";

/// Convert to title case (e.g., "cache-control" -> "Cache-Control").
pub fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars: Vec<char> = word.chars().collect();
            if let Some(first) = chars.first_mut() {
                *first = first.to_ascii_uppercase();
            }
            for c in chars.iter_mut().skip(1) {
                *c = c.to_ascii_lowercase();
            }
            chars.into_iter().collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Write `headers` as `Name: value\r\n` lines.
///
/// Names are sorted so the payload is deterministic; repeated names keep
/// the insertion order of their values.
pub fn write_headers(buf: &mut BytesMut, headers: &HeaderMap) {
    let mut names: Vec<_> = headers.keys().collect();
    names.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    for name in names {
        let canonical = canonical_name(name.as_str());
        for value in headers.get_all(name) {
            buf.put_slice(canonical.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes().trim_ascii());
            buf.put_slice(b"\r\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue};

    #[test]
    fn test_local_address_header_name() {
        assert_eq!(LOCAL_ADDRESS_HEADER, "goupnp-local-address");
        assert!(HeaderName::from_static(LOCAL_ADDRESS_HEADER) == LOCAL_ADDRESS_HEADER);
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("man"), "Man");
        assert_eq!(canonical_name("cache-control"), "Cache-Control");
        assert_eq!(canonical_name("USER-AGENT"), "User-Agent");
        assert_eq!(canonical_name("x--odd"), "X--Odd");
    }

    #[test]
    fn test_write_headers_sorted_and_canonical() {
        let mut headers = HeaderMap::new();
        headers.insert("st", HeaderValue::from_static("ssdp:all"));
        headers.insert("host", HeaderValue::from_static("239.255.255.250:1900"));
        headers.insert("man", HeaderValue::from_static("\"ssdp:discover\""));
        headers.insert("mx", HeaderValue::from_static("2"));

        let mut buf = BytesMut::new();
        write_headers(&mut buf, &headers);

        assert_eq!(
            &buf[..],
            b"Host: 239.255.255.250:1900\r\n\
              Man: \"ssdp:discover\"\r\n\
              Mx: 2\r\n\
              St: ssdp:all\r\n"
        );
    }

    #[test]
    fn test_write_headers_repeated_values() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_static("x-tag");
        headers.append(name.clone(), HeaderValue::from_static("first"));
        headers.append(name, HeaderValue::from_static(" second "));

        let mut buf = BytesMut::new();
        write_headers(&mut buf, &headers);
        assert_eq!(&buf[..], b"X-Tag: first\r\nX-Tag: second\r\n");
    }

    #[test]
    fn test_write_no_headers() {
        let mut buf = BytesMut::new();
        write_headers(&mut buf, &HeaderMap::new());
        assert!(buf.is_empty());
    }
}
