//! Parsing of reply datagrams.
//!
//! Every datagram is a complete HTTP response on its own: status line,
//! headers, and an optional body bounded by `Content-Length` or by the end
//! of the datagram. There is no reassembly across datagrams and no chunked
//! decoding.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, Method, Response, StatusCode, Version};

/// Maximum number of headers accepted in one reply.
pub const MAX_HEADERS: usize = 64;

/// Parse one datagram as the response to a request made with `method`.
///
/// The method matters only for `HEAD`, whose replies never carry a body.
pub fn parse_response(datagram: &[u8], method: &Method) -> Result<Response<Bytes>, NetError> {
    let mut raw_headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Response::new(&mut raw_headers);

    let head_len = match parsed.parse(datagram) {
        Ok(httparse::Status::Complete(len)) => len,
        Ok(httparse::Status::Partial) => return Err(NetError::ResponseHeadersTruncated),
        Err(httparse::Error::TooManyHeaders) => return Err(NetError::ResponseHeadersTooBig),
        Err(e) => return Err(NetError::InvalidHttpResponse(e.to_string())),
    };

    let version = match parsed.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };
    let status = parsed
        .code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| NetError::InvalidHttpResponse("invalid status code".to_string()))?;

    let mut headers = HeaderMap::with_capacity(parsed.headers.len());
    for header in parsed.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| NetError::InvalidHttpResponse(format!("invalid header name {:?}", header.name)))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|_| NetError::InvalidHttpResponse(format!("invalid value for header {name}")))?;
        headers.append(name, value);
    }

    let rest = &datagram[head_len..];
    let body = if has_no_body(method, status) {
        Bytes::new()
    } else {
        if let Some(encoding) = headers.get(TRANSFER_ENCODING) {
            return Err(NetError::UnsupportedTransferEncoding(
                String::from_utf8_lossy(encoding.as_bytes()).into_owned(),
            ));
        }
        match content_length(&headers)? {
            Some(declared) if declared > rest.len() => {
                return Err(NetError::ContentLengthMismatch {
                    declared,
                    available: rest.len(),
                });
            }
            Some(declared) => Bytes::copy_from_slice(&rest[..declared]),
            None => Bytes::copy_from_slice(rest),
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = version;
    *response.headers_mut() = headers;
    Ok(response)
}

fn has_no_body(method: &Method, status: StatusCode) -> bool {
    method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// The declared body length. Repeated identical values are allowed,
/// conflicting ones are not.
fn content_length(headers: &HeaderMap) -> Result<Option<usize>, NetError> {
    let mut length = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let parsed = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .ok_or_else(|| NetError::InvalidHttpResponse("invalid Content-Length".to_string()))?;
        match length {
            Some(existing) if existing != parsed => {
                return Err(NetError::ResponseHeadersMultipleContentLength);
            }
            _ => length = Some(parsed),
        }
    }
    Ok(length)
}
