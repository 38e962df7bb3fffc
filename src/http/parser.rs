use crate::http::request::Request;
use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidHeader,
    InvalidContentLength,
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied. While the header
/// block or the declared body is still incomplete, `ParseError::Incomplete`
/// is returned and the caller should read more bytes.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {

    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        headers.insert(
           key.trim().to_ascii_lowercase(),
           value.trim().to_string(),
        );
    }

    // Body
    let content_length = headers
        .get("content-length")
        .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))

}

/// Reads the declared Content-Length from a partially received header block.
///
/// Returns `None` until the full header block has arrived.
pub fn declared_content_length(buf: &[u8]) -> Option<usize> {
    let headers_end = find_headers_end(buf)?;
    let headers_str = std::str::from_utf8(&buf[..headers_end]).ok()?;

    headers_str
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Offset of the blank line ending the header block, once it has arrived.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
