use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;

use crate::http::parser::{ParseError, declared_content_length, find_headers_end, parse_http_request};
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::routing::RouteTable;

/// Default cap on a declared request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Cap on a request line plus header block that has not ended yet.
pub const MAX_HEADER_BYTES: usize = 16 * 1024;

pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    table: Arc<RouteTable>,
    max_body_bytes: usize,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, table: Arc<RouteTable>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            table,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_request().await? {
                        Some(req) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        None => {
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let response = self.table.dispatch(req).await;
                    let keep_alive = req.keep_alive();

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if *keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    } else {
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Accumulates bytes until one full request (headers and declared body)
    /// is buffered. Returns `None` when the client closes cleanly.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    if find_headers_end(&self.buffer).is_none() {
                        if self.buffer.len() > MAX_HEADER_BYTES {
                            return Err(anyhow::anyhow!(
                                "header block exceeds limit of {} bytes",
                                MAX_HEADER_BYTES
                            ));
                        }
                    } else {
                        let declared = declared_content_length(&self.buffer).unwrap_or(0);
                        if declared > self.max_body_bytes {
                            return Err(anyhow::anyhow!(
                                "request body of {} bytes exceeds limit of {}",
                                declared,
                                self.max_body_bytes
                            ));
                        }
                    }
                }

                Err(e) => {
                    // Malformed request → protocol error
                    return Err(anyhow::anyhow!("HTTP parse error: {:?}", e));
                }
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(anyhow::anyhow!("connection closed mid-request"));
            }
        }
    }
}
