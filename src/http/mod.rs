//! HTTP protocol implementation.
//!
//! A minimal HTTP/1.1 server with keep-alive support. Bodies are sized by
//! `Content-Length`; chunked transfer is not supported.
//!
//! # Architecture
//!
//! - **`connection`**: The connection handler implementing the request-response state machine
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: Raw HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate bytes until headers and body are complete
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route table dispatch → one outcome
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
