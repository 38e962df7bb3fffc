//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     route string
//!     → pattern.rs (validate & compile segments)
//!     → table.rs (append in registration order)
//!
//! Incoming request (method, path):
//!     → table.rs (scan routes in registration order)
//!     → pattern.rs (segment-wise match, bind placeholders)
//!     → first matching route's handler, or 404
//! ```
//!
//! # Design Decisions
//! - Routes are compiled at startup and the table is read-only afterwards
//! - First registered match wins; overlapping routes are not detected, so
//!   `cat/{id}` registered before `cat/special` shadows it
//! - Literal segments match case-insensitively, placeholders bind raw text

pub mod pattern;
pub mod table;

pub use pattern::{Identifiers, RoutePattern, Segment};
pub use table::RouteTable;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The route string breaks the route syntax; fatal at registration.
    #[error("invalid route `{route}`: {reason}")]
    InvalidRoute { route: String, reason: String },
}
