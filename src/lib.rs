//! Restgate - HTTP dispatch layer
//!
//! Matches raw HTTP requests against registered route patterns and runs each
//! one through a fixed pipeline (authorize, prevalidate, validate, invoke,
//! map) in front of a caller-supplied controller.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod inspect;
pub mod routing;
pub mod server;
