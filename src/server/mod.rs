//! TCP listener serving a route table.

pub mod listener;
