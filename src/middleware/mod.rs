//! Tower middleware for the proxy

pub mod rate_limit;
