//! Middleware module - CORS and rate limiting

pub mod cors;
pub mod rate_limit;
