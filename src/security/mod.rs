//! Request hardening: input sanitising, upload checks, response headers
//! and rate limiting.

pub mod headers;
pub mod rate_limit;
pub mod sanitize;
pub mod upload;
