//! # Web API Middleware

pub mod redaction;
pub mod request_id;
