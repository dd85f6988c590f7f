//! Shared helpers that don't belong to a single domain module.

pub mod serde;
