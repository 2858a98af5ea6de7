//! Origin allow-list parsing and matching for CORS decisions.

pub mod allowlist;

pub use allowlist::{compile_pattern, AllowList, OriginMatch};
