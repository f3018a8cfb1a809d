/// Prefix for all JSON API routes.
pub const API_PREFIX: &str = "/api";

/// Multipart framing allowance on top of the largest per-flow ceiling.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1 << 20;
