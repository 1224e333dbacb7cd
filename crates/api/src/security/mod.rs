//! HTTP-level hardening shared by every route

mod cors;
mod headers;

pub use cors::cors_layer;
pub use headers::security_headers_middleware;
