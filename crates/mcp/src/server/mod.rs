mod core;
mod errors;
mod http;
mod schemas;

pub use core::{DaMcpCore, DaToolServices, serve_stdio};
pub use http::{McpHttpServer, RunningMcpHttpServer, resolve_bind_address};
