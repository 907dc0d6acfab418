//! Model Context Protocol (MCP) server for the DA content admin API.
//!
//! The server exposes document operations (`source.*`), the asset publish
//! workflow (`asset.upload`) and the pipeline triggers (`content.*`) as MCP
//! tools. It can be hosted over stdio or over streamable HTTP on a loopback
//! address.

pub mod server;

pub use server::{DaMcpCore, DaToolServices, McpHttpServer, RunningMcpHttpServer, resolve_bind_address, serve_stdio};
