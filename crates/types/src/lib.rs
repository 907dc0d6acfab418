//! Shared type definitions for the DA admin tool server.
//!
//! These types cross crate boundaries: the API client produces
//! [`ResponseBody`] values, the engine produces [`UploadResult`]s, and the MCP
//! layer serializes both back to callers.

mod location;
mod response;
mod upload;

pub use location::ResourceLocation;
pub use response::ResponseBody;
pub use upload::{StepOutcome, UploadResult};
