//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the activity API.

pub mod cache;
pub mod decode;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use decode::{decode_path_segment, query_param};
pub use response::{
    build_304_response, build_404_response, build_413_response, build_health_response,
    build_options_response, build_redirect_response,
};
