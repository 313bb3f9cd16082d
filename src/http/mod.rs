//! HTTP protocol layer module
//!
//! Response builders and the cross-origin policy, decoupled from the handlers.

pub mod cors;
pub mod response;

pub use cors::{apply_cors, build_preflight_response, is_preflight};
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response, json_response,
};
