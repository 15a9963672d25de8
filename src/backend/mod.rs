//! Backend module - upstream trait, reqwest client and header filtering

pub mod headers;
pub mod http_backend;
pub mod traits;

pub use http_backend::HttpUpstream;
pub use traits::{ForwardRequest, ProbeOutcome, Upstream, UpstreamResponse};
