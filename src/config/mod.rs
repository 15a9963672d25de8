//! Configuration module - environment driven settings

pub mod settings;

pub use settings::{Settings, SUPPORTED_JWT_ALGORITHMS};
