//! Encoders for output formats that live outside libjparse.

pub mod toml;
pub mod yaml;
