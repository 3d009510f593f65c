//! HTTP surface and process-level plumbing: configuration, source fetching, logging.

pub mod config;
pub mod fetch;
pub mod http;
pub mod logging;
