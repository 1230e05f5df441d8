//! Jenkins REST surface
//!
//! The client facade plus the wire models and error type for the
//! endpoints the CLI consumes: identity, job list, job info, build
//! trigger, build info, progressive console text and pipeline stages.

pub mod client;
pub mod error;
pub mod types;

pub use client::JenkinsClient;
pub use error::JenkinsError;
