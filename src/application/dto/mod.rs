//! Data Transfer Objects
//!
//! Request and response bodies for the HTTP API. Snowflake IDs are
//! serialized as strings so JavaScript clients do not lose precision.

pub mod request;
pub mod response;
