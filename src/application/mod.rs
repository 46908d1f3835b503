//! Application Layer
//!
//! Use-case services and the request/response DTOs they speak.

pub mod dto;
pub mod services;
