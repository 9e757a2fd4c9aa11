//! Core types and utilities shared by the guild-gallery crates.
//!
//! This crate provides the error handling foundation and the strongly-typed
//! identifiers used across the access, images and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, SessionId, UploadId};
