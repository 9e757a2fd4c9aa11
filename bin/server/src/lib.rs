//! guild-gallery web server.
//!
//! This crate provides the HTTP surface of the gallery: Discord login with
//! guild role gating, session handling and the image API.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;

#[cfg(test)]
pub(crate) mod test_support;
