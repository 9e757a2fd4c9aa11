//! JSON API routes.

pub mod images;
pub mod session;
