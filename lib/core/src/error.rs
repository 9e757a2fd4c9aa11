//! Error handling foundation for guild-gallery.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error types in their own
//! error modules, and fallible I/O at crate boundaries returns a
//! `Report` over those types so callers can add context as errors
//! propagate.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
