//! # Xuanji Common Library
//!
//! Shared code for the Xuanji crates:
//! - Common error type
//! - Configuration file discovery and loading
//! - Tracing initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
