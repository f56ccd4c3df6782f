//! Common utilities for LivingTool.
//!
//! This crate provides the foundational pieces shared by the disc, NPC and
//! enemy crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`can_read`] - The bounds check every positional read goes through
//! - [`Error`] - Errors raised by cursor-style reads

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::{can_read, BinaryReader};

/// Re-export memchr for SIMD-accelerated byte searching
pub use memchr;
