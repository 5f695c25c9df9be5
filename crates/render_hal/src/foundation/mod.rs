//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Content hashing for resource identity
//! - Math types
//! - Logging utilities

pub mod hash;
pub mod math;
pub mod logging;
