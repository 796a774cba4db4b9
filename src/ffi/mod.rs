//! FFI (Foreign Function Interface) layer for C bindings.
//!
//! This module provides C-compatible functions that can be called from
//! Python via cffi, or from any other language that supports C FFI.

pub mod binning;
pub mod collection;
pub mod types;

pub use binning::*;
pub use collection::*;
pub use types::*;
