//! xrspec - X-ray count spectrum containers and minimum-count binning.
//!
//! This crate holds the data layer of an X-ray spectral fitting workflow:
//!
//! - Validated spectrum/response records with unit normalization
//! - Greedy grouping of count channels to a minimum count per bin
//! - A collection of loaded spectra with rebin, undo and merge commands
//! - FFI layer for Python (cffi) and other language bindings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     FFI Layer (xrspec.h)            │
//! │  C-compatible functions & types     │
//! └─────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │        SpectrumCollection           │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │  Rebin /  │  │    Merge      │  │
//! │  │   Undo    │  │               │  │
//! │  └───────────┘  └───────────────┘  │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │  Binning  │  │   Response    │  │
//! │  │  Engine   │  │   Rebinner    │  │
//! │  └───────────┘  └───────────────┘  │
//! └─────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │  SpectrumRecord / SpectrumEntry     │
//! └─────────────────────────────────────┘
//! ```
//!
//! # FFI Usage
//!
//! ```c
//! // Create collection
//! CollectionHandle collection;
//! xr_collection_create(NULL, &collection);
//!
//! // Add spectra
//! size_t ordinal;
//! xr_collection_add_spectrum(collection, counts, errors, edges, n, edges,
//!                            srm, n, exposure, NULL, &ordinal);
//!
//! // Rebin every spectrum to at least 10 counts per bin, then undo
//! int64_t group_min = 10;
//! xr_collection_rebin(collection, &group_min, 1, NULL);
//! xr_collection_undo_rebin(collection, "all", NULL);
//!
//! // Cleanup
//! xr_collection_free(collection);
//! ```

pub mod binning;
pub mod collection;
pub mod config;
pub mod data;
pub mod error;
pub mod ffi;
pub mod response;

// Re-export commonly used items
pub use binning::{find_minimum_threshold, group_counts, GroupedChannels, MinimumGrouping};
pub use collection::{
    merge, RebinReport, RebinRequest, SpectrumCollection, SpectrumRef, UndoReport, UndoSelector,
};
pub use config::{CollectionConfig, RebinAxis};
pub use data::{
    Exposure, Instrument, LoadedSpectrum, RecordInput, SampleDistribution, SpectrumEntry,
    SpectrumExtras, SpectrumRecord,
};
pub use error::{Diagnostic, RegroupError, ResponseError, StateError, UsageError, ValidationError};
pub use response::{ChannelSumResponse, ResponseRebinner};

// Re-export FFI types for cbindgen
pub use ffi::binning::*;
pub use ffi::collection::*;
pub use ffi::types::*;
