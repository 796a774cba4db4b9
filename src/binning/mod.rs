//! Minimum-count channel grouping.
//!
//! Pure functions over channel intervals and counts. Nothing here touches a
//! collection; [`SpectrumCollection`](crate::collection::SpectrumCollection)
//! drives these per spectrum.

pub mod group;
pub mod minimum;

pub use group::{group_counts, group_counts_batch, threshold, GroupedChannels, Leftover};
pub use minimum::{find_minimum_threshold, MinimumGrouping};
