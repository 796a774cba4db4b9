//! Configuration for spectrum collections.

use std::fmt;
use std::str::FromStr;

use crate::error::UsageError;

/// Axis a rebin is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub enum RebinAxis {
    /// Group the count channels (columns of the response matrix).
    #[default]
    Count,
    /// Group the photon bins (rows of the response matrix).
    Photon,
    /// Apply the count grouping to both axes.
    PhotonAndCount,
}

impl RebinAxis {
    /// Get the string name of this axis.
    pub fn name(&self) -> &'static str {
        match self {
            RebinAxis::Count => "count",
            RebinAxis::Photon => "photon",
            RebinAxis::PhotonAndCount => "photon_and_count",
        }
    }

    /// Whether the count channels are regrouped.
    pub fn touches_counts(&self) -> bool {
        matches!(self, RebinAxis::Count | RebinAxis::PhotonAndCount)
    }

    /// Whether the photon bins are regrouped.
    pub fn touches_photons(&self) -> bool {
        matches!(self, RebinAxis::Photon | RebinAxis::PhotonAndCount)
    }
}

impl fmt::Display for RebinAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RebinAxis {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(RebinAxis::Count),
            "photon" => Ok(RebinAxis::Photon),
            "photon_and_count" => Ok(RebinAxis::PhotonAndCount),
            other => Err(UsageError::MalformedSelector(other.to_string())),
        }
    }
}

/// Configuration for a [`SpectrumCollection`](crate::collection::SpectrumCollection).
#[derive(Clone, Debug)]
pub struct CollectionConfig {
    /// Axis rebin requests are applied to.
    pub axis: RebinAxis,
    /// Regroup the spectra of one rebin request in parallel.
    pub parallel: bool,
    /// Number of worker threads used when `parallel` is set.
    pub worker_count: usize,
    /// Report counts that could not be grouped as diagnostics.
    pub report_leftovers: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            axis: RebinAxis::Count,
            parallel: false,
            worker_count: num_cpus::get(),
            report_leftovers: true,
        }
    }
}

impl CollectionConfig {
    /// Default configuration with parallel regrouping switched on.
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Self::default()
        }
    }

    pub fn with_axis(mut self, axis: RebinAxis) -> Self {
        self.axis = axis;
        self
    }
}
