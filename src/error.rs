//! Error taxonomy and the diagnostics reported by collection commands.
//!
//! Construction of a [`SpectrumRecord`](crate::data::SpectrumRecord) fails
//! fast with a [`ValidationError`]. Everything else (bad thresholds, undo on
//! an unbinned spectrum, leftover counts) is non-fatal: it is logged through
//! the `log` facade and handed back inside a report as a [`Diagnostic`].

use crate::config::RebinAxis;
use thiserror::Error;

/// Fatal inconsistencies found while constructing a spectrum.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("`{field}` must be {expected}, found an array of rank {found}")]
    Dimensionality {
        field: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("`effective_exposure` has {found} entries, expected 1 or {expected}")]
    ExposureShape { found: usize, expected: usize },
    #[error("unrecognized sample distribution {0:?}, expected Gaussian or Poissonian")]
    UnknownDistribution(String),
    #[error("`{field}` needs at least two edges, found {found}")]
    TooFewEdges { field: &'static str, found: usize },
    #[error(
        "array length mismatch: counts={counts}, counts_error={counts_error}, count channels={channels}"
    )]
    LengthMismatch {
        counts: usize,
        counts_error: usize,
        channels: usize,
    },
    #[error("response matrix has shape {found:?}, expected {expected:?} (photon bins, count bins)")]
    ResponseShape {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("`{field}` must have shape (N, 2), found {found:?}")]
    IntervalShape {
        field: &'static str,
        found: (usize, usize),
    },
    #[error("`{field}` must be strictly increasing (violated at index {index})")]
    NotIncreasing { field: &'static str, index: usize },
    #[error("count {value} in channel {index} is negative or not finite")]
    InvalidCounts { index: usize, value: f64 },
}

/// Misuse of a command. State is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UsageError {
    #[error("the minimum group count must be an integer > 0, got {value}")]
    InvalidThreshold { value: i64 },
    #[error(
        "malformed spectrum selector {0:?}: use a spectrum number (N), an identifier (\"spectrumN\") or \"all\""
    )]
    MalformedSelector(String),
    #[error(
        "rebin list has {found} entries but {expected} spectra are loaded; use a single value, a one-to-one list or a mapping"
    )]
    LengthMismatch { expected: usize, found: usize },
    #[error("no spectrum named {0:?} is loaded")]
    UnknownSpectrum(String),
    #[error("channel intervals have shape {bins:?} but {counts} counts were given")]
    ChannelMismatch { bins: (usize, usize), counts: usize },
    #[error("rebinning along the {} axis is not supported", .0.name())]
    UnsupportedAxis(RebinAxis),
    #[error(
        "joint rebinning needs aligned axes, found {count_channels} count and {photon_channels} photon channels"
    )]
    AxisMismatch {
        count_channels: usize,
        photon_channels: usize,
    },
}

/// A command was valid but the state it needs is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("nothing to undo in {0} as data has not been rebinned")]
    NotRebinned(String),
    #[error("cannot merge collections when one of them has no spectra loaded")]
    EmptyCollection,
}

/// Failure reported by a [`ResponseRebinner`](crate::response::ResponseRebinner).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    #[error("reprojected response has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("response rebinning along the {} axis is not supported", .0.name())]
    Unsupported(RebinAxis),
    #[error("{0}")]
    Failed(String),
}

/// Why a single spectrum could not be regrouped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegroupError {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error("response rebinning failed: {0}")]
    Response(#[from] ResponseError),
}

/// A non-fatal, human-readable outcome of a command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error(
        "{}{counts} counts in {channels} channels are left over from binning (bin min. {group_min}) and will not be included when fitting",
        .spectrum.as_deref().map(|s| format!("In {s}: ")).unwrap_or_default()
    )]
    Leftover {
        spectrum: Option<String>,
        channels: usize,
        counts: f64,
        group_min: u32,
    },
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("{spectrum} left unchanged: {source}")]
    Rebin {
        spectrum: String,
        source: RegroupError,
    },
}

impl Diagnostic {
    /// Log the diagnostic at warning level and hand it back.
    pub(crate) fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leftover_message() {
        let named = Diagnostic::Leftover {
            spectrum: Some("spectrum2".into()),
            channels: 3,
            counts: 4.0,
            group_min: 10,
        };
        assert_eq!(
            named.to_string(),
            "In spectrum2: 4 counts in 3 channels are left over from binning (bin min. 10) and will not be included when fitting"
        );

        let anonymous = Diagnostic::Leftover {
            spectrum: None,
            channels: 1,
            counts: 1.0,
            group_min: 2,
        };
        assert!(anonymous.to_string().starts_with("1 counts in 1 channels"));
    }

    #[test]
    fn test_rebin_diagnostic_wraps_source() {
        let diag = Diagnostic::Rebin {
            spectrum: "spectrum1".into(),
            source: UsageError::InvalidThreshold { value: -3 }.into(),
        };
        assert_eq!(
            diag.to_string(),
            "spectrum1 left unchanged: the minimum group count must be an integer > 0, got -3"
        );
    }
}
