//! Rebin requests and undo selectors.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::UsageError;

/// Key of a [`RebinRequest::Mapping`] that applies to every spectrum.
pub const ALL: &str = "all";

/// Prefix of generated spectrum identifiers.
pub const SPECTRUM_PREFIX: &str = "spectrum";

/// Identifier of the `ordinal`-th (1-indexed) spectrum.
pub fn spectrum_id(ordinal: usize) -> String {
    format!("{SPECTRUM_PREFIX}{ordinal}")
}

/// Which spectra to rebin and with which threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum RebinRequest {
    /// Same threshold for every spectrum. `None` leaves all of them alone.
    Uniform(Option<i64>),
    /// One threshold per loaded spectrum, in load order.
    PerSpectrum(Vec<Option<i64>>),
    /// Threshold per identifier. An [`ALL`] key overrides every other key.
    Mapping(IndexMap<String, Option<i64>>),
}

impl From<i64> for RebinRequest {
    fn from(group_min: i64) -> Self {
        RebinRequest::Uniform(Some(group_min))
    }
}

impl From<Option<i64>> for RebinRequest {
    fn from(group_min: Option<i64>) -> Self {
        RebinRequest::Uniform(group_min)
    }
}

impl From<Vec<Option<i64>>> for RebinRequest {
    fn from(group_mins: Vec<Option<i64>>) -> Self {
        RebinRequest::PerSpectrum(group_mins)
    }
}

impl From<Vec<i64>> for RebinRequest {
    fn from(group_mins: Vec<i64>) -> Self {
        RebinRequest::PerSpectrum(group_mins.into_iter().map(Some).collect())
    }
}

impl From<IndexMap<String, Option<i64>>> for RebinRequest {
    fn from(mapping: IndexMap<String, Option<i64>>) -> Self {
        RebinRequest::Mapping(mapping)
    }
}

/// Reference to one loaded spectrum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpectrumRef {
    /// Identifier such as `spectrum2`.
    Id(String),
    /// 1-indexed position in load order.
    Ordinal(usize),
}

impl From<usize> for SpectrumRef {
    fn from(ordinal: usize) -> Self {
        SpectrumRef::Ordinal(ordinal)
    }
}

impl fmt::Display for SpectrumRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpectrumRef::Id(id) => f.write_str(id),
            SpectrumRef::Ordinal(n) => write!(f, "{SPECTRUM_PREFIX}{n}"),
        }
    }
}

/// Accepts `"3"` or `"spectrum3"`.
impl FromStr for SpectrumRef {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let malformed = || UsageError::MalformedSelector(text.to_string());

        if let Ok(n) = text.parse::<usize>() {
            return if n > 0 {
                Ok(SpectrumRef::Ordinal(n))
            } else {
                Err(malformed())
            };
        }
        match text.strip_prefix(SPECTRUM_PREFIX).map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => Ok(SpectrumRef::Id(text.to_string())),
            _ => Err(malformed()),
        }
    }
}

/// Which spectra an undo applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UndoSelector {
    #[default]
    All,
    Spectra(Vec<SpectrumRef>),
    Nothing,
}

impl From<usize> for UndoSelector {
    fn from(ordinal: usize) -> Self {
        UndoSelector::Spectra(vec![SpectrumRef::Ordinal(ordinal)])
    }
}

impl From<SpectrumRef> for UndoSelector {
    fn from(spectrum: SpectrumRef) -> Self {
        UndoSelector::Spectra(vec![spectrum])
    }
}

impl From<Vec<SpectrumRef>> for UndoSelector {
    fn from(spectra: Vec<SpectrumRef>) -> Self {
        UndoSelector::Spectra(spectra)
    }
}

impl<T: Into<UndoSelector>> From<Option<T>> for UndoSelector {
    fn from(selector: Option<T>) -> Self {
        selector.map_or(UndoSelector::Nothing, Into::into)
    }
}

/// Accepts `"all"`, `"none"`, or a comma separated list of spectrum
/// references.
impl FromStr for UndoSelector {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case(ALL) {
            return Ok(UndoSelector::All);
        }
        if text.is_empty() || text.eq_ignore_ascii_case("none") {
            return Ok(UndoSelector::Nothing);
        }
        text.split(',')
            .map(str::parse::<SpectrumRef>)
            .collect::<Result<Vec<_>, _>>()
            .map(UndoSelector::Spectra)
    }
}
