//! Validated spectrum record.
//!
//! A [`SpectrumRecord`] holds only what is needed for spectral fitting:
//! counts and their errors, count and photon energy edges, the spectral
//! response matrix and the effective exposure. Everything else (widths,
//! rates, channel intervals) is derived from these.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayD, ArrayView1, Ix1, Ix2};

use super::units::{EnergyUnit, Quantity, ResponseUnit, TimeUnit};
use crate::error::ValidationError;

/// Sampling distribution of the counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub enum SampleDistribution {
    Gaussian,
    #[default]
    Poissonian,
}

impl SampleDistribution {
    pub fn name(&self) -> &'static str {
        match self {
            SampleDistribution::Gaussian => "Gaussian",
            SampleDistribution::Poissonian => "Poissonian",
        }
    }
}

impl fmt::Display for SampleDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleDistribution {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" => Ok(SampleDistribution::Gaussian),
            "poissonian" => Ok(SampleDistribution::Poissonian),
            _ => Err(ValidationError::UnknownDistribution(s.to_string())),
        }
    }
}

/// Effective exposure, either one value or one per original count channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Exposure {
    Scalar(f64),
    PerChannel(Array1<f64>),
}

impl Exposure {
    /// Number of stored values (1 for a scalar).
    pub fn len(&self) -> usize {
        match self {
            Exposure::Scalar(_) => 1,
            Exposure::PerChannel(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collapse a single per-channel value into a scalar.
    pub fn normalized(self) -> Self {
        match self {
            Exposure::PerChannel(values) if values.len() == 1 => Exposure::Scalar(values[0]),
            other => other,
        }
    }

    /// Exposure of one channel. A scalar or single value broadcasts.
    #[inline]
    pub fn at(&self, channel: usize) -> f64 {
        match self {
            Exposure::Scalar(value) => *value,
            Exposure::PerChannel(values) if values.len() == 1 => values[0],
            Exposure::PerChannel(values) => values[channel],
        }
    }

    /// Exposure of a group of channels: the width-weighted mean of its
    /// members. A scalar broadcasts unchanged.
    pub fn over(&self, channels: Range<usize>, widths: ArrayView1<'_, f64>) -> f64 {
        match self {
            Exposure::Scalar(value) => *value,
            Exposure::PerChannel(values) if values.len() == 1 => values[0],
            Exposure::PerChannel(values) => {
                let mut weighted = 0.0;
                let mut total = 0.0;
                for c in channels.clone() {
                    weighted += values[c] * widths[c];
                    total += widths[c];
                }
                if total > 0.0 {
                    weighted / total
                } else {
                    values[channels.start]
                }
            }
        }
    }
}

impl From<f64> for Exposure {
    fn from(value: f64) -> Self {
        Exposure::Scalar(value)
    }
}

/// Raw inputs for a [`SpectrumRecord`], as handed over by a loader.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub counts: ArrayD<f64>,
    pub counts_error: ArrayD<f64>,
    pub count_energy_edges: Quantity<EnergyUnit>,
    pub photon_energy_edges: Quantity<EnergyUnit>,
    pub response_matrix: Quantity<ResponseUnit>,
    pub effective_exposure: Quantity<TimeUnit>,
    pub sample_distribution: String,
}

/// A self-consistent spectrum/response bundle.
///
/// Constructed once through [`SpectrumRecord::new`], never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumRecord {
    counts: Array1<f64>,
    counts_error: Array1<f64>,
    count_energy_edges: Array1<f64>,
    photon_energy_edges: Array1<f64>,
    response_matrix: Array2<f64>,
    effective_exposure: Exposure,
    sample_distribution: SampleDistribution,
    count_energy_widths: Array1<f64>,
    photon_energy_widths: Array1<f64>,
}

impl SpectrumRecord {
    /// Normalize units and validate.
    ///
    /// Checks run in order: dimensionality, exposure shape, distribution
    /// tag, count-array consistency, response-matrix shape, then edge
    /// monotonicity and count values. The first failure is returned.
    pub fn new(input: RecordInput) -> Result<Self, ValidationError> {
        let RecordInput {
            counts,
            counts_error,
            count_energy_edges,
            photon_energy_edges,
            response_matrix,
            effective_exposure,
            sample_distribution,
        } = input;

        let counts = rank1("counts", counts)?;
        let counts_error = rank1("counts_error", counts_error)?;
        let count_energy_edges = rank1("count_energy_edges", count_energy_edges.into_canonical())?;
        let photon_energy_edges =
            rank1("photon_energy_edges", photon_energy_edges.into_canonical())?;
        let response_matrix = response_matrix.into_canonical();
        let response_ndim = response_matrix.ndim();
        let response_matrix = response_matrix
            .into_dimensionality::<Ix2>()
            .map_err(|_| ValidationError::Dimensionality {
                field: "response_matrix",
                expected: "rank-2",
                found: response_ndim,
            })?;

        let exposure = effective_exposure.into_canonical();
        let effective_exposure = match exposure.ndim() {
            0 => Exposure::Scalar(exposure.iter().copied().next().unwrap_or_default()),
            1 => {
                let values = rank1("effective_exposure", exposure)?;
                if values.len() != 1 && values.len() != counts.len() {
                    return Err(ValidationError::ExposureShape {
                        found: values.len(),
                        expected: counts.len(),
                    });
                }
                Exposure::PerChannel(values).normalized()
            }
            found => {
                return Err(ValidationError::Dimensionality {
                    field: "effective_exposure",
                    expected: "a scalar or rank-1",
                    found,
                })
            }
        };

        let sample_distribution: SampleDistribution = sample_distribution.parse()?;

        if count_energy_edges.len() < 2 {
            return Err(ValidationError::TooFewEdges {
                field: "count_energy_edges",
                found: count_energy_edges.len(),
            });
        }
        let channels = count_energy_edges.len() - 1;
        if counts.len() != channels || counts_error.len() != channels {
            return Err(ValidationError::LengthMismatch {
                counts: counts.len(),
                counts_error: counts_error.len(),
                channels,
            });
        }

        if photon_energy_edges.len() < 2 {
            return Err(ValidationError::TooFewEdges {
                field: "photon_energy_edges",
                found: photon_energy_edges.len(),
            });
        }
        let expected = (photon_energy_edges.len() - 1, channels);
        if response_matrix.dim() != expected {
            return Err(ValidationError::ResponseShape {
                expected,
                found: response_matrix.dim(),
            });
        }

        check_increasing("count_energy_edges", count_energy_edges.view())?;
        check_increasing("photon_energy_edges", photon_energy_edges.view())?;
        if let Some((index, &value)) = counts
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(ValidationError::InvalidCounts { index, value });
        }

        let count_energy_widths = diff(count_energy_edges.view());
        let photon_energy_widths = diff(photon_energy_edges.view());

        Ok(Self {
            counts,
            counts_error,
            count_energy_edges,
            photon_energy_edges,
            response_matrix,
            effective_exposure,
            sample_distribution,
            count_energy_widths,
            photon_energy_widths,
        })
    }

    /// Number of count channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of photon bins.
    #[inline]
    pub fn photon_bins(&self) -> usize {
        self.photon_energy_widths.len()
    }

    #[inline]
    pub fn counts(&self) -> &Array1<f64> {
        &self.counts
    }

    #[inline]
    pub fn counts_error(&self) -> &Array1<f64> {
        &self.counts_error
    }

    #[inline]
    pub fn count_energy_edges(&self) -> &Array1<f64> {
        &self.count_energy_edges
    }

    #[inline]
    pub fn photon_energy_edges(&self) -> &Array1<f64> {
        &self.photon_energy_edges
    }

    #[inline]
    pub fn response_matrix(&self) -> &Array2<f64> {
        &self.response_matrix
    }

    #[inline]
    pub fn effective_exposure(&self) -> &Exposure {
        &self.effective_exposure
    }

    #[inline]
    pub fn sample_distribution(&self) -> SampleDistribution {
        self.sample_distribution
    }

    #[inline]
    pub fn count_energy_widths(&self) -> &Array1<f64> {
        &self.count_energy_widths
    }

    #[inline]
    pub fn photon_energy_widths(&self) -> &Array1<f64> {
        &self.photon_energy_widths
    }
}

fn rank1(field: &'static str, values: ArrayD<f64>) -> Result<Array1<f64>, ValidationError> {
    let found = values.ndim();
    values
        .into_dimensionality::<Ix1>()
        .map_err(|_| ValidationError::Dimensionality {
            field,
            expected: "rank-1",
            found,
        })
}

fn check_increasing(field: &'static str, edges: ArrayView1<'_, f64>) -> Result<(), ValidationError> {
    match edges
        .windows(2)
        .into_iter()
        .position(|w| !(w[1] > w[0]))
    {
        Some(index) => Err(ValidationError::NotIncreasing {
            field,
            index: index + 1,
        }),
        None => Ok(()),
    }
}

/// Successive differences of a sequence of edges.
pub fn diff(edges: ArrayView1<'_, f64>) -> Array1<f64> {
    edges.windows(2).into_iter().map(|w| w[1] - w[0]).collect()
}

/// Convert `N+1` edges into `N` contiguous `[low, high)` intervals.
pub fn edges_to_intervals(edges: ArrayView1<'_, f64>) -> Array2<f64> {
    let n = edges.len().saturating_sub(1);
    Array2::from_shape_fn((n, 2), |(i, j)| edges[i + j])
}
