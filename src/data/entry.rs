//! Working record for one loaded spectrum.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::extras::SpectrumExtras;
use super::record::{edges_to_intervals, Exposure, SampleDistribution, SpectrumRecord};
use crate::binning::{group_counts, GroupedChannels};
use crate::config::RebinAxis;
use crate::error::{RegroupError, UsageError, ValidationError};
use crate::response::{check_rebinned_shape, ChannelSumResponse, ResponseRebinner};

/// Every field that changes when a spectrum is rebinned.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedFields {
    /// `(N, 2)` count channel intervals in keV.
    pub count_channel_bins: Array2<f64>,
    /// Midpoint of each count channel.
    pub count_channel_mids: Array1<f64>,
    /// Width of each count channel.
    pub count_channel_binning: Array1<f64>,
    /// `(P, 2)` photon bin intervals in keV.
    pub photon_channel_bins: Array2<f64>,
    /// Midpoint of each photon bin.
    pub photon_channel_mids: Array1<f64>,
    /// Width of each photon bin.
    pub photon_channel_binning: Array1<f64>,
    /// Counts per channel.
    pub counts: Array1<f64>,
    /// One-sigma error on each count.
    pub counts_error: Array1<f64>,
    /// Counts per keV per second.
    pub count_rate: Array1<f64>,
    /// Poisson error on the count rate.
    pub count_rate_error: Array1<f64>,
    /// `(P, N)` response matrix.
    pub response_matrix: Array2<f64>,
}

/// Binning state of an entry.
///
/// A spectrum is rebinned exactly when an archive of its original fields
/// exists.
#[derive(Debug, Clone, PartialEq)]
pub enum BinningState {
    Unbinned {
        live: BinnedFields,
    },
    Rebinned {
        live: BinnedFields,
        archive: BinnedFields,
        group_min: u32,
    },
}

impl BinningState {
    #[inline]
    pub fn live(&self) -> &BinnedFields {
        match self {
            BinningState::Unbinned { live } | BinningState::Rebinned { live, .. } => live,
        }
    }

    /// The fields as originally loaded.
    #[inline]
    pub fn original(&self) -> &BinnedFields {
        match self {
            BinningState::Unbinned { live } => live,
            BinningState::Rebinned { archive, .. } => archive,
        }
    }

    #[inline]
    pub fn is_rebinned(&self) -> bool {
        matches!(self, BinningState::Rebinned { .. })
    }
}

/// A spectrum as handed over by a loader.
#[derive(Debug, Clone)]
pub struct LoadedSpectrum {
    /// Counts per channel, finite and non-negative.
    pub counts: Array1<f64>,
    /// One-sigma error on each count.
    pub counts_error: Array1<f64>,
    /// `(N, 2)` count channel intervals.
    pub count_channel_bins: Array2<f64>,
    /// `(P, 2)` photon bin intervals.
    pub photon_channel_bins: Array2<f64>,
    /// `(P, N)` response matrix.
    pub response_matrix: Array2<f64>,
    /// Exposure in seconds, one value or one per count channel.
    pub effective_exposure: Exposure,
    pub sample_distribution: SampleDistribution,
    /// Metadata that plays no part in binning.
    pub extras: SpectrumExtras,
}

impl From<SpectrumRecord> for LoadedSpectrum {
    fn from(record: SpectrumRecord) -> Self {
        LoadedSpectrum {
            counts: record.counts().clone(),
            counts_error: record.counts_error().clone(),
            count_channel_bins: edges_to_intervals(record.count_energy_edges().view()),
            photon_channel_bins: edges_to_intervals(record.photon_energy_edges().view()),
            response_matrix: record.response_matrix().clone(),
            effective_exposure: record.effective_exposure().clone(),
            sample_distribution: record.sample_distribution(),
            extras: SpectrumExtras::default(),
        }
    }
}

/// One loaded spectrum inside a collection.
#[derive(Debug, Clone)]
pub struct SpectrumEntry {
    state: BinningState,
    effective_exposure: Exposure,
    sample_distribution: SampleDistribution,
    extras: SpectrumExtras,
    response: Arc<dyn ResponseRebinner>,
}

impl SpectrumEntry {
    /// Check a loader record and derive mids, widths and rates.
    ///
    /// The entry reprojects its response with [`ChannelSumResponse`] until
    /// another rule is set through [`SpectrumEntry::with_response_rebinner`].
    pub fn new(loaded: LoadedSpectrum) -> Result<Self, ValidationError> {
        check_intervals("count_channel_bins", loaded.count_channel_bins.view())?;
        check_intervals("photon_channel_bins", loaded.photon_channel_bins.view())?;

        let channels = loaded.count_channel_bins.nrows();
        if loaded.counts.len() != channels || loaded.counts_error.len() != channels {
            return Err(ValidationError::LengthMismatch {
                counts: loaded.counts.len(),
                counts_error: loaded.counts_error.len(),
                channels,
            });
        }
        let expected = (loaded.photon_channel_bins.nrows(), channels);
        if loaded.response_matrix.dim() != expected {
            return Err(ValidationError::ResponseShape {
                expected,
                found: loaded.response_matrix.dim(),
            });
        }
        let exposures = loaded.effective_exposure.len();
        if exposures != 1 && exposures != channels {
            return Err(ValidationError::ExposureShape {
                found: exposures,
                expected: channels,
            });
        }
        if let Some((index, &value)) = loaded
            .counts
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(ValidationError::InvalidCounts { index, value });
        }

        Ok(Self::assemble(LoadedSpectrum {
            effective_exposure: loaded.effective_exposure.normalized(),
            ..loaded
        }))
    }

    /// Build from an already validated record.
    pub fn from_record(record: SpectrumRecord, extras: SpectrumExtras) -> Self {
        Self::assemble(LoadedSpectrum {
            extras,
            ..LoadedSpectrum::from(record)
        })
    }

    fn assemble(loaded: LoadedSpectrum) -> Self {
        let LoadedSpectrum {
            counts,
            counts_error,
            count_channel_bins,
            photon_channel_bins,
            response_matrix,
            effective_exposure,
            sample_distribution,
            extras,
        } = loaded;

        let count_channel_binning = widths(count_channel_bins.view());
        let (count_rate, count_rate_error) = count_rates(&counts, &count_channel_binning, |c| {
            effective_exposure.at(c)
        });
        let live = BinnedFields {
            count_channel_mids: mids(count_channel_bins.view()),
            count_channel_binning,
            count_channel_bins,
            photon_channel_mids: mids(photon_channel_bins.view()),
            photon_channel_binning: widths(photon_channel_bins.view()),
            photon_channel_bins,
            counts,
            counts_error,
            count_rate,
            count_rate_error,
            response_matrix,
        };

        Self {
            state: BinningState::Unbinned { live },
            effective_exposure,
            sample_distribution,
            extras,
            response: Arc::new(ChannelSumResponse),
        }
    }

    /// Use a different response reprojection rule.
    pub fn with_response_rebinner(mut self, response: Arc<dyn ResponseRebinner>) -> Self {
        self.response = response;
        self
    }

    #[inline]
    pub fn state(&self) -> &BinningState {
        &self.state
    }

    #[inline]
    pub fn live(&self) -> &BinnedFields {
        self.state.live()
    }

    #[inline]
    pub fn original(&self) -> &BinnedFields {
        self.state.original()
    }

    #[inline]
    pub fn is_rebinned(&self) -> bool {
        self.state.is_rebinned()
    }

    /// Threshold the live fields were grouped with.
    pub fn group_min(&self) -> Option<u32> {
        match self.state {
            BinningState::Rebinned { group_min, .. } => Some(group_min),
            BinningState::Unbinned { .. } => None,
        }
    }

    #[inline]
    pub fn counts(&self) -> &Array1<f64> {
        &self.live().counts
    }

    #[inline]
    pub fn count_channel_bins(&self) -> &Array2<f64> {
        &self.live().count_channel_bins
    }

    #[inline]
    pub fn count_rate(&self) -> &Array1<f64> {
        &self.live().count_rate
    }

    #[inline]
    pub fn response_matrix(&self) -> &Array2<f64> {
        &self.live().response_matrix
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
    pub fn extras(&self) -> &SpectrumExtras {
        &self.extras
    }

    #[inline]
    pub fn extras_mut(&mut self) -> &mut SpectrumExtras {
        &mut self.extras
    }

    pub fn response_rebinner(&self) -> &dyn ResponseRebinner {
        self.response.as_ref()
    }

    /// Compute the state this entry would have after grouping its original
    /// channels with `group_min`. Nothing is modified.
    pub fn regrouped(
        &self,
        group_min: u32,
        axis: RebinAxis,
    ) -> Result<(BinningState, GroupedChannels), RegroupError> {
        let original = self.original();
        if axis == RebinAxis::Photon {
            return Err(UsageError::UnsupportedAxis(axis).into());
        }
        let photon_channels = original.photon_channel_bins.nrows();
        let count_channels = original.count_channel_bins.nrows();
        if axis.touches_photons() && photon_channels != count_channels {
            return Err(UsageError::AxisMismatch {
                count_channels,
                photon_channels,
            }
            .into());
        }

        let grouping = group_counts(
            original.count_channel_bins.view(),
            original.counts.view(),
            Some(i64::from(group_min)),
        )?;

        let response =
            self.response
                .rebin_response(original.response_matrix.view(), axis, &grouping)?;
        let rows = if axis.touches_photons() {
            grouping.len()
        } else {
            photon_channels
        };
        check_rebinned_shape(&response, (rows, grouping.len()))?;

        let live = self.grouped_fields(original, &grouping, axis, response);
        let state = BinningState::Rebinned {
            live,
            archive: original.clone(),
            group_min,
        };
        Ok((state, grouping))
    }

    fn grouped_fields(
        &self,
        original: &BinnedFields,
        grouping: &GroupedChannels,
        axis: RebinAxis,
        response_matrix: Array2<f64>,
    ) -> BinnedFields {
        let bins = grouping.bins.clone();
        let binning = widths(bins.view());
        let bin_mids = mids(bins.view());

        let counts_error: Array1<f64> = grouping
            .channel_ranges
            .iter()
            .enumerate()
            .map(|(i, range)| {
                if i < grouping.closed {
                    original
                        .counts_error
                        .slice(ndarray::s![range.clone()])
                        .mapv(|e| e * e)
                        .sum()
                        .sqrt()
                } else {
                    0.0
                }
            })
            .collect();

        let exposure = &self.effective_exposure;
        let original_widths = original.count_channel_binning.view();
        let (count_rate, count_rate_error) = count_rates(&grouping.counts, &binning, |i| {
            exposure.over(grouping.channel_ranges[i].clone(), original_widths)
        });

        let (photon_channel_bins, photon_channel_mids, photon_channel_binning) =
            if axis.touches_photons() {
                (bins.clone(), bin_mids.clone(), binning.clone())
            } else {
                (
                    original.photon_channel_bins.clone(),
                    original.photon_channel_mids.clone(),
                    original.photon_channel_binning.clone(),
                )
            };

        BinnedFields {
            count_channel_bins: bins,
            count_channel_mids: bin_mids,
            count_channel_binning: binning,
            photon_channel_bins,
            photon_channel_mids,
            photon_channel_binning,
            counts: grouping.counts.clone(),
            counts_error,
            count_rate,
            count_rate_error,
            response_matrix,
        }
    }

    /// Swap in a state computed by [`SpectrumEntry::regrouped`].
    pub(crate) fn set_state(&mut self, state: BinningState) {
        self.state = state;
    }

    /// Restore the archived fields. Returns `false` if not rebinned.
    pub(crate) fn restore(&mut self) -> bool {
        let archive = match &self.state {
            BinningState::Rebinned { archive, .. } => archive.clone(),
            BinningState::Unbinned { .. } => return false,
        };
        self.state = BinningState::Unbinned { live: archive };
        true
    }
}

/// Intervals must be `(n, 2)`, each with `high > low`, sorted and not
/// overlapping.
fn check_intervals(field: &'static str, bins: ArrayView2<'_, f64>) -> Result<(), ValidationError> {
    if bins.ncols() != 2 {
        return Err(ValidationError::IntervalShape {
            field,
            found: bins.dim(),
        });
    }
    let mut previous_high = f64::NEG_INFINITY;
    for (index, row) in bins.axis_iter(Axis(0)).enumerate() {
        if !(row[1] > row[0]) || !(row[0] >= previous_high) {
            return Err(ValidationError::NotIncreasing { field, index });
        }
        previous_high = row[1];
    }
    Ok(())
}

/// Midpoint of each `[low, high)` interval.
pub fn mids(bins: ArrayView2<'_, f64>) -> Array1<f64> {
    bins.mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::zeros(bins.nrows()))
}

/// Width of each `[low, high)` interval.
pub fn widths(bins: ArrayView2<'_, f64>) -> Array1<f64> {
    bins.axis_iter(Axis(0)).map(|row| row[1] - row[0]).collect()
}

/// Count rate and its Poisson error: `counts / width / exposure` and
/// `sqrt(counts) / width / exposure`.
fn count_rates(
    counts: &Array1<f64>,
    widths: &Array1<f64>,
    exposure: impl Fn(usize) -> f64,
) -> (Array1<f64>, Array1<f64>) {
    let rate = counts
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (c, w))| c / w / exposure(i))
        .collect();
    let rate_error = counts
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (c, w))| c.sqrt() / w / exposure(i))
        .collect();
    (rate, rate_error)
}
