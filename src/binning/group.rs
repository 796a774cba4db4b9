//! Greedy minimum-count grouping of count channels.

use std::ops::Range;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Diagnostic, UsageError};

/// Channels that were accumulated but never reached the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leftover {
    /// Number of trailing channels in the unfinished group.
    pub channels: usize,
    /// Their summed counts.
    pub counts: f64,
}

/// Result of grouping a spectrum's channels.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedChannels {
    /// `[low, high)` interval of each output bin, shape `(M, 2)`.
    pub bins: Array2<f64>,
    /// Counts of each output bin. Remainder channels carry zero.
    pub counts: Array1<f64>,
    /// Input channels backing each output bin.
    pub channel_ranges: Vec<Range<usize>>,
    /// Number of leading bins closed by the threshold. The rest are
    /// remainder channels kept at their native width.
    pub closed: usize,
    /// Unfinished accumulation dropped from the counts axis.
    pub leftover: Option<Leftover>,
    /// Threshold used, `None` for the identity grouping.
    pub group_min: Option<u32>,
}

impl GroupedChannels {
    /// Ungrouped channels: every input channel is its own closed bin.
    pub fn identity(channel_bins: ArrayView2<'_, f64>, counts: ArrayView1<'_, f64>) -> Self {
        let n = counts.len();
        Self {
            bins: channel_bins.to_owned(),
            counts: counts.to_owned(),
            channel_ranges: (0..n).map(|c| c..c + 1).collect(),
            closed: n,
            leftover: None,
            group_min: None,
        }
    }

    /// Number of output bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of remainder channels appended after the closed bins.
    #[inline]
    pub fn remainder(&self) -> usize {
        self.len() - self.closed
    }

    /// Total number of input channels covered by the output bins.
    pub fn input_channels(&self) -> usize {
        self.channel_ranges.iter().map(|r| r.end).max().unwrap_or(0)
    }

    /// Build (and log) the leftover diagnostic, if there is one.
    pub fn report_leftover(&self, spectrum: Option<&str>) -> Option<Diagnostic> {
        let leftover = self.leftover?;
        let group_min = self.group_min?;
        Some(
            Diagnostic::Leftover {
                spectrum: spectrum.map(str::to_string),
                channels: leftover.channels,
                counts: leftover.counts,
                group_min,
            }
            .emit(),
        )
    }
}

/// Group channels so every bin holds at least `group_min` counts.
///
/// Channels are walked left to right. A channel that meets the threshold on
/// its own while nothing is pending closes as its own bin; otherwise counts
/// accumulate until the running total meets the threshold and the bin spans
/// from the first accumulated channel to the current one. A final
/// accumulation below the threshold is not emitted and is reported in
/// [`GroupedChannels::leftover`]. Channels beyond the last closed bin are
/// appended at native width with zero counts so the response matrix stays
/// addressable.
///
/// `None` returns the input unchanged. A non-positive threshold is a usage
/// error and the caller keeps its input.
pub fn group_counts(
    channel_bins: ArrayView2<'_, f64>,
    counts: ArrayView1<'_, f64>,
    group_min: Option<i64>,
) -> Result<GroupedChannels, UsageError> {
    check_channels(channel_bins, counts)?;
    match group_min {
        None => Ok(GroupedChannels::identity(channel_bins, counts)),
        Some(value) => {
            let group_min = threshold(value)?;
            Ok(greedy_group(channel_bins, counts, group_min))
        }
    }
}

/// Validate a requested threshold.
pub fn threshold(value: i64) -> Result<u32, UsageError> {
    u32::try_from(value)
        .ok()
        .filter(|&m| m > 0)
        .ok_or(UsageError::InvalidThreshold { value })
}

pub(crate) fn check_channels(
    channel_bins: ArrayView2<'_, f64>,
    counts: ArrayView1<'_, f64>,
) -> Result<(), UsageError> {
    if channel_bins.ncols() != 2 || channel_bins.nrows() != counts.len() {
        return Err(UsageError::ChannelMismatch {
            bins: channel_bins.dim(),
            counts: counts.len(),
        });
    }
    Ok(())
}

pub(crate) fn greedy_group(
    channel_bins: ArrayView2<'_, f64>,
    counts: ArrayView1<'_, f64>,
    group_min: u32,
) -> GroupedChannels {
    let min = f64::from(group_min);
    let n = counts.len();

    let mut bins: Vec<f64> = Vec::new();
    let mut grouped: Vec<f64> = Vec::new();
    let mut ranges: Vec<Range<usize>> = Vec::new();

    let mut pending: Option<usize> = None;
    let mut running = 0.0;

    for (c, &count) in counts.iter().enumerate() {
        match pending {
            None if count >= min => {
                bins.extend([channel_bins[[c, 0]], channel_bins[[c, 1]]]);
                grouped.push(count);
                ranges.push(c..c + 1);
            }
            _ => {
                let start = *pending.get_or_insert(c);
                running += count;
                if running >= min {
                    bins.extend([channel_bins[[start, 0]], channel_bins[[c, 1]]]);
                    grouped.push(running);
                    ranges.push(start..c + 1);
                    running = 0.0;
                    pending = None;
                }
            }
        }
    }

    let closed = grouped.len();
    let leftover = match pending {
        Some(start) if running > 0.0 => Some(Leftover {
            channels: n - start,
            counts: running,
        }),
        _ => None,
    };

    // Everything past the last closed edge keeps its native width.
    let last_edge = bins.last().copied();
    for c in 0..n {
        let beyond = last_edge.map_or(true, |edge| channel_bins[[c, 1]] > edge);
        if beyond {
            bins.extend([channel_bins[[c, 0]], channel_bins[[c, 1]]]);
            grouped.push(0.0);
            ranges.push(c..c + 1);
        }
    }

    let m = grouped.len();
    let bins = Array2::from_shape_vec((m, 2), bins).unwrap_or_else(|_| Array2::zeros((0, 2)));

    GroupedChannels {
        bins,
        counts: Array1::from(grouped),
        channel_ranges: ranges,
        closed,
        leftover,
        group_min: Some(group_min),
    }
}

/// Group several spectra with the same threshold in parallel.
pub fn group_counts_batch(
    spectra: &[(ArrayView2<'_, f64>, ArrayView1<'_, f64>)],
    group_min: Option<i64>,
) -> Vec<Result<GroupedChannels, UsageError>> {
    use rayon::prelude::*;

    spectra
        .par_iter()
        .map(|(bins, counts)| group_counts(*bins, *counts, group_min))
        .collect()
}
