//! Response matrix reprojection hook.
//!
//! How a spectral response matrix follows a regrouped count axis depends on
//! the instrument and on the response format, so the collection never does
//! the arithmetic itself. Each entry carries a [`ResponseRebinner`] and the
//! collection asks it for the matrix matching a new grouping.

use std::fmt;

use ndarray::{s, Array2, ArrayView2, Axis};

use crate::binning::GroupedChannels;
use crate::config::RebinAxis;
use crate::error::ResponseError;

/// Reprojects a response matrix onto a grouped channel axis.
pub trait ResponseRebinner: Send + Sync + fmt::Debug {
    /// Reproject `response` onto `grouping`.
    ///
    /// `response` is always the original, ungrouped matrix (photon bins ×
    /// count channels). For [`RebinAxis::Count`] the result must have one
    /// column per output bin and keep the photon rows.
    fn rebin_response(
        &self,
        response: ArrayView2<'_, f64>,
        axis: RebinAxis,
        grouping: &GroupedChannels,
    ) -> Result<Array2<f64>, ResponseError>;

    /// Get the name of this reprojection rule.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Sums the response columns of the channels merged into each bin.
///
/// Suitable when the matrix columns are per-channel probabilities that
/// add when channels are combined. On the joint axis the photon rows are
/// summed over the same channel ranges. The photon axis alone is not
/// supported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChannelSumResponse;

impl ResponseRebinner for ChannelSumResponse {
    fn rebin_response(
        &self,
        response: ArrayView2<'_, f64>,
        axis: RebinAxis,
        grouping: &GroupedChannels,
    ) -> Result<Array2<f64>, ResponseError> {
        if !axis.touches_counts() {
            return Err(ResponseError::Unsupported(axis));
        }
        let (photons, channels) = response.dim();
        let needed = grouping.input_channels();
        let rows_short = axis.touches_photons() && needed > photons;
        if needed > channels || rows_short {
            return Err(ResponseError::ShapeMismatch {
                expected: (photons.max(needed), needed),
                found: (photons, channels),
            });
        }

        let mut columns = Array2::zeros((photons, grouping.len()));
        for (column, range) in grouping.channel_ranges.iter().enumerate() {
            let summed = response
                .slice(s![.., range.start..range.end])
                .sum_axis(Axis(1));
            columns.column_mut(column).assign(&summed);
        }
        if !axis.touches_photons() {
            return Ok(columns);
        }

        let mut rebinned = Array2::zeros((grouping.len(), grouping.len()));
        for (row, range) in grouping.channel_ranges.iter().enumerate() {
            let summed = columns
                .slice(s![range.start..range.end, ..])
                .sum_axis(Axis(0));
            rebinned.row_mut(row).assign(&summed);
        }
        Ok(rebinned)
    }

    fn name(&self) -> &'static str {
        "channel_sum"
    }
}

/// Check a reprojected matrix against the shape the axis requires.
pub(crate) fn check_rebinned_shape(
    rebinned: &Array2<f64>,
    expected: (usize, usize),
) -> Result<(), ResponseError> {
    if rebinned.dim() != expected {
        return Err(ResponseError::ShapeMismatch {
            expected,
            found: rebinned.dim(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::group_counts;
    use crate::data::edges_to_intervals;
    use ndarray::{array, Array1};

    #[test]
    fn test_channel_sum_columns() {
        let edges: Array1<f64> = (0..=4).map(f64::from).collect();
        let bins = edges_to_intervals(edges.view());
        let counts = array![1.0, 2.0, 5.0, 1.0];
        let grouping = group_counts(bins.view(), counts.view(), Some(3)).unwrap();
        // [0,2) 3 counts, [2,3) 5 counts, remainder [3,4)
        assert_eq!(grouping.counts, array![3.0, 5.0, 0.0]);

        let response = array![[1.0, 2.0, 3.0, 4.0], [0.5, 0.5, 0.5, 0.5]];
        let rebinned = ChannelSumResponse
            .rebin_response(response.view(), RebinAxis::Count, &grouping)
            .unwrap();

        assert_eq!(rebinned, array![[3.0, 3.0, 4.0], [1.0, 0.5, 0.5]]);
    }

    #[test]
    fn test_channel_sum_joint_axis() {
        let bins = array![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]];
        let counts = array![2.0, 2.0, 5.0];
        let grouping = group_counts(bins.view(), counts.view(), Some(4)).unwrap();
        let response = array![[1.0, 0.5, 0.5], [0.5, 1.0, 0.5], [0.5, 0.5, 1.0]];

        let rebinned = ChannelSumResponse
            .rebin_response(response.view(), RebinAxis::PhotonAndCount, &grouping)
            .unwrap();

        assert_eq!(rebinned, array![[3.0, 1.0], [1.0, 1.0]]);
    }

    #[test]
    fn test_channel_sum_rejects_photon_axis() {
        let bins = array![[0.0, 1.0]];
        let counts = array![1.0];
        let grouping = group_counts(bins.view(), counts.view(), Some(1)).unwrap();
        let response = array![[1.0]];

        assert_eq!(
            ChannelSumResponse.rebin_response(response.view(), RebinAxis::Photon, &grouping),
            Err(ResponseError::Unsupported(RebinAxis::Photon))
        );
    }

    #[test]
    fn test_channel_sum_needs_enough_columns() {
        let bins = array![[0.0, 1.0], [1.0, 2.0]];
        let counts = array![1.0, 1.0];
        let grouping = group_counts(bins.view(), counts.view(), Some(2)).unwrap();
        let response = array![[1.0]];

        assert!(matches!(
            ChannelSumResponse.rebin_response(response.view(), RebinAxis::Count, &grouping),
            Err(ResponseError::ShapeMismatch { .. })
        ));
    }
}
