//! Search for the smallest threshold that groups every channel.

use ndarray::{ArrayView1, ArrayView2};

use super::group::{check_channels, greedy_group, threshold, GroupedChannels};
use crate::error::UsageError;

/// A threshold that leaves nothing over, with the grouping it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumGrouping {
    pub group_min: u32,
    pub grouped: GroupedChannels,
}

/// Find the smallest threshold, starting from `start`, whose greedy grouping
/// consumes every channel into a closed bin.
///
/// Returns `Ok(None)` when the candidate grows to the total count sum, i.e.
/// the only exact grouping left is one bin over the whole spectrum.
pub fn find_minimum_threshold(
    channel_bins: ArrayView2<'_, f64>,
    counts: ArrayView1<'_, f64>,
    start: i64,
) -> Result<Option<MinimumGrouping>, UsageError> {
    check_channels(channel_bins, counts)?;
    let mut group_min = threshold(start)?;
    let total = counts.sum();

    loop {
        let grouped = greedy_group(channel_bins, counts, group_min);
        let left = grouped.leftover.map_or(0.0, |l| l.counts);
        log::trace!("group min {group_min} has {left} counts left over");

        let candidate = f64::from(group_min);
        if grouped.leftover.is_none() {
            if candidate == total {
                log::debug!(
                    "the minimum group number being tried ({group_min}) is the same as the total number of counts"
                );
                return Ok(None);
            }
            log::debug!("group minimum that works is {group_min}");
            return Ok(Some(MinimumGrouping { group_min, grouped }));
        }
        if candidate >= total {
            return Ok(None);
        }
        group_min = match group_min.checked_add(1) {
            Some(next) => next,
            None => return Ok(None),
        };
    }
}
