//! FFI functions for stateless channel grouping.

use ndarray::{ArrayView1, ArrayView2};

use super::types::{CGroupResult, XrStatus};
use crate::binning::{find_minimum_threshold, group_counts};

/// Borrow `len` channel intervals (row-major `[low, high)` pairs) and counts.
///
/// # Safety
/// `channel_bins` must hold `2 * len` values and `counts` `len` values.
unsafe fn channel_views<'a>(
    channel_bins: *const f64,
    counts: *const f64,
    len: usize,
) -> Option<(ArrayView2<'a, f64>, ArrayView1<'a, f64>)> {
    let bins = std::slice::from_raw_parts(channel_bins, 2 * len);
    let counts = std::slice::from_raw_parts(counts, len);
    let bins = ArrayView2::from_shape((len, 2), bins).ok()?;
    Some((bins, ArrayView1::from(counts)))
}

/// Group channels so each bin holds at least `group_min` counts.
///
/// # Safety
/// `channel_bins` must hold `2 * len` values, `counts` `len` values.
/// Caller must free the result with `xr_group_free`.
#[no_mangle]
pub unsafe extern "C" fn xr_group_counts(
    channel_bins: *const f64,
    counts: *const f64,
    len: usize,
    group_min: i64,
    out_result: *mut CGroupResult,
) -> XrStatus {
    if channel_bins.is_null() || counts.is_null() || out_result.is_null() {
        return XrStatus::NullPointer;
    }
    let Some((bins, counts)) = channel_views(channel_bins, counts, len) else {
        return XrStatus::LengthMismatch;
    };

    match group_counts(bins, counts, Some(group_min)) {
        Ok(grouping) => {
            grouping.report_leftover(None);
            *out_result = CGroupResult::from_grouping(&grouping);
            XrStatus::Ok
        }
        Err(err) => XrStatus::from(&err),
    }
}

/// Free a grouping result.
///
/// # Safety
/// Result must have been filled by `xr_group_counts` or be zeroed.
#[no_mangle]
pub unsafe extern "C" fn xr_group_free(result: *mut CGroupResult) {
    if result.is_null() {
        return;
    }
    (*result).release();
}

/// Find the smallest threshold from `start` that leaves nothing over.
///
/// Returns `NotFound` when only a single bin over the whole spectrum would
/// work.
///
/// # Safety
/// `channel_bins` must hold `2 * len` values, `counts` `len` values.
#[no_mangle]
pub unsafe extern "C" fn xr_find_minimum_threshold(
    channel_bins: *const f64,
    counts: *const f64,
    len: usize,
    start: i64,
    out_group_min: *mut u32,
) -> XrStatus {
    if channel_bins.is_null() || counts.is_null() || out_group_min.is_null() {
        return XrStatus::NullPointer;
    }
    let Some((bins, counts)) = channel_views(channel_bins, counts, len) else {
        return XrStatus::LengthMismatch;
    };

    match find_minimum_threshold(bins, counts, start) {
        Ok(Some(found)) => {
            *out_group_min = found.group_min;
            XrStatus::Ok
        }
        Ok(None) => XrStatus::NotFound,
        Err(err) => XrStatus::from(&err),
    }
}
