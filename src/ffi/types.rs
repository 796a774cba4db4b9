//! C-compatible type definitions for FFI.

use crate::binning::GroupedChannels;
use crate::error::{StateError, UsageError, ValidationError};

/// Result status codes for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer was passed.
    NullPointer = 1,
    /// Invalid argument.
    InvalidArgument = 2,
    /// Array length mismatch.
    LengthMismatch = 3,
    /// Invalid UTF-8 string.
    InvalidUtf8 = 4,
    /// Spectrum data failed validation.
    ValidationError = 5,
    /// Spectrum or result not found.
    NotFound = 6,
    /// Operation not valid in the current binning state.
    StateError = 7,
}

impl From<&ValidationError> for XrStatus {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::LengthMismatch { .. } | ValidationError::ResponseShape { .. } => {
                XrStatus::LengthMismatch
            }
            _ => XrStatus::ValidationError,
        }
    }
}

impl From<&UsageError> for XrStatus {
    fn from(err: &UsageError) -> Self {
        match err {
            UsageError::LengthMismatch { .. }
            | UsageError::ChannelMismatch { .. }
            | UsageError::AxisMismatch { .. } => XrStatus::LengthMismatch,
            UsageError::UnknownSpectrum(_) => XrStatus::NotFound,
            _ => XrStatus::InvalidArgument,
        }
    }
}

impl From<&StateError> for XrStatus {
    fn from(_: &StateError) -> Self {
        XrStatus::StateError
    }
}

/// C-compatible array view (pointer + length).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CArrayView {
    pub data: *const f64,
    pub len: usize,
}

impl CArrayView {
    pub fn empty() -> Self {
        Self {
            data: std::ptr::null(),
            len: 0,
        }
    }

    pub fn from_slice(values: &[f64]) -> Self {
        Self {
            data: values.as_ptr(),
            len: values.len(),
        }
    }
}

/// C-compatible grouping result.
///
/// `bins` holds `2 * len` values, `[low, high)` pairs in row-major order.
#[repr(C)]
#[derive(Debug)]
pub struct CGroupResult {
    pub bins: *mut f64,
    pub counts: *mut f64,
    /// Number of output bins.
    pub len: usize,
    /// Leading bins closed by the threshold.
    pub closed: usize,
    /// Channels left over at the end (0 when nothing was left).
    pub leftover_channels: usize,
    pub leftover_counts: f64,
}

impl CGroupResult {
    /// Zeroed result, safe to pass to `xr_group_free`.
    pub fn empty() -> Self {
        Self {
            bins: std::ptr::null_mut(),
            counts: std::ptr::null_mut(),
            len: 0,
            closed: 0,
            leftover_channels: 0,
            leftover_counts: 0.0,
        }
    }

    pub fn from_grouping(grouping: &GroupedChannels) -> Self {
        let bins: Vec<f64> = grouping.bins.iter().copied().collect();
        let counts: Vec<f64> = grouping.counts.iter().copied().collect();
        let (leftover_channels, leftover_counts) = grouping
            .leftover
            .map_or((0, 0.0), |left| (left.channels, left.counts));

        Self {
            bins: Box::into_raw(bins.into_boxed_slice()) as *mut f64,
            counts: Box::into_raw(counts.into_boxed_slice()) as *mut f64,
            len: grouping.len(),
            closed: grouping.closed,
            leftover_channels,
            leftover_counts,
        }
    }

    /// Release the arrays and zero the result.
    ///
    /// # Safety
    /// The arrays must come from [`CGroupResult::from_grouping`] and must not
    /// have been released before.
    pub unsafe fn release(&mut self) {
        if !self.bins.is_null() {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.bins,
                2 * self.len,
            )));
        }
        if !self.counts.is_null() {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.counts,
                self.len,
            )));
        }
        *self = Self::empty();
    }
}
