//! FFI functions for SpectrumCollection management.

use std::ffi::{c_char, CStr};

use ndarray::{Array1, Array2, ArrayView1};

use super::types::{CArrayView, XrStatus};
use crate::collection::{RebinRequest, SpectrumCollection, SpectrumRef};
use crate::config::{CollectionConfig, RebinAxis};
use crate::data::{
    edges_to_intervals, Exposure, LoadedSpectrum, SampleDistribution, SpectrumEntry, SpectrumExtras,
};

/// Opaque handle to a SpectrumCollection.
pub type CollectionHandle = *mut SpectrumCollection;

/// Configuration for creating a collection.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct CCollectionConfig {
    pub axis: RebinAxis,
    pub parallel: bool,
    /// Number of worker threads (0 = auto-detect).
    pub worker_count: usize,
    pub report_leftovers: bool,
}

impl Default for CCollectionConfig {
    fn default() -> Self {
        Self {
            axis: RebinAxis::Count,
            parallel: false,
            worker_count: 0,
            report_leftovers: true,
        }
    }
}

impl From<CCollectionConfig> for CollectionConfig {
    fn from(c: CCollectionConfig) -> Self {
        CollectionConfig {
            axis: c.axis,
            parallel: c.parallel,
            worker_count: if c.worker_count == 0 {
                num_cpus::get()
            } else {
                c.worker_count
            },
            report_leftovers: c.report_leftovers,
        }
    }
}

/// Create an empty collection.
///
/// # Safety
/// out_handle must be a valid pointer. config may be null.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_create(
    config: *const CCollectionConfig,
    out_handle: *mut CollectionHandle,
) -> XrStatus {
    if out_handle.is_null() {
        return XrStatus::NullPointer;
    }

    let cfg = if config.is_null() {
        CollectionConfig::default()
    } else {
        (*config).clone().into()
    };

    *out_handle = Box::into_raw(Box::new(SpectrumCollection::new(cfg)));
    XrStatus::Ok
}

/// Free a collection handle.
///
/// # Safety
/// Handle must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_free(handle: CollectionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Add a spectrum from raw arrays.
///
/// `count_edges` holds `n_channels + 1` values, `photon_edges`
/// `n_photons + 1` values and `response` `n_photons * n_channels` values in
/// row-major order. `sample_distribution` may be null for Poissonian. On
/// success `out_ordinal` receives the 1-indexed position of the spectrum.
///
/// # Safety
/// All non-null pointers must be valid for the stated lengths.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_add_spectrum(
    handle: CollectionHandle,
    counts: *const f64,
    counts_error: *const f64,
    count_edges: *const f64,
    n_channels: usize,
    photon_edges: *const f64,
    response: *const f64,
    n_photons: usize,
    effective_exposure: f64,
    sample_distribution: *const c_char,
    out_ordinal: *mut usize,
) -> XrStatus {
    if handle.is_null()
        || counts.is_null()
        || counts_error.is_null()
        || count_edges.is_null()
        || photon_edges.is_null()
        || response.is_null()
        || out_ordinal.is_null()
    {
        return XrStatus::NullPointer;
    }
    if n_channels == 0 || n_photons == 0 {
        return XrStatus::InvalidArgument;
    }

    let sample_distribution = if sample_distribution.is_null() {
        SampleDistribution::default()
    } else {
        let Ok(text) = CStr::from_ptr(sample_distribution).to_str() else {
            return XrStatus::InvalidUtf8;
        };
        match text.parse::<SampleDistribution>() {
            Ok(distribution) => distribution,
            Err(err) => return XrStatus::from(&err),
        }
    };

    let count_edges = std::slice::from_raw_parts(count_edges, n_channels + 1);
    let photon_edges = std::slice::from_raw_parts(photon_edges, n_photons + 1);
    let response = std::slice::from_raw_parts(response, n_photons * n_channels);
    let Ok(response_matrix) = Array2::from_shape_vec((n_photons, n_channels), response.to_vec())
    else {
        return XrStatus::LengthMismatch;
    };

    let loaded = LoadedSpectrum {
        counts: Array1::from(std::slice::from_raw_parts(counts, n_channels).to_vec()),
        counts_error: Array1::from(std::slice::from_raw_parts(counts_error, n_channels).to_vec()),
        count_channel_bins: edges_to_intervals(ArrayView1::from(count_edges)),
        photon_channel_bins: edges_to_intervals(ArrayView1::from(photon_edges)),
        response_matrix,
        effective_exposure: Exposure::Scalar(effective_exposure),
        sample_distribution,
        extras: SpectrumExtras::default(),
    };

    match SpectrumEntry::new(loaded) {
        Ok(entry) => {
            let collection = &mut *handle;
            collection.push(entry);
            *out_ordinal = collection.len();
            XrStatus::Ok
        }
        Err(err) => XrStatus::from(&err),
    }
}

/// Get the number of loaded spectra. Returns 0 for a null handle.
///
/// # Safety
/// Handle must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_len(handle: CollectionHandle) -> usize {
    if handle.is_null() {
        return 0;
    }
    (*handle).len()
}

/// Rebin the loaded spectra.
///
/// With `len == 1` the single threshold applies to every spectrum,
/// otherwise `group_mins` holds one threshold per spectrum. A threshold of 0
/// leaves its spectra unchanged. `out_diagnostics` (may be null) receives the number
/// of warnings produced; they are also logged.
///
/// # Safety
/// Handle must be valid and `group_mins` must hold `len` values.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_rebin(
    handle: CollectionHandle,
    group_mins: *const i64,
    len: usize,
    out_diagnostics: *mut usize,
) -> XrStatus {
    if handle.is_null() || group_mins.is_null() {
        return XrStatus::NullPointer;
    }
    if len == 0 {
        return XrStatus::InvalidArgument;
    }

    let values = std::slice::from_raw_parts(group_mins, len);
    let request = match values {
        [single] => RebinRequest::Uniform((*single != 0).then_some(*single)),
        many => RebinRequest::PerSpectrum(
            many.iter().map(|&m| (m != 0).then_some(m)).collect(),
        ),
    };

    match (*handle).rebin(request) {
        Ok(report) => {
            if !out_diagnostics.is_null() {
                *out_diagnostics = report.diagnostics.len();
            }
            XrStatus::Ok
        }
        Err(err) => XrStatus::from(&err),
    }
}

/// Undo rebinning.
///
/// `selector` is `"all"`, `"none"`, or a comma separated list such as
/// `"1,spectrum3"`. A null selector repeats the last undo.
/// `out_restored` (may be null) receives the number of restored spectra.
///
/// # Safety
/// Handle must be valid. selector must be null or a valid C string.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_undo_rebin(
    handle: CollectionHandle,
    selector: *const c_char,
    out_restored: *mut usize,
) -> XrStatus {
    if handle.is_null() {
        return XrStatus::NullPointer;
    }
    let collection = &mut *handle;

    let report = if selector.is_null() {
        collection.repeat_undo()
    } else {
        let Ok(text) = CStr::from_ptr(selector).to_str() else {
            return XrStatus::InvalidUtf8;
        };
        match collection.undo_rebin_str(text) {
            Ok(report) => report,
            Err(err) => return XrStatus::from(&err),
        }
    };

    if !out_restored.is_null() {
        *out_restored = report.restored.len();
    }
    XrStatus::Ok
}

/// Check whether the `ordinal`-th spectrum (1-indexed) is rebinned.
///
/// # Safety
/// Handle and out pointer must be valid.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_is_rebinned(
    handle: CollectionHandle,
    ordinal: usize,
    out_rebinned: *mut bool,
) -> XrStatus {
    if handle.is_null() || out_rebinned.is_null() {
        return XrStatus::NullPointer;
    }
    match (*handle).find(&SpectrumRef::Ordinal(ordinal)) {
        Some((_, entry)) => {
            *out_rebinned = entry.is_rebinned();
            XrStatus::Ok
        }
        None => XrStatus::NotFound,
    }
}

/// Get the live counts of the `ordinal`-th spectrum.
///
/// # Safety
/// Handle must be valid. Returned view is valid until the collection is
/// rebinned, undone or freed.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_get_counts(
    handle: CollectionHandle,
    ordinal: usize,
) -> CArrayView {
    if handle.is_null() {
        return CArrayView::empty();
    }
    (*handle)
        .find(&SpectrumRef::Ordinal(ordinal))
        .and_then(|(_, entry)| entry.counts().as_slice())
        .map_or_else(CArrayView::empty, CArrayView::from_slice)
}

/// Get the live channel intervals of the `ordinal`-th spectrum as
/// row-major `[low, high)` pairs (`len` is twice the number of channels).
///
/// # Safety
/// Handle must be valid. Returned view is valid until the collection is
/// rebinned, undone or freed.
#[no_mangle]
pub unsafe extern "C" fn xr_collection_get_count_channel_bins(
    handle: CollectionHandle,
    ordinal: usize,
) -> CArrayView {
    if handle.is_null() {
        return CArrayView::empty();
    }
    (*handle)
        .find(&SpectrumRef::Ordinal(ordinal))
        .and_then(|(_, entry)| entry.count_channel_bins().as_slice())
        .map_or_else(CArrayView::empty, CArrayView::from_slice)
}
