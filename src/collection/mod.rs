//! Ordered set of loaded spectra with rebin and undo commands.
//!
//! Spectra are keyed `spectrum1`, `spectrum2`, ... in load order. A rebin
//! always regroups from the original channels, so rebinning twice is the
//! same as undoing and rebinning once. Every command returns the
//! diagnostics it produced; they are also logged at warning level.

mod merge;
pub mod request;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ndarray::Array2;
use rayon::prelude::*;

pub use merge::merge;
pub use request::{spectrum_id, RebinRequest, SpectrumRef, UndoSelector, ALL};

use crate::binning::{threshold, GroupedChannels};
use crate::config::CollectionConfig;
use crate::data::{BinningState, LoadedSpectrum, SpectrumEntry};
use crate::error::{Diagnostic, RegroupError, StateError, UsageError, ValidationError};

/// Outcome of [`SpectrumCollection::rebin`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebinReport {
    /// Threshold applied to each rebinned spectrum.
    pub applied: IndexMap<String, u32>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of [`SpectrumCollection::undo_rebin`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoReport {
    /// Spectra whose original binning was restored.
    pub restored: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

type RegroupResult = Result<(BinningState, GroupedChannels), RegroupError>;

/// Loaded spectra and their binning state.
#[derive(Debug, Clone)]
pub struct SpectrumCollection {
    entries: IndexMap<String, SpectrumEntry>,
    config: CollectionConfig,
    /// Selector re-applied by [`SpectrumCollection::repeat_undo`].
    last_undo: UndoSelector,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for SpectrumCollection {
    fn default() -> Self {
        Self::new(CollectionConfig::default())
    }
}

impl SpectrumCollection {
    pub fn new(config: CollectionConfig) -> Self {
        let pool = if config.parallel {
            build_pool(config.worker_count)
        } else {
            None
        };
        Self {
            entries: IndexMap::new(),
            config,
            last_undo: UndoSelector::All,
            pool,
        }
    }

    /// Collection holding `entries` in order.
    pub fn from_entries(
        config: CollectionConfig,
        entries: impl IntoIterator<Item = SpectrumEntry>,
    ) -> Self {
        let mut collection = Self::new(config);
        for entry in entries {
            collection.push(entry);
        }
        collection
    }

    /// Append an entry and return its identifier.
    pub fn push(&mut self, entry: SpectrumEntry) -> String {
        let id = spectrum_id(self.entries.len() + 1);
        self.entries.insert(id.clone(), entry);
        id
    }

    /// Validate a loader record and append it.
    pub fn push_loaded(&mut self, loaded: LoadedSpectrum) -> Result<String, ValidationError> {
        let entry = SpectrumEntry::new(loaded)?;
        Ok(self.push(entry))
    }

    #[inline]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SpectrumEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SpectrumEntry> {
        self.entries.get_mut(id)
    }

    /// Look up an entry by identifier or ordinal.
    pub fn find(&self, spectrum: &SpectrumRef) -> Option<(&str, &SpectrumEntry)> {
        let index = self.position(spectrum)?;
        self.entries
            .get_index(index)
            .map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpectrumEntry)> + '_ {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    fn position(&self, spectrum: &SpectrumRef) -> Option<usize> {
        match spectrum {
            SpectrumRef::Id(id) => self.entries.get_index_of(id.as_str()),
            SpectrumRef::Ordinal(n) => n.checked_sub(1).filter(|&i| i < self.entries.len()),
        }
    }

    /// Regroup the count channels of the requested spectra.
    ///
    /// A length mismatch between a per-spectrum request and the loaded
    /// spectra is an error and nothing changes. Everything else that goes
    /// wrong for one spectrum is reported in the returned diagnostics and
    /// leaves that spectrum as it was.
    pub fn rebin(&mut self, request: impl Into<RebinRequest>) -> Result<RebinReport, UsageError> {
        let mut report = RebinReport::default();
        let targets = self.resolve_request(request.into(), &mut report.diagnostics)?;

        let mut jobs = Vec::with_capacity(targets.len());
        for (index, requested) in targets {
            let Some(value) = requested else { continue };
            match threshold(value) {
                Ok(group_min) => jobs.push((index, group_min)),
                Err(err) => {
                    let spectrum = self.id_at(index);
                    report.diagnostics.push(
                        Diagnostic::Rebin {
                            spectrum,
                            source: err.into(),
                        }
                        .emit(),
                    );
                }
            }
        }

        let results = self.regroup_all(&jobs);

        for (index, group_min, result) in results {
            let Some((id, entry)) = self.entries.get_index_mut(index) else {
                continue;
            };
            let id = id.to_string();
            match result {
                Ok((state, grouping)) => {
                    if self.config.report_leftovers {
                        report.diagnostics.extend(grouping.report_leftover(Some(&id)));
                    }
                    entry.set_state(state);
                    log::debug!("{id} rebinned to {} bins (group min {group_min})", grouping.len());
                    report.applied.insert(id, group_min);
                }
                Err(source) => {
                    report
                        .diagnostics
                        .push(Diagnostic::Rebin { spectrum: id, source }.emit());
                }
            }
        }
        Ok(report)
    }

    fn resolve_request(
        &self,
        request: RebinRequest,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<(usize, Option<i64>)>, UsageError> {
        let every = |value: Option<i64>| -> Vec<(usize, Option<i64>)> {
            (0..self.entries.len()).map(|i| (i, value)).collect()
        };

        match request {
            RebinRequest::Uniform(value) => Ok(every(value)),
            RebinRequest::PerSpectrum(values) => {
                if values.len() != self.entries.len() {
                    return Err(UsageError::LengthMismatch {
                        expected: self.entries.len(),
                        found: values.len(),
                    });
                }
                Ok(values.into_iter().enumerate().collect())
            }
            RebinRequest::Mapping(mapping) => {
                if let Some(&value) = mapping.get(ALL) {
                    return Ok(every(value));
                }
                let mut targets = Vec::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let index = match self.entries.get_index_of(key.as_str()) {
                        Some(index) => Some(index),
                        None => key
                            .parse::<SpectrumRef>()
                            .ok()
                            .and_then(|spectrum| self.position(&spectrum)),
                    };
                    match index {
                        Some(index) => targets.push((index, value)),
                        None => diagnostics
                            .push(Diagnostic::from(UsageError::UnknownSpectrum(key)).emit()),
                    }
                }
                Ok(targets)
            }
        }
    }

    /// Compute the new states without touching any entry.
    fn regroup_all(&self, jobs: &[(usize, u32)]) -> Vec<(usize, u32, RegroupResult)> {
        let axis = self.config.axis;
        let work: Vec<(usize, u32, &SpectrumEntry)> = jobs
            .iter()
            .filter_map(|&(index, group_min)| {
                self.entries
                    .get_index(index)
                    .map(|(_, entry)| (index, group_min, entry))
            })
            .collect();

        let regroup = |&(index, group_min, entry): &(usize, u32, &SpectrumEntry)| {
            (index, group_min, entry.regrouped(group_min, axis))
        };

        if !self.config.parallel || work.len() < 2 {
            return work.iter().map(regroup).collect();
        }
        match &self.pool {
            Some(pool) => pool.install(|| work.par_iter().map(regroup).collect()),
            None => work.par_iter().map(regroup).collect(),
        }
    }

    fn id_at(&self, index: usize) -> String {
        self.entries
            .get_index(index)
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| spectrum_id(index + 1))
    }

    /// Restore the original binning of the selected spectra.
    ///
    /// The selector is remembered for [`SpectrumCollection::repeat_undo`].
    pub fn undo_rebin(&mut self, selector: impl Into<UndoSelector>) -> UndoReport {
        let selector = selector.into();
        let report = self.apply_undo(&selector);
        self.last_undo = selector;
        report
    }

    /// Parse `selector` (`"all"`, `"2"`, `"spectrum2"`, `"1,3"`, `"none"`)
    /// and undo.
    ///
    /// Unparseable text clears the remembered selector and undoes nothing.
    pub fn undo_rebin_str(&mut self, selector: &str) -> Result<UndoReport, UsageError> {
        match selector.parse::<UndoSelector>() {
            Ok(selector) => Ok(self.undo_rebin(selector)),
            Err(err) => {
                self.last_undo = UndoSelector::Nothing;
                Err(err)
            }
        }
    }

    /// Undo again with the last selector (`All` before any undo).
    pub fn repeat_undo(&mut self) -> UndoReport {
        let selector = self.last_undo.clone();
        self.apply_undo(&selector)
    }

    /// Selector [`SpectrumCollection::repeat_undo`] would use.
    pub fn last_undo(&self) -> &UndoSelector {
        &self.last_undo
    }

    fn apply_undo(&mut self, selector: &UndoSelector) -> UndoReport {
        let mut report = UndoReport::default();
        let indices: Vec<usize> = match selector {
            UndoSelector::Nothing => return report,
            UndoSelector::All => (0..self.entries.len()).collect(),
            UndoSelector::Spectra(spectra) => {
                let mut indices = Vec::with_capacity(spectra.len());
                for spectrum in spectra {
                    match self.position(spectrum) {
                        Some(index) => indices.push(index),
                        None => report.diagnostics.push(
                            Diagnostic::from(UsageError::UnknownSpectrum(spectrum.to_string()))
                                .emit(),
                        ),
                    }
                }
                indices
            }
        };

        for index in indices {
            let Some((id, entry)) = self.entries.get_index_mut(index) else {
                continue;
            };
            let id = id.to_string();
            if entry.restore() {
                log::debug!("{id} restored to its original binning");
                report.restored.push(id);
            } else {
                report
                    .diagnostics
                    .push(Diagnostic::from(StateError::NotRebinned(id)).emit());
            }
        }
        report
    }

    /// Threshold of every rebinned spectrum, `None` if none is rebinned.
    pub fn rebin_settings(&self) -> Option<IndexMap<String, u32>> {
        let settings: IndexMap<String, u32> = self
            .entries
            .iter()
            .filter_map(|(id, entry)| entry.group_min().map(|m| (id.clone(), m)))
            .collect();
        (!settings.is_empty()).then_some(settings)
    }

    /// Channel intervals of every rebinned spectrum, `None` if none is
    /// rebinned.
    pub fn rebinned_edges(&self) -> Option<IndexMap<String, Array2<f64>>> {
        let edges: IndexMap<String, Array2<f64>> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_rebinned())
            .map(|(id, entry)| (id.clone(), entry.count_channel_bins().clone()))
            .collect();
        (!edges.is_empty()).then_some(edges)
    }

    /// Arguments that would rebuild this collection from its source files.
    pub fn construction_string(&self) -> String {
        let files: Vec<String> = self
            .entries
            .values()
            .map(|entry| match &entry.extras().source_file {
                Some(file) => format!("{file:?}"),
                None => "None".to_string(),
            })
            .collect();
        format!(
            "SpectrumCollection(source_files=[{}], axis={}, parallel={})",
            files.join(", "),
            self.config.axis,
            self.config.parallel
        )
    }

    /// Append deep copies of `other`'s spectra, renumbered after ours.
    pub fn merge(&self, other: &SpectrumCollection) -> Result<SpectrumCollection, StateError> {
        merge(self, other)
    }
}

fn build_pool(worker_count: usize) -> Option<Arc<rayon::ThreadPool>> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count)
        .thread_name(|i| format!("xrspec-rebin-{i}"))
        .build()
    {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            log::warn!("falling back to the global thread pool: {err}");
            None
        }
    }
}

/// Number of spectra and the file each one came from.
impl fmt::Display for SpectrumCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = if self.entries.len() == 1 {
            "Spectrum Loaded is: "
        } else {
            "Spectra Loaded are: "
        };
        write!(f, "No. of Spectra Loaded: {} \n{tag}", self.entries.len())?;
        let indent = " ".repeat(tag.len());
        for entry in self.entries.values() {
            let file = entry.extras().source_file.as_deref().unwrap_or("None");
            write!(f, "{file}\n{indent}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::RebinAxis;
    use crate::data::{edges_to_intervals, Exposure, SampleDistribution, SpectrumExtras};
    use ndarray::{array, Array1};

    pub(crate) fn loaded(counts: Vec<f64>) -> LoadedSpectrum {
        let n = counts.len();
        let edges: Array1<f64> = (0..=n).map(|e| e as f64).collect();
        let bins = edges_to_intervals(edges.view());
        LoadedSpectrum {
            counts_error: counts.iter().map(|c| c.sqrt()).collect(),
            counts: Array1::from(counts),
            count_channel_bins: bins.clone(),
            photon_channel_bins: bins,
            response_matrix: Array2::from_shape_fn((n, n), |(p, c)| (p + c) as f64),
            effective_exposure: Exposure::Scalar(2.0),
            sample_distribution: SampleDistribution::Poissonian,
            extras: SpectrumExtras::default(),
        }
    }

    pub(crate) fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    pub(crate) fn collection(spectra: Vec<Vec<f64>>, config: CollectionConfig) -> SpectrumCollection {
        let mut collection = SpectrumCollection::new(config);
        for counts in spectra {
            collection.push_loaded(loaded(counts)).unwrap();
        }
        collection
    }

    #[test]
    fn test_identifiers_follow_load_order() {
        let c = collection(vec![vec![1.0], vec![2.0], vec![3.0]], CollectionConfig::default());
        assert_eq!(c.ids().collect::<Vec<_>>(), ["spectrum1", "spectrum2", "spectrum3"]);
        assert_eq!(c.find(&SpectrumRef::Ordinal(2)).unwrap().0, "spectrum2");
        assert!(c.find(&SpectrumRef::Ordinal(4)).is_none());
        assert!(c.find(&SpectrumRef::Ordinal(0)).is_none());
    }

    #[test_log::test]
    fn test_rebin_then_undo_restores() {
        let mut c = collection(vec![one_to_ten(), vec![4.0, 1.0, 1.0, 6.0]], CollectionConfig::default());
        let before: Vec<_> = c.iter().map(|(_, e)| e.live().clone()).collect();

        let report = c.rebin(5_i64).unwrap();
        assert_eq!(report.applied.get("spectrum1"), Some(&5));
        assert_eq!(
            c.get("spectrum1").unwrap().counts(),
            &array![6.0, 9.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(c.get("spectrum1").unwrap().response_matrix().dim(), (10, 7));

        let undone = c.undo_rebin(UndoSelector::All);
        assert_eq!(undone.restored, ["spectrum1", "spectrum2"]);
        assert!(undone.diagnostics.is_empty());

        let after: Vec<_> = c.iter().map(|(_, e)| e.live().clone()).collect();
        assert_eq!(before, after);
        assert_eq!(c.rebin_settings(), None);
        assert_eq!(c.rebinned_edges(), None);
    }

    #[test]
    fn test_rebin_restarts_from_original() {
        let mut twice = collection(vec![one_to_ten()], CollectionConfig::default());
        twice.rebin(5_i64).unwrap();
        twice.rebin(12_i64).unwrap();

        let mut once = collection(vec![one_to_ten()], CollectionConfig::default());
        once.rebin(5_i64).unwrap();
        once.undo_rebin(UndoSelector::All);
        once.rebin(12_i64).unwrap();

        let twice = twice.get("spectrum1").unwrap();
        let once = once.get("spectrum1").unwrap();
        assert_eq!(twice.live(), once.live());
        assert_eq!(twice.original(), once.original());
        assert_eq!(twice.group_min(), Some(12));
    }

    #[test]
    fn test_leftover_is_reported() {
        let mut c = collection(vec![vec![5.0, 1.0, 1.0, 2.0, 1.0]], CollectionConfig::default());

        let report = c.rebin(3_i64).unwrap();

        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::Leftover {
                spectrum: Some("spectrum1".into()),
                channels: 1,
                counts: 1.0,
                group_min: 3
            }]
        );

        let mut quiet = collection(
            vec![vec![5.0, 1.0, 1.0, 2.0, 1.0]],
            CollectionConfig {
                report_leftovers: false,
                ..CollectionConfig::default()
            },
        );
        assert!(quiet.rebin(3_i64).unwrap().diagnostics.is_empty());
    }

    #[test]
    fn test_per_spectrum_request() {
        let mut c = collection(vec![one_to_ten(), one_to_ten()], CollectionConfig::default());

        assert_eq!(
            c.rebin(vec![Some(5_i64)]),
            Err(UsageError::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(c.rebin_settings(), None);

        let report = c.rebin(vec![None, Some(20_i64)]).unwrap();
        assert_eq!(report.applied.len(), 1);
        assert!(!c.get("spectrum1").unwrap().is_rebinned());
        assert_eq!(c.rebin_settings().unwrap().get("spectrum2"), Some(&20));
    }

    #[test]
    fn test_mapping_request() {
        let mut c = collection(vec![one_to_ten(), one_to_ten(), one_to_ten()], CollectionConfig::default());

        let mut mapping: IndexMap<String, Option<i64>> = IndexMap::new();
        mapping.insert("spectrum3".to_string(), Some(5));
        mapping.insert("2".to_string(), Some(7));
        mapping.insert("spectrum9".to_string(), Some(5));
        let report = c.rebin(mapping).unwrap();

        assert_eq!(
            report.applied.keys().collect::<Vec<_>>(),
            ["spectrum3", "spectrum2"]
        );
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::Usage(UsageError::UnknownSpectrum("spectrum9".into()))]
        );

        let mut mapping: IndexMap<String, Option<i64>> = IndexMap::new();
        mapping.insert("spectrum1".to_string(), Some(5));
        mapping.insert(ALL.to_string(), Some(9));
        c.rebin(mapping).unwrap();

        let settings = c.rebin_settings().unwrap();
        assert_eq!(settings.values().copied().collect::<Vec<_>>(), [9, 9, 9]);
    }

    #[test]
    fn test_invalid_threshold_skips_spectrum() {
        let mut c = collection(vec![one_to_ten(), one_to_ten()], CollectionConfig::default());

        let report = c.rebin(vec![Some(0_i64), Some(5)]).unwrap();

        assert_eq!(report.applied.keys().collect::<Vec<_>>(), ["spectrum2"]);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::Rebin {
                spectrum: "spectrum1".into(),
                source: RegroupError::Usage(UsageError::InvalidThreshold { value: 0 })
            }]
        );
        assert!(!c.get("spectrum1").unwrap().is_rebinned());
    }

    #[test]
    fn test_uniform_none_is_noop() {
        let mut c = collection(vec![one_to_ten()], CollectionConfig::default());
        let report = c.rebin(None::<i64>).unwrap();
        assert_eq!(report, RebinReport::default());
        assert_eq!(c.rebin_settings(), None);
    }

    #[test]
    fn test_photon_axis_is_reported() {
        let mut c = collection(
            vec![one_to_ten()],
            CollectionConfig::default().with_axis(RebinAxis::Photon),
        );

        let report = c.rebin(5_i64).unwrap();

        assert!(report.applied.is_empty());
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::Rebin {
                source: RegroupError::Usage(UsageError::UnsupportedAxis(RebinAxis::Photon)),
                ..
            }]
        ));
        assert!(!c.get("spectrum1").unwrap().is_rebinned());
    }

    #[test]
    fn test_joint_axis_replaces_photon_bins() {
        let mut c = collection(
            vec![one_to_ten()],
            CollectionConfig::default().with_axis(RebinAxis::PhotonAndCount),
        );

        c.rebin(5_i64).unwrap();

        let entry = c.get("spectrum1").unwrap();
        assert_eq!(&entry.live().photon_channel_bins, entry.count_channel_bins());
        assert_eq!(entry.response_matrix().dim(), (7, 7));
    }

    #[test]
    fn test_undo_selectors() {
        let mut c = collection(vec![one_to_ten(), one_to_ten(), one_to_ten()], CollectionConfig::default());
        c.rebin(5_i64).unwrap();

        let report = c.undo_rebin_str("spectrum2").unwrap();
        assert_eq!(report.restored, ["spectrum2"]);

        let report = c.undo_rebin(2_usize);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::State(StateError::NotRebinned("spectrum2".into()))]
        );

        let report = c.undo_rebin(SpectrumRef::Ordinal(7));
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::Usage(UsageError::UnknownSpectrum("spectrum7".into()))]
        );

        let report = c.undo_rebin(None::<usize>);
        assert_eq!(report, UndoReport::default());
        assert_eq!(c.rebin_settings().unwrap().len(), 2);

        let report = c.undo_rebin_str("3, 1").unwrap();
        assert_eq!(report.restored, ["spectrum3", "spectrum1"]);
        assert_eq!(c.rebin_settings(), None);
    }

    #[test]
    fn test_malformed_selector_clears_repeat() {
        let mut c = collection(vec![one_to_ten()], CollectionConfig::default());
        c.rebin(5_i64).unwrap();
        assert_eq!(c.last_undo(), &UndoSelector::All);

        assert!(matches!(
            c.undo_rebin_str("everything"),
            Err(UsageError::MalformedSelector(_))
        ));
        assert_eq!(c.last_undo(), &UndoSelector::Nothing);
        assert!(c.get("spectrum1").unwrap().is_rebinned());

        assert_eq!(c.repeat_undo(), UndoReport::default());
        assert!(c.get("spectrum1").unwrap().is_rebinned());
    }

    #[test]
    fn test_repeat_undo() {
        let mut c = collection(vec![one_to_ten(), one_to_ten()], CollectionConfig::default());

        c.rebin(5_i64).unwrap();
        let report = c.repeat_undo();
        assert_eq!(report.restored.len(), 2);

        c.rebin(5_i64).unwrap();
        c.undo_rebin(1_usize);
        c.rebin(5_i64).unwrap();
        let report = c.repeat_undo();
        assert_eq!(report.restored, ["spectrum1"]);
        assert!(c.get("spectrum2").unwrap().is_rebinned());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let spectra = vec![
            one_to_ten(),
            vec![3.0, 0.0, 7.0, 1.0, 1.0],
            vec![9.0; 12],
            vec![1.0, 1.0, 1.0],
        ];
        let mut sequential = collection(spectra.clone(), CollectionConfig::default());
        let mut parallel = collection(
            spectra,
            CollectionConfig {
                worker_count: 3,
                ..CollectionConfig::parallel()
            },
        );

        let a = sequential.rebin(vec![4_i64, 5, 10, 2]).unwrap();
        let b = parallel.rebin(vec![4_i64, 5, 10, 2]).unwrap();

        assert_eq!(a, b);
        for ((_, x), (_, y)) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(x.live(), y.live());
        }
    }

    #[test]
    fn test_rebinned_edges() {
        let mut c = collection(vec![one_to_ten(), one_to_ten()], CollectionConfig::default());
        c.rebin(vec![None, Some(5_i64)]).unwrap();

        let edges = c.rebinned_edges().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges["spectrum2"].row(0), array![0.0, 3.0]);
        assert_eq!(edges["spectrum2"].nrows(), 7);
    }

    #[test]
    fn test_display_and_construction_string() {
        let mut c = SpectrumCollection::default();
        let mut first = loaded(vec![1.0, 2.0]);
        first.extras = SpectrumExtras::from_file("a.pha", Default::default());
        c.push_loaded(first).unwrap();

        let indent = " ".repeat("Spectrum Loaded is: ".len());
        assert_eq!(
            c.to_string(),
            format!("No. of Spectra Loaded: 1 \nSpectrum Loaded is: a.pha\n{indent}")
        );

        c.push_loaded(loaded(vec![3.0])).unwrap();
        let indent = " ".repeat("Spectra Loaded are: ".len());
        assert_eq!(
            c.to_string(),
            format!("No. of Spectra Loaded: 2 \nSpectra Loaded are: a.pha\n{indent}None\n{indent}")
        );
        assert_eq!(
            c.construction_string(),
            "SpectrumCollection(source_files=[\"a.pha\", None], axis=count, parallel=false)"
        );
    }

    #[test]
    fn test_push_loaded_checks_values() {
        let mut c = SpectrumCollection::new(CollectionConfig::default());

        let mut single = loaded(vec![1.0, 2.0, 3.0]);
        single.effective_exposure = Exposure::PerChannel(array![2.0]);
        assert_eq!(c.push_loaded(single).unwrap(), "spectrum1");
        assert_eq!(c.get("spectrum1").unwrap().count_rate(), &array![0.5, 1.0, 1.5]);
        assert!(c.rebin(3_i64).unwrap().diagnostics.is_empty());

        assert!(matches!(
            c.push_loaded(loaded(vec![f64::NAN, -3.0])),
            Err(ValidationError::InvalidCounts { index: 0, .. })
        ));
        assert_eq!(c.len(), 1);
    }
}
