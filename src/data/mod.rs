//! Data structures for count spectra.

pub mod entry;
pub mod extras;
pub mod record;
pub mod units;

pub use entry::{mids, widths, BinnedFields, BinningState, LoadedSpectrum, SpectrumEntry};
pub use extras::{Instrument, SpectrumExtras};
pub use record::{
    diff, edges_to_intervals, Exposure, RecordInput, SampleDistribution, SpectrumRecord,
};
pub use units::{EnergyUnit, Quantity, ResponseUnit, TimeUnit, Unit};
