//! Unit tags for spectrum quantities.
//!
//! Records store plain magnitudes in keV, seconds and cm²·count/photon.
//! Loaders hand over values in whatever unit their files use and tag them;
//! [`Quantity::into_canonical`] rescales once at construction.

use ndarray::{Array1, ArrayD, IxDyn};

/// A unit that can be rescaled to its canonical counterpart.
pub trait Unit: Copy + std::fmt::Debug {
    /// Factor converting a magnitude in this unit to the canonical unit.
    fn scale(&self) -> f64;
}

/// Energy units. Canonical: keV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyUnit {
    Ev,
    #[default]
    Kev,
    Mev,
}

impl Unit for EnergyUnit {
    fn scale(&self) -> f64 {
        match self {
            EnergyUnit::Ev => 1e-3,
            EnergyUnit::Kev => 1.0,
            EnergyUnit::Mev => 1e3,
        }
    }
}

/// Time units. Canonical: seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    Millisecond,
    #[default]
    Second,
    Minute,
    Hour,
}

impl Unit for TimeUnit {
    fn scale(&self) -> f64 {
        match self {
            TimeUnit::Millisecond => 1e-3,
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
            TimeUnit::Hour => 3600.0,
        }
    }
}

/// Response matrix units. Canonical: cm²·count/photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseUnit {
    #[default]
    Cm2CountPerPhoton,
    M2CountPerPhoton,
}

impl Unit for ResponseUnit {
    fn scale(&self) -> f64 {
        match self {
            ResponseUnit::Cm2CountPerPhoton => 1.0,
            ResponseUnit::M2CountPerPhoton => 1e4,
        }
    }
}

/// An array of magnitudes tagged with a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity<U> {
    pub value: ArrayD<f64>,
    pub unit: U,
}

impl<U: Unit> Quantity<U> {
    pub fn new(value: ArrayD<f64>, unit: U) -> Self {
        Self { value, unit }
    }

    /// A rank-0 quantity.
    pub fn scalar(value: f64, unit: U) -> Self {
        Self::new(ArrayD::from_elem(IxDyn(&[]), value), unit)
    }

    /// A rank-1 quantity.
    pub fn from_vec(values: Vec<f64>, unit: U) -> Self {
        Self::new(Array1::from(values).into_dyn(), unit)
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.value.ndim()
    }

    /// Rescale to the canonical unit and drop the tag.
    pub fn into_canonical(self) -> ArrayD<f64> {
        let scale = self.unit.scale();
        if scale == 1.0 {
            self.value
        } else {
            self.value.mapv_into(|v| v * scale)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_normalization() {
        let edges = Quantity::from_vec(vec![1000.0, 2500.0], EnergyUnit::Ev);
        let kev = edges.into_canonical();
        assert_eq!(kev.as_slice().unwrap(), &[1.0, 2.5]);
    }

    #[test]
    fn test_scalar_exposure_in_minutes() {
        let exposure = Quantity::scalar(2.0, TimeUnit::Minute);
        assert_eq!(exposure.ndim(), 0);
        let seconds = exposure.into_canonical();
        assert_eq!(seconds[IxDyn(&[])], 120.0);
    }

    #[test]
    fn test_canonical_unit_is_untouched() {
        let srm = Quantity::from_vec(vec![0.25, 0.5], ResponseUnit::default());
        assert_eq!(srm.clone().into_canonical(), srm.value);
    }
}
