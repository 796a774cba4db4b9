//! Loader-supplied metadata carried alongside each spectrum.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

/// Instrument a spectrum was recorded with.
///
/// Opaque to the binning core; loaders use it to pick their response
/// handling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Instrument {
    Nustar,
    Stix,
    Rhessi,
    /// Data handed over directly rather than read from an instrument file.
    #[default]
    Custom,
    Other(String),
}

impl Instrument {
    pub fn name(&self) -> &str {
        match self {
            Instrument::Nustar => "NuSTAR",
            Instrument::Stix => "STIX",
            Instrument::Rhessi => "RHESSI",
            Instrument::Custom => "Custom",
            Instrument::Other(name) => name,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse the value of a `TELESCOP` header keyword.
impl FromStr for Instrument {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Ok(match name.to_ascii_uppercase().as_str() {
            "NUSTAR" => Instrument::Nustar,
            "STIX" | "SOLO/STIX" => Instrument::Stix,
            "RHESSI" | "HESSI" => Instrument::Rhessi,
            "" | "CUSTOM" => Instrument::Custom,
            _ => Instrument::Other(name.to_string()),
        })
    }
}

/// Side-channel metadata for one spectrum.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectrumExtras {
    /// File the counts were read from, if any.
    pub source_file: Option<String>,
    pub instrument: Instrument,
    /// Free-form loader properties (header keywords, file paths, ...).
    pub properties: IndexMap<String, String>,
}

impl SpectrumExtras {
    pub fn from_file(path: impl Into<String>, instrument: Instrument) -> Self {
        Self {
            source_file: Some(path.into()),
            instrument,
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_from_telescope_keyword() {
        assert_eq!("NuSTAR".parse::<Instrument>().unwrap(), Instrument::Nustar);
        assert_eq!(" HESSI ".parse::<Instrument>().unwrap(), Instrument::Rhessi);
        assert_eq!("SOLO/STIX".parse::<Instrument>().unwrap(), Instrument::Stix);
        assert_eq!(
            "Fermi".parse::<Instrument>().unwrap(),
            Instrument::Other("Fermi".into())
        );
    }

    #[test]
    fn test_extras_builder() {
        let extras = SpectrumExtras::from_file("obs.pha", Instrument::Nustar)
            .with_property("arf.file", "obs.arf");
        assert_eq!(extras.source_file.as_deref(), Some("obs.pha"));
        assert_eq!(extras.properties.get("arf.file").map(String::as_str), Some("obs.arf"));
    }
}
