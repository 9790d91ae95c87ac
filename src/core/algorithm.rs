//! Routing algorithm selection

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::core::error::Error;

/// Routing algorithm the engine runs on top of the preprocessed dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Contraction hierarchies (`osrm-contract` output)
    CH,
    /// Multi-level Dijkstra (`osrm-partition` + `osrm-customize` output)
    #[default]
    MLD,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::MLD => "MLD",
            Algorithm::CH => "CH",
        }
    }

    /// Dataset file suffixes the engine needs for this algorithm.
    pub fn required_suffixes(&self) -> &'static [&'static str] {
        match self {
            Algorithm::CH => &["hsgr"],
            Algorithm::MLD => &["partition", "cells", "mldgr"],
        }
    }

    /// Selector parsing used by the C ABI.
    ///
    /// Anything other than the exact strings "CH" and "MLD" selects MLD. The
    /// substitution is logged so it does not go unnoticed.
    pub fn from_selector_lenient(selector: &str) -> Algorithm {
        match selector.parse() {
            Ok(algorithm) => algorithm,
            Err(_) => {
                warn!("Unknown routing algorithm '{selector}', falling back to MLD");
                Algorithm::MLD
            }
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CH" => Ok(Algorithm::CH),
            "MLD" => Ok(Algorithm::MLD),
            other => Err(Error::InvalidAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse() {
        assert_eq!("CH".parse::<Algorithm>().unwrap(), Algorithm::CH);
        assert_eq!("MLD".parse::<Algorithm>().unwrap(), Algorithm::MLD);
        assert!(matches!(
            "mld".parse::<Algorithm>(),
            Err(Error::InvalidAlgorithm(ref s)) if s == "mld"
        ));
        assert!("".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_lenient_fallback_is_mld() {
        assert_eq!(Algorithm::from_selector_lenient("CH"), Algorithm::CH);
        assert_eq!(Algorithm::from_selector_lenient("MLD"), Algorithm::MLD);
        for selector in ["ch", "CoreCH", "", "dijkstra"] {
            assert_eq!(Algorithm::from_selector_lenient(selector), Algorithm::MLD);
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for algorithm in [Algorithm::CH, Algorithm::MLD] {
            assert_eq!(algorithm.to_string().parse::<Algorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_required_suffixes() {
        assert_eq!(Algorithm::CH.required_suffixes(), &["hsgr"]);
        assert!(Algorithm::MLD.required_suffixes().contains(&"partition"));
    }
}
