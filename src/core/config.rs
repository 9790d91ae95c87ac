//! Engine configuration
//!
//! Mirrors the subset of `osrm::EngineConfig` the bridge forwards to the
//! engine, plus the checks that can be made before the engine is involved.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use crate::core::algorithm::Algorithm;
use crate::core::error::{Error, Result};

/// Environment variable holding the dataset base path (`map.osrm`)
pub const DATA_PATH_ENV: &str = "OSRM_DATA_PATH";

/// Environment variable holding the algorithm selector
pub const ALGORITHM_ENV: &str = "OSRM_ALGORITHM";

/// Location limit meaning "no limit" for the engine
pub const UNLIMITED: i32 = -1;

/// Configuration for constructing an engine instance
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Base path of the preprocessed dataset, e.g. `/data/france-latest.osrm`
    pub storage_path: PathBuf,

    /// Routing algorithm matching the dataset preprocessing
    pub algorithm: Algorithm,

    /// Attach to a dataset loaded by `osrm-datastore` instead of reading files
    pub use_shared_memory: bool,

    /// Maximum number of locations accepted by the trip service
    pub max_locations_trip: i32,

    /// Maximum number of locations accepted by the route service
    pub max_locations_viaroute: i32,

    /// Maximum number of locations accepted by the table service
    pub max_locations_distance_table: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::new(),
            algorithm: Algorithm::default(),
            use_shared_memory: false,
            max_locations_trip: UNLIMITED,
            max_locations_viaroute: UNLIMITED,
            max_locations_distance_table: UNLIMITED,
        }
    }
}

impl EngineConfig {
    pub fn new(storage_path: impl Into<PathBuf>, algorithm: Algorithm) -> Self {
        Self {
            storage_path: storage_path.into(),
            algorithm,
            ..Default::default()
        }
    }

    /// Build a configuration from `OSRM_DATA_PATH` and `OSRM_ALGORITHM`.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(DATA_PATH_ENV).map_err(|_| {
            Error::InvalidPath(format!("environment variable {DATA_PATH_ENV} is not set"))
        })?;

        let algorithm = match std::env::var(ALGORITHM_ENV) {
            Ok(selector) => selector.parse()?,
            Err(_) => Algorithm::default(),
        };

        Ok(Self::new(path, algorithm))
    }

    pub fn with_shared_memory(mut self, enabled: bool) -> Self {
        self.use_shared_memory = enabled;
        self
    }

    pub fn with_max_locations_trip(mut self, limit: i32) -> Self {
        self.max_locations_trip = limit;
        self
    }

    pub fn with_max_locations_viaroute(mut self, limit: i32) -> Self {
        self.max_locations_viaroute = limit;
        self
    }

    pub fn with_max_locations_distance_table(mut self, limit: i32) -> Self {
        self.max_locations_distance_table = limit;
        self
    }

    /// Storage path as the NUL-terminated string handed to the engine.
    ///
    /// Unix paths are passed through byte for byte; elsewhere the path has
    /// to be valid UTF-8.
    pub fn storage_path_c_string(&self) -> Result<CString> {
        #[cfg(unix)]
        let bytes = {
            use std::os::unix::ffi::OsStrExt;
            self.storage_path.as_os_str().as_bytes().to_vec()
        };
        #[cfg(not(unix))]
        let bytes = self
            .storage_path
            .to_str()
            .ok_or_else(|| {
                Error::InvalidPath(format!(
                    "{} is not valid UTF-8",
                    self.storage_path.display()
                ))
            })?
            .as_bytes()
            .to_vec();

        CString::new(bytes).map_err(|_| {
            Error::InvalidPath(format!(
                "storage path contains a NUL byte: {}",
                self.storage_path.display()
            ))
        })
    }

    /// Check everything that can be checked without loading the dataset.
    ///
    /// With shared memory the files live in `osrm-datastore`, so only the
    /// path shape is checked.
    pub fn validate(&self) -> Result<()> {
        if self.storage_path.as_os_str().is_empty() {
            return Err(Error::InvalidPath("storage path is empty".to_string()));
        }
        self.storage_path_c_string()?;
        for (name, limit) in [
            ("max_locations_trip", self.max_locations_trip),
            ("max_locations_viaroute", self.max_locations_viaroute),
            ("max_locations_distance_table", self.max_locations_distance_table),
        ] {
            if limit < UNLIMITED || limit == 0 {
                return Err(Error::InvalidArgument(format!(
                    "{name} must be -1 (unlimited) or positive, got {limit}"
                )));
            }
        }

        if self.use_shared_memory {
            return Ok(());
        }

        for suffix in self.algorithm.required_suffixes() {
            let file = dataset_file(&self.storage_path, suffix);
            if !file.is_file() {
                return Err(Error::MissingDataset {
                    path: file.display().to_string(),
                    algorithm: self.algorithm.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// `<base>.<suffix>`, e.g. `map.osrm` + `hsgr` -> `map.osrm.hsgr`
fn dataset_file(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch_dataset(dir: &Path, algorithm: Algorithm) -> PathBuf {
        let base = dir.join("monaco-latest.osrm");
        for suffix in algorithm.required_suffixes() {
            fs::write(dataset_file(&base, suffix), b"").unwrap();
        }
        base
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.algorithm, Algorithm::MLD);
        assert!(!config.use_shared_memory);
        assert_eq!(config.max_locations_trip, UNLIMITED);
    }

    #[test]
    fn test_dataset_file_appends_suffix() {
        assert_eq!(
            dataset_file(Path::new("/data/map.osrm"), "hsgr"),
            PathBuf::from("/data/map.osrm.hsgr")
        );
    }

    #[test]
    fn test_validate_accepts_complete_dataset() {
        let dir = tempfile::tempdir().unwrap();
        for algorithm in [Algorithm::CH, Algorithm::MLD] {
            let base = touch_dataset(dir.path(), algorithm);
            EngineConfig::new(&base, algorithm).validate().unwrap();
        }
    }

    #[test]
    fn test_validate_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = touch_dataset(dir.path(), Algorithm::CH);

        // CH files present, MLD ones are not
        let err = EngineConfig::new(&base, Algorithm::MLD).validate().unwrap_err();
        match err {
            Error::MissingDataset { path, algorithm } => {
                assert!(path.ends_with("monaco-latest.osrm.partition"));
                assert_eq!(algorithm, "MLD");
            }
            other => panic!("Expected MissingDataset, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_empty_and_nul_paths() {
        assert!(matches!(
            EngineConfig::new("", Algorithm::MLD).validate(),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            EngineConfig::new("map\0.osrm", Algorithm::MLD).validate(),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_shared_memory_skips_file_checks() {
        let config = EngineConfig::new("/nonexistent/map.osrm", Algorithm::CH).with_shared_memory(true);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let dir = tempfile::tempdir().unwrap();
        let base = touch_dataset(dir.path(), Algorithm::MLD);
        let config = EngineConfig::new(&base, Algorithm::MLD).with_max_locations_trip(-5);
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = EngineConfig::new(&base, Algorithm::MLD).with_max_locations_distance_table(100);
        config.validate().unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_validate_accepts_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join(OsStr::from_bytes(b"caf\xe9.osrm"));
        for suffix in Algorithm::MLD.required_suffixes() {
            fs::write(dataset_file(&base, suffix), b"").unwrap();
        }

        let config = EngineConfig::new(&base, Algorithm::MLD);
        config.validate().unwrap();
        let raw = config.storage_path_c_string().unwrap();
        assert!(raw.as_bytes().ends_with(b"caf\xe9.osrm"));
    }

    // One test owns OSRM_DATA_PATH / OSRM_ALGORITHM so the steps cannot race
    #[test]
    fn test_from_env() {
        std::env::remove_var(DATA_PATH_ENV);
        std::env::remove_var(ALGORITHM_ENV);
        match EngineConfig::from_env() {
            Err(Error::InvalidPath(msg)) => assert!(msg.contains(DATA_PATH_ENV), "{msg}"),
            other => panic!("Expected InvalidPath, got {other:?}"),
        }

        std::env::set_var(DATA_PATH_ENV, "/data/monaco-latest.osrm");
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/data/monaco-latest.osrm"));
        assert_eq!(config.algorithm, Algorithm::MLD);

        std::env::set_var(ALGORITHM_ENV, "CH");
        assert_eq!(EngineConfig::from_env().unwrap().algorithm, Algorithm::CH);

        std::env::set_var(ALGORITHM_ENV, "Dijkstra");
        assert!(matches!(
            EngineConfig::from_env(),
            Err(Error::InvalidAlgorithm(_))
        ));

        std::env::remove_var(DATA_PATH_ENV);
        std::env::remove_var(ALGORITHM_ENV);
    }
}
