//! Run-wide settings passed explicitly into every resolution step.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bucket::BucketNaming;
use crate::error::Result;

/// Gap length written between consecutive components of an AGP object.
pub const DEFAULT_GAP_LENGTH: u64 = 100;

/// Link distances below this value are raised to it at ingestion.
pub const DEFAULT_MIN_DISTANCE: i64 = 50;

/// Configuration options that govern scaffold resolution and emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Length of every gap row in the AGP output.
    pub gap_length: u64,
    /// Floor applied to every link distance.
    pub min_distance: i64,
    /// How contig identifiers map onto bucket names.
    pub bucket_naming: BucketNaming,
    /// Run the single-flip refinement after sign propagation.
    pub refine_signs: bool,
    /// Upper bound on refinement sweeps over the component.
    pub max_refine_rounds: usize,
    /// Relative residual at which the position solver stops.
    pub solver_tolerance: f64,
    /// Worker count for per-component resolution (needs the `parallel` feature).
    pub max_workers: usize,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            gap_length: DEFAULT_GAP_LENGTH,
            min_distance: DEFAULT_MIN_DISTANCE,
            bucket_naming: BucketNaming::default(),
            refine_signs: true,
            max_refine_rounds: 16,
            solver_tolerance: 1e-9,
            max_workers: 1,
        }
    }
}

impl ScaffoldConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ScaffoldConfig =
            serde_json::from_str(r#"{"gap_length": 250, "bucket_naming": "strip_suffix"}"#)
                .expect("config");
        assert_eq!(config.gap_length, 250);
        assert_eq!(config.bucket_naming, BucketNaming::StripSuffix);
        assert_eq!(config.min_distance, DEFAULT_MIN_DISTANCE);
        assert!(config.refine_signs);
    }

    #[test]
    fn loads_config_from_file() {
        use std::io::Write;

        let tmp = tempfile::NamedTempFile::new().expect("tmpfile");
        writeln!(
            tmp.as_file(),
            r#"{{"min_distance": 10, "bucket_naming": {{"fixed": "scaffolds"}}}}"#
        )
        .unwrap();

        let config = ScaffoldConfig::from_json_file(tmp.path()).expect("config");
        assert_eq!(config.min_distance, 10);
        assert_eq!(
            config.bucket_naming,
            BucketNaming::Fixed("scaffolds".to_string())
        );
        assert_eq!(config.gap_length, DEFAULT_GAP_LENGTH);
    }

    #[test]
    fn rejects_invalid_json() {
        let tmp = tempfile::NamedTempFile::new().expect("tmpfile");
        std::fs::write(tmp.path(), "not json").unwrap();
        assert!(ScaffoldConfig::from_json_file(tmp.path()).is_err());
    }
}
