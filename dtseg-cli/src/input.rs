//! Event and configuration files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use dtseg_core::{ClusterForFit, CompatibilityConfig, EvaluatorConfig, FittedSegment, QualityCuts};
use log::info;
use serde::Deserialize;

use crate::{CliError, Result};

/// Segment candidates and the cluster pool of one event.
#[derive(Debug, Deserialize)]
pub struct EventFile {
    pub candidates: Vec<FittedSegment>,
    #[serde(default)]
    pub clusters: Vec<ClusterForFit>,
}

/// Quality cuts as they may appear in a configuration file.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialCuts {
    pub n_hits_min: Option<usize>,
    pub chi2_max: Option<f64>,
}

/// Evaluator configuration file; every field may be left out and supplied
/// on the command line instead.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub compatibility: Option<CompatibilityConfig>,
    #[serde(default)]
    pub quality: PartialCuts,
}

/// Command-line overrides applied on top of a configuration file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub n_hits_min: Option<usize>,
    pub chi2_max: Option<f64>,
    pub err_scale_factor: Option<f64>,
    pub min_error: Option<f64>,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| CliError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads an event file.
pub fn read_event(path: &Path) -> Result<EventFile> {
    let event: EventFile = serde_json::from_reader(open(path)?)?;
    info!(
        "{}: {} candidates, {} clusters",
        path.display(),
        event.candidates.len(),
        event.clusters.len()
    );
    Ok(event)
}

/// Reads a configuration file.
pub fn read_config(path: &Path) -> Result<ConfigFile> {
    Ok(serde_json::from_reader(open(path)?)?)
}

impl ConfigFile {
    /// Merges command-line overrides and validates the result.
    ///
    /// Both quality cuts must be present in the file or on the command line.
    pub fn resolve(self, overrides: Overrides) -> Result<EvaluatorConfig> {
        let mut compatibility = self.compatibility.unwrap_or_default();
        if let Some(factor) = overrides.err_scale_factor {
            compatibility.err_scale_factor = factor;
        }
        if let Some(min_error) = overrides.min_error {
            compatibility.min_error = min_error;
        }

        let n_hits_min = overrides
            .n_hits_min
            .or(self.quality.n_hits_min)
            .ok_or(CliError::MissingCut("n_hits_min"))?;
        let chi2_max = overrides
            .chi2_max
            .or(self.quality.chi2_max)
            .ok_or(CliError::MissingCut("chi2_max"))?;

        let config = EvaluatorConfig::new(QualityCuts::new(n_hits_min, chi2_max))
            .with_compatibility(compatibility);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_event() {
        let file = write_temp(
            r#"{
                "candidates": [{
                    "superlayer": {"wheel": 0, "station": 1, "sector": 4, "superlayer": 1},
                    "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                    "direction": {"x": 0.1, "y": 0.0, "z": 1.0},
                    "n_hits": 7,
                    "chi2": 3.2,
                    "ndof": 5
                }],
                "clusters": [{
                    "cluster": {
                        "superlayer": {"wheel": 0, "station": 1, "sector": 4, "superlayer": 2},
                        "n_hits": 4
                    },
                    "pos": {"x": 1.5, "y": 0.0, "z": 12.0},
                    "err": {"xx": 0.04}
                }]
            }"#,
        );
        let event = read_event(file.path()).unwrap();
        assert_eq!(event.candidates.len(), 1);
        assert_eq!(event.candidates[0].ndof, 5);
        assert_eq!(event.clusters.len(), 1);
        assert_eq!(event.clusters[0].superlayer().superlayer(), 2);
        assert_relative_eq!(event.clusters[0].err.yy, 0.0);
    }

    #[test]
    fn test_read_event_rejects_bad_superlayer() {
        let file = write_temp(
            r#"{
                "candidates": [{
                    "superlayer": {"wheel": 0, "station": 1, "sector": 4, "superlayer": 5},
                    "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                    "direction": {"x": 0.0, "y": 0.0, "z": 1.0},
                    "n_hits": 4, "chi2": 1.0, "ndof": 2
                }]
            }"#,
        );
        assert!(matches!(read_event(file.path()), Err(CliError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = read_event(Path::new("/nonexistent/event.json"));
        assert!(matches!(result, Err(CliError::Open { .. })));
    }

    #[test]
    fn test_resolve_config_file() {
        let file = write_temp(
            r#"{"compatibility": {"min_error": 10.0}, "quality": {"n_hits_min": 3, "chi2_max": 20.0}}"#,
        );
        let config = read_config(file.path())
            .unwrap()
            .resolve(Overrides::default())
            .unwrap();
        assert_eq!(config.quality.n_hits_min, 3);
        assert_relative_eq!(config.quality.chi2_max, 20.0);
        assert_relative_eq!(config.compatibility.min_error, 10.0);
        assert_relative_eq!(config.compatibility.err_scale_factor, 10.0);
    }

    #[test]
    fn test_overrides_win() {
        let file = write_temp(r#"{"quality": {"n_hits_min": 3, "chi2_max": 20.0}}"#);
        let overrides = Overrides {
            chi2_max: Some(5.0),
            err_scale_factor: Some(3.0),
            ..Overrides::default()
        };
        let config = read_config(file.path()).unwrap().resolve(overrides).unwrap();
        assert_eq!(config.quality.n_hits_min, 3);
        assert_relative_eq!(config.quality.chi2_max, 5.0);
        assert_relative_eq!(config.compatibility.err_scale_factor, 3.0);
        assert_relative_eq!(config.compatibility.min_error, 25.0);
    }

    #[test]
    fn test_missing_cut() {
        let overrides = Overrides {
            n_hits_min: Some(3),
            ..Overrides::default()
        };
        assert!(matches!(
            ConfigFile::default().resolve(overrides),
            Err(CliError::MissingCut("chi2_max"))
        ));
    }

    #[test]
    fn test_invalid_cut_rejected() {
        let overrides = Overrides {
            n_hits_min: Some(3),
            chi2_max: Some(0.0),
            ..Overrides::default()
        };
        assert!(matches!(
            ConfigFile::default().resolve(overrides),
            Err(CliError::Core(dtseg_core::Error::ConfigError(_)))
        ));
    }
}
