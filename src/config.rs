use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::frequency::DEFAULT_ZERO_MODE_TOLERANCE;
use crate::lattice::DefectConfig;
use crate::render::{AnimationConfig, FigureConfig};
use crate::session::SliderRange;

/// Top-level settings; every field falls back to its default when omitted from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub two_atom: TwoAtomConfig,
    pub chain: ChainConfig,
    pub figure: FigureConfig,
    pub animation: AnimationConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open configuration {:?}", path))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse configuration {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration {:?}", path))?;
        Ok(config)
    }

    /// Rejects settings that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        self.two_atom
            .slider
            .validate()
            .context("two_atom.slider")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoAtomConfig {
    pub m1: f64,
    /// Initial slider position.
    pub m2: f64,
    pub k: f64,
    pub slider: SliderRange,
}

impl Default for TwoAtomConfig {
    fn default() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            k: 1.0,
            slider: SliderRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub n: usize,
    pub mass: f64,
    pub k: f64,
    pub defects: DefectConfig,
    /// Relative to the largest diagonal entry `2k/m` of the dynamical matrix.
    pub zero_mode_tolerance: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            n: 100,
            mass: 1.0,
            k: 1.0,
            defects: DefectConfig::default(),
            zero_mode_tolerance: DEFAULT_ZERO_MODE_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_json_str(r#"{"chain": {"n": 12}, "animation": {"fps": 10}}"#)
            .expect("config");
        assert_eq!(config.chain.n, 12);
        assert_eq!(config.chain.k, 1.0);
        assert_eq!(config.animation.fps, 10);
        assert_eq!(config.animation.frames, 100);
        assert_eq!(config.two_atom.slider.max, 10.0);
    }

    #[test]
    fn rejects_inverted_slider_range() {
        let error = Config::from_json_str(r#"{"two_atom": {"slider": {"min": 10.0, "max": 1.0}}}"#)
            .expect_err("inverted range");
        assert!(format!("{:#}", error).contains("two_atom.slider"));
    }

    #[test]
    fn default_animation_path_is_relative() {
        let config = Config::default();
        assert_eq!(
            config.animation.output,
            std::path::PathBuf::from("mode0_translation.gif")
        );
        assert!(config.animation.output.is_relative());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Config::from_json_str("{ chain: ").is_err());
    }
}
