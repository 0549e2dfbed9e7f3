use std::path::Path;

use anyhow::{Result, ensure};
use log::debug;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::TwoAtomConfig;
use crate::lattice::TwoAtomParams;
use crate::modes::{TwoAtomModes, compute_modes};
use crate::render::{FigureConfig, render_modes_figure};

/// Range and resolution of the m2 slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderRange {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 10.0,
            step: 0.1,
        }
    }
}

impl SliderRange {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min.is_finite() && self.max.is_finite() && self.min <= self.max,
            "slider range [{}, {}] is empty or not finite",
            self.min,
            self.max
        );
        ensure!(
            self.step >= 0.0,
            "slider step must be non-negative, got {}",
            self.step
        );
        Ok(())
    }

    /// Clamps into `[min, max]` and rounds to the nearest step.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.max(self.min).min(self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = (self.min + steps * self.step).min(self.max);
        // strip accumulated rounding such as 1.2000000000000002
        (snapped * 1e9).round() / 1e9
    }
}

/// Interactive two-atom session: the current slider state and the modes derived from it.
///
/// Modes are computed on first access and dropped whenever m2 changes.
#[derive(Debug)]
pub struct Session {
    m1: f64,
    m2: f64,
    k: f64,
    slider: SliderRange,
    figure: FigureConfig,
    modes: OnceCell<TwoAtomModes>,
}

impl Session {
    pub fn new(config: &TwoAtomConfig, figure: FigureConfig) -> Result<Self> {
        config.slider.validate()?;
        Ok(Self {
            m1: config.m1,
            m2: config.slider.snap(config.m2),
            k: config.k,
            slider: config.slider,
            figure,
            modes: OnceCell::new(),
        })
    }

    pub fn m2(&self) -> f64 {
        self.m2
    }

    pub fn params(&self) -> TwoAtomParams {
        TwoAtomParams {
            m1: self.m1,
            m2: self.m2,
            k: self.k,
        }
    }

    /// Moves the slider and returns the value it settled on.
    pub fn set_m2(&mut self, value: f64) -> f64 {
        let snapped = self.slider.snap(value);
        if snapped != self.m2 {
            debug!("slider m2 {} -> {}", self.m2, snapped);
            self.m2 = snapped;
            self.modes = OnceCell::new();
        }
        snapped
    }

    pub fn modes(&self) -> Result<&TwoAtomModes> {
        self.modes
            .get_or_try_init(|| compute_modes(self.m1, self.m2, self.k))
    }

    pub fn render(&self, path: &Path) -> Result<()> {
        render_modes_figure(self.modes()?, &self.figure, path)
    }

    /// Slider callback: move to `value`, recompute and redraw.
    pub fn update(&mut self, value: f64, path: &Path) -> Result<f64> {
        let m2 = self.set_m2(value);
        self.render(path)?;
        Ok(m2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_slider_grid() {
        let slider = SliderRange::default();
        assert_eq!(slider.snap(0.2), 1.0);
        assert_eq!(slider.snap(42.0), 10.0);
        assert_eq!(slider.snap(1.23), 1.2);
        assert_eq!(slider.snap(5.56), 5.6);
    }

    #[test]
    fn recomputes_after_slider_move() {
        let mut session =
            Session::new(&TwoAtomConfig::default(), FigureConfig::default()).expect("session");
        let before = session.modes().expect("initial modes").clone();
        assert_eq!(before.params.m2, 1.0);

        assert_eq!(session.set_m2(4.0), 4.0);
        let after = session.modes().expect("updated modes");
        assert_eq!(after.params.m2, 4.0);
        assert!(after.q0.frequencies[1] < before.q0.frequencies[1]);
    }

    #[test]
    fn inverted_slider_range_is_an_error() {
        let config = TwoAtomConfig {
            slider: SliderRange {
                min: 10.0,
                max: 1.0,
                step: 0.1,
            },
            ..TwoAtomConfig::default()
        };
        assert!(Session::new(&config, FigureConfig::default()).is_err());

        let nan_step = SliderRange {
            step: f64::NAN,
            ..SliderRange::default()
        };
        assert!(nan_step.validate().is_err());
    }

    #[test]
    fn snap_never_panics_on_unvalidated_range() {
        let inverted = SliderRange {
            min: 10.0,
            max: 1.0,
            step: 0.0,
        };
        assert_eq!(inverted.snap(5.0), 1.0);
    }
}
