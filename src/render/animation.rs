use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, ensure};
use log::info;
use ndarray::Array1;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::modes::ChainModes;

/// Fixed-length GIF of one chain mode: `u_i(t) = A u_i cos(ω t)`.
///
/// The default output is `mode0_translation.gif`, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub output: PathBuf,
    pub mode: usize,
    pub frames: usize,
    /// Simulated seconds spanned by the frames.
    pub duration: f64,
    pub fps: u32,
    pub amplitude: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("mode0_translation.gif"),
            mode: 0,
            frames: 100,
            duration: 10.0,
            fps: 20,
            amplitude: 1.0,
            width: 1200,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSummary {
    pub path: PathBuf,
    pub mode: usize,
    pub frequency: f64,
    pub frames: usize,
}

/// Writes the animation of `config.mode` to `config.output`.
///
/// Mode 0 must be a zero mode within the relative `zero_mode_tolerance`; its frequency is
/// the computed `sqrt(|λ₀|)`, not a hardcoded zero.
pub fn animate_mode(
    chain: &ChainModes,
    config: &AnimationConfig,
    zero_mode_tolerance: f64,
) -> Result<AnimationSummary> {
    ensure!(config.frames > 0, "animation needs at least one frame");
    ensure!(config.fps > 0, "animation frame rate must be positive");

    let (frequency, displacement) = if config.mode == 0 {
        let zero = chain
            .zero_mode(zero_mode_tolerance)
            .context("extract translation mode")?;
        (zero.frequency, zero.displacement)
    } else {
        let frequency = chain.frequencies.get(config.mode).copied().ok_or_else(|| {
            anyhow!(
                "mode {} out of range for chain of {} masses",
                config.mode,
                chain.len()
            )
        })?;
        (frequency, chain.displacement(config.mode)?)
    };

    let sites = displacement.len();
    let limit = 1.5 * config.amplitude.abs().max(f64::EPSILON);
    let times = Array1::linspace(0.0, config.duration, config.frames);
    let frame_delay = 1000 / config.fps;

    let root = BitMapBackend::gif(&config.output, (config.width, config.height), frame_delay)
        .with_context(|| format!("open animation file {:?}", config.output))?
        .into_drawing_area();

    for &t in times.iter() {
        root.fill(&WHITE)?;
        let phase = (frequency * t).cos();
        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!(
                    "Mode {}: ω = {:.4} rad/s, t = {:.2} s",
                    config.mode, frequency, t
                ),
                ("sans-serif", 20),
            )
            .margin(15)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(0.0f64..sites as f64, -limit..limit)?;
        chart
            .configure_mesh()
            .x_desc("Atom position")
            .y_desc("Displacement")
            .draw()?;

        let points: Vec<(f64, f64)> = displacement
            .iter()
            .enumerate()
            .map(|(i, u)| (i as f64, config.amplitude * u * phase))
            .collect();
        chart.draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(1)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;
        root.present()
            .with_context(|| format!("write animation frame at t={:.2}", t))?;
    }

    info!(
        "Saved {} frames of mode {} (ω={:e} rad/s) to {:?}",
        config.frames, config.mode, frequency, config.output
    );
    Ok(AnimationSummary {
        path: config.output.clone(),
        mode: config.mode,
        frequency,
        frames: config.frames,
    })
}
