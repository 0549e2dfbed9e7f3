use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::full_palette::ORANGE;
use serde::{Deserialize, Serialize};

use crate::modes::{BranchModes, TwoAtomModes};

const MODE_COLORS: [RGBColor; 2] = [BLUE, ORANGE];

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// Frequency bars (top) and mode shapes (bottom) for `q = 0` and `q = π`, as one image.
pub fn render_modes_figure(modes: &TwoAtomModes, config: &FigureConfig, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    let m1 = modes.params.m1;
    let m2 = modes.params.m2;
    for (panel, branch) in panels[..2].iter().zip([&modes.q0, &modes.qpi]) {
        let caption = format!(
            "Frequencies at {}, m1={} kg, m2={:.1} kg",
            branch.wavevector, m1, m2
        );
        draw_frequency_bars(panel, branch, &caption)?;
    }
    for (panel, branch) in panels[2..].iter().zip([&modes.q0, &modes.qpi]) {
        draw_mode_shapes(panel, branch)?;
    }

    root.present()
        .with_context(|| format!("write mode figure to {:?}", path))?;
    info!("Rendered mode figure for m2={:.1} to {:?}", m2, path);
    Ok(())
}

fn draw_frequency_bars(panel: &Panel<'_>, branch: &BranchModes, caption: &str) -> Result<()> {
    let peak = branch
        .frequencies
        .iter()
        .copied()
        .filter(|f| f.is_finite())
        .fold(0.0f64, f64::max);
    let top = if peak > 0.0 { peak * 1.2 } else { 1.0 };

    let mut chart = ChartBuilder::on(panel)
        .caption(caption, ("sans-serif", 18))
        .margin(12)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0f64..branch.frequencies.len() as f64, 0.0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(format!("Mode at {}", branch.wavevector))
        .y_desc("Frequency (rad/s)")
        .draw()?;

    chart.draw_series(
        branch
            .frequencies
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_finite())
            .map(|(i, &f)| {
                let x = i as f64;
                Rectangle::new(
                    [(x + 0.15, 0.0), (x + 0.85, f)],
                    MODE_COLORS[i % MODE_COLORS.len()].filled(),
                )
            }),
    )?;
    Ok(())
}

fn draw_mode_shapes(panel: &Panel<'_>, branch: &BranchModes) -> Result<()> {
    let mut chart = ChartBuilder::on(panel)
        .caption(format!("Normal modes at {}", branch.wavevector), ("sans-serif", 18))
        .margin(12)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.25f64..1.25f64, -1.2f64..1.2f64)?;
    chart
        .configure_mesh()
        .x_desc("Atom 1 / Atom 2")
        .y_desc("Relative displacement")
        .draw()?;

    for i in 0..branch.modes.ncols() {
        let [first, second] = branch.displacement(i);
        let color = MODE_COLORS[i % MODE_COLORS.len()];
        let points = [(0.0, first), (1.0, second)];

        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(format!(
                "Mode {} (ω={:.3} rad/s)",
                i + 1,
                branch.frequencies[i]
            ))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(points.map(|p| Circle::new(p, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}
