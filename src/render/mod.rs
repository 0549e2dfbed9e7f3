pub mod animation;
pub mod figure;

pub use animation::{AnimationConfig, AnimationSummary, animate_mode};
pub use figure::{FigureConfig, render_modes_figure};
