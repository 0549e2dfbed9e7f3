use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use phonon_chain::{
    ChainModes, Config, MassProfile, Session, TwoAtomParams, animate_mode, compute_modes,
    dispersion, render_modes_figure,
};

#[derive(Parser)]
#[command(name = "phonon-chain")]
#[command(about = "Normal modes of one-dimensional mass-spring lattices")]
#[command(version)]
struct Cli {
    /// JSON configuration file; omitted fields keep their defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Frequencies and mode shapes of the two-atom cell at q=0 and q=π.
    Modes {
        #[arg(long)]
        m1: Option<f64>,
        #[arg(long)]
        m2: Option<f64>,
        #[arg(long)]
        k: Option<f64>,
        /// Figure output path.
        #[arg(short, long, default_value = "modes.png")]
        output: PathBuf,
        /// Print the modes as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Drive the m2 slider from stdin, one value per line, redrawing after each.
    Sweep {
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Animate one normal mode of an open chain as a GIF.
    Animate {
        /// Number of masses in the chain.
        #[arg(long)]
        n: Option<usize>,
        /// Mode index, 0 being the rigid translation.
        #[arg(long)]
        mode: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Acoustic and optical branches over the Brillouin zone, as JSON.
    Dispersion {
        #[arg(long, default_value_t = 101)]
        samples: usize,
    },
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Modes {
            m1,
            m2,
            k,
            output,
            json,
        } => run_modes(&config, m1, m2, k, &output, json),
        Commands::Sweep { output_dir } => run_sweep(&config, &output_dir),
        Commands::Animate { n, mode, output } => run_animate(config, n, mode, output),
        Commands::Dispersion { samples } => {
            let two_atom = &config.two_atom;
            let params = TwoAtomParams::new(two_atom.m1, two_atom.m2, two_atom.k);
            let points = dispersion(&params, samples)?;
            println!("{}", serde_json::to_string_pretty(&points)?);
            Ok(())
        }
    }
}

fn run_modes(
    config: &Config,
    m1: Option<f64>,
    m2: Option<f64>,
    k: Option<f64>,
    output: &Path,
    json: bool,
) -> Result<()> {
    let two_atom = &config.two_atom;
    let modes = compute_modes(
        m1.unwrap_or(two_atom.m1),
        m2.unwrap_or(two_atom.m2),
        k.unwrap_or(two_atom.k),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&modes.report())?);
    } else {
        for branch in [&modes.q0, &modes.qpi] {
            for (i, frequency) in branch.frequencies.iter().enumerate() {
                let [first, second] = branch.displacement(i);
                println!(
                    "{:<5} mode {}: ω = {:>10.6} rad/s  shape = [{:>9.5}, {:>9.5}]",
                    branch.wavevector.to_string(),
                    i + 1,
                    frequency,
                    first,
                    second
                );
            }
        }
    }

    render_modes_figure(&modes, &config.figure, output)
}

fn run_sweep(config: &Config, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {:?}", output_dir))?;
    let mut session = Session::new(&config.two_atom, config.figure.clone())?;
    session.render(&output_dir.join(figure_name(session.m2())))?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        let requested: f64 = value
            .parse()
            .with_context(|| format!("parse slider value {:?}", value))?;
        let path = output_dir.join(figure_name(config.two_atom.slider.snap(requested)));
        let m2 = session.update(requested, &path)?;
        info!("Slider moved to m2={:.1}", m2);
    }
    Ok(())
}

fn figure_name(m2: f64) -> String {
    format!("modes_m2_{m2:.1}.png")
}

fn run_animate(
    mut config: Config,
    n: Option<usize>,
    mode: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(n) = n {
        config.chain.n = n;
    }
    if let Some(mode) = mode {
        config.animation.mode = mode;
    }
    if let Some(output) = output {
        config.animation.output = output;
    }

    let chain = &config.chain;
    let params = MassProfile::chain(chain.n, chain.mass, chain.k, &chain.defects)?;
    let modes = ChainModes::compute(params)?;
    let summary = animate_mode(&modes, &config.animation, chain.zero_mode_tolerance)?;
    println!(
        "Saved animation of mode {} (ω = {:e} rad/s) to {}",
        summary.mode,
        summary.frequency,
        summary.path.display()
    );
    Ok(())
}
