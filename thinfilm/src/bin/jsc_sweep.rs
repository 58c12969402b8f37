//! Short-circuit current versus layer thickness
//!
//! Loads a JSON device description, samples the optical constants of every
//! layer onto the configured wavelength grid, sweeps the thickness of the
//! varied layer and prints Jsc for each thickness.
//!
//! ```text
//! jsc_sweep --config device.json --materials ./matdata --threads 8
//! jsc_sweep --print-example-config > device.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use thinfilm::config::DeviceConfig;
use thinfilm::photocurrent::ideal_current;
use thinfilm::OpticalConstants;

#[derive(Parser, Debug)]
#[command(
    name = "Jsc Sweep",
    about = "Transfer-matrix short-circuit current of a thin-film stack versus layer thickness",
    long_about = None
)]
struct Args {
    /// JSON device and sweep configuration
    #[arg(long, required_unless_present = "print_example_config")]
    config: Option<PathBuf>,

    /// Override the material table directory from the configuration
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Log every sweep step and material load
    #[arg(long)]
    verbose: bool,

    /// Print the reference device configuration and exit
    #[arg(long)]
    print_example_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.print_example_config {
        println!("{}", DeviceConfig::default().to_json_pretty()?);
        return Ok(());
    }

    let config_path = args.config.ok_or("--config is required")?;
    let mut config = DeviceConfig::from_file(&config_path)?;
    if let Some(directory) = args.materials {
        config.materials.directory = directory;
    }

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }
    info!("Using {} worker threads", rayon::current_num_threads());

    let plan = config.plan()?;
    let constants = OpticalConstants::load(
        &config.materials.library(),
        &config.layers,
        &config.materials.spectrum,
        plan.grid,
    )?;

    let progress = ProgressBar::new(plan.sweep.range().len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} thicknesses ({eta})")?
            .progress_chars("##-"),
    );
    let result = plan
        .sweep
        .run_with(&constants, None, |_| progress.inc(1))?;
    progress.finish_and_clear();

    let varied = &config.layers[plan.sweep.varied_layer()];
    let active = &config.layers[plan.sweep.active_layer()];
    println!("Varied layer: {}    Active layer: {}", varied, active);
    println!("{:>16} {:>18}", "Thickness (nm)", "Jsc (mA/cm²)");
    println!("{}", "-".repeat(35));
    for point in result.points() {
        let marker = if point.is_regular() { "" } else { " *" };
        println!("{:>16.2} {:>18.4}{}", point.thickness_nm, point.jsc, marker);
    }
    println!("{}", "-".repeat(35));

    if let Some(best) = result.best() {
        println!(
            "Maximum Jsc {:.4} mA/cm² at {:.2} nm (ideal absorber limit {:.4} mA/cm²)",
            best.jsc,
            best.thickness_nm,
            ideal_current(&constants)
        );
    }

    let singular: Vec<_> = result
        .points()
        .iter()
        .filter(|p| !p.is_regular())
        .collect();
    if !singular.is_empty() {
        println!(
            "\n{} thicknesses (*) had field singularities, affected samples contribute zero:",
            singular.len()
        );
        for point in singular {
            for s in &point.singularities {
                println!(
                    "  {:.2} nm: λ = {:.1} nm, layer {} ({}), {} samples",
                    point.thickness_nm,
                    s.wavelength_nm,
                    s.layer,
                    config.layers[s.layer],
                    s.samples
                );
            }
        }
    }

    Ok(())
}
