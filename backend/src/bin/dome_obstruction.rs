//! Dome obstruction command-line tool
//!
//! Runs single queries, full (HA, Dec) grids and azimuth plans against an
//! observatory configuration.
//!
//! # Usage
//!
//! ```bash
//! # Blocked fraction of the main tube at one pointing
//! dome-obstruction query telescope --ha -15 --dec 20 --az 170
//!
//! # Same, with the azimuth read off the dome controller display
//! dome-obstruction query guider --ha 30 --dec 45 --az 75 --vendor-az
//!
//! # Grid at a fixed dome azimuth, as JSON
//! dome-obstruction grid finder --az 180 --ha-step 5 --dec-step 5 > finder_180.json
//!
//! # Optimal parking azimuths
//! dome-obstruction plan telescope --az-step 10 --ha-step 5 --dec-step 5
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use qtty::Degrees;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dome_vignetting::config::ObservatoryConfig;
use dome_vignetting::models::{true_azimuth_from_vendor, Instrument};
use dome_vignetting::sampling::SamplingPolicy;
use dome_vignetting::services::{
    azimuth_axis, sweep, sweep_azimuths, AzimuthPlanner, GridSpec, ObstructionEstimator, Pointing,
    DEFAULT_SAMPLE_RATE,
};

#[derive(Parser, Debug)]
#[command(
    name = "dome-obstruction",
    about = "Estimate how much of a telescope aperture the dome blocks",
    long_about = None
)]
struct Args {
    /// Observatory configuration file (default: search for observatory.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Aperture sampling policy
    #[arg(long, value_enum, default_value_t = SamplerArg::Equidistant, global = true)]
    sampler: SamplerArg,

    /// Seed for the uniform sampler
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Sample points per aperture
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE, global = true)]
    rate: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blocked fraction at one pointing
    Query {
        /// Aperture: telescope, guider or finder
        instrument: Instrument,

        /// Hour angle in degrees
        #[arg(long, allow_negative_numbers = true)]
        ha: f64,

        /// Declination in degrees
        #[arg(long, allow_negative_numbers = true)]
        dec: f64,

        /// Dome azimuth in degrees (true, north-clockwise)
        #[arg(long, allow_negative_numbers = true)]
        az: f64,

        /// Interpret --az in the dome controller's convention
        #[arg(long)]
        vendor_az: bool,

        /// Print every traced ray as JSON
        #[arg(long)]
        detailed: bool,
    },

    /// Blocked fractions over the (HA, Dec) sky at one dome azimuth, as JSON
    Grid {
        instrument: Instrument,

        #[arg(long, allow_negative_numbers = true)]
        az: f64,

        #[arg(long, default_value_t = 1.0)]
        ha_step: f64,

        #[arg(long, default_value_t = 1.0)]
        dec_step: f64,
    },

    /// Best parking azimuth for every clear (HA, Dec) cell, as JSON
    Plan {
        instrument: Instrument,

        #[arg(long, default_value_t = 1.0)]
        az_step: f64,

        #[arg(long, default_value_t = 1.0)]
        ha_step: f64,

        #[arg(long, default_value_t = 1.0)]
        dec_step: f64,

        /// Also count cells below this fraction as clear
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SamplerArg {
    Uniform,
    Equidistant,
}

impl SamplerArg {
    fn policy(self, seed: Option<u64>) -> SamplingPolicy {
        match self {
            SamplerArg::Uniform => SamplingPolicy::Uniform { seed },
            SamplerArg::Equidistant => SamplingPolicy::Equidistant,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ObservatoryConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ObservatoryConfig::from_default_location()?,
    };
    let estimator = ObstructionEstimator::new(config)?.with_policy(args.sampler.policy(args.seed));
    info!("Estimator ready ({:?} sampling, rate {})", estimator.policy(), args.rate);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Query {
            instrument,
            ha,
            dec,
            az,
            vendor_az,
            detailed,
        } => {
            let azimuth = if vendor_az {
                true_azimuth_from_vendor(Degrees::new(az))
            } else {
                Degrees::new(az)
            };
            let pointing = Pointing::new(Degrees::new(ha), Degrees::new(dec), azimuth);
            let result = estimator.obstruction_detailed(instrument, &pointing, args.rate);

            if detailed {
                serde_json::to_writer_pretty(&mut out, &result)?;
                writeln!(out)?;
            } else {
                writeln!(
                    out,
                    "{} ha={} dec={} az={}: {:.2}% blocked",
                    instrument,
                    ha,
                    dec,
                    azimuth.value(),
                    100.0 * result.fraction
                )?;
            }
        }
        Command::Grid {
            instrument,
            az,
            ha_step,
            dec_step,
        } => {
            let spec = GridSpec::with_steps(ha_step, dec_step)?;
            let grid = sweep(&estimator, instrument, Degrees::new(az), &spec, args.rate);
            serde_json::to_writer(&mut out, &grid)?;
            writeln!(out)?;
        }
        Command::Plan {
            instrument,
            az_step,
            ha_step,
            dec_step,
            threshold,
        } => {
            let spec = GridSpec::with_steps(ha_step, dec_step)?;
            let azimuths = azimuth_axis(az_step)?;
            info!(
                "Sweeping {} azimuths x {} cells for {}",
                azimuths.len(),
                spec.cells(),
                instrument
            );

            let grids = sweep_azimuths(&estimator, instrument, &azimuths, &spec, args.rate);
            let mut planner = AzimuthPlanner::new(grids)?;
            if let Some(threshold) = threshold {
                planner = planner.with_threshold(threshold);
            }

            serde_json::to_writer_pretty(&mut out, &planner.plan())?;
            writeln!(out)?;
        }
    }

    Ok(())
}
