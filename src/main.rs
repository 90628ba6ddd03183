use clap::{Parser, Subcommand};
use sound_of_life::runtime::{self, PlayOptions, RenderSettings};
use sound_of_life::synth::SynthConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::error;

#[derive(Parser)]
#[command(name = "sound_of_life")]
#[command(about = "Generative synthesizer played by Conway's Game of Life", long_about = None)]
struct Cli {
    /// JSON config file; missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the initial grid (default: current time)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play live through the default (or chosen) output device
    Play {
        /// Part of the output device name
        #[arg(short, long)]
        device: Option<String>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<f32>,

        /// Draw the grid in the terminal
        #[arg(long)]
        show: bool,
    },
    /// Render to a 32-bit float stereo WAV file
    Render {
        /// Output WAV file path
        output: PathBuf,

        /// Duration in seconds
        #[arg(short, long, default_value = "10.0")]
        duration: f32,

        /// Sample rate in Hz
        #[arg(short, long, default_value = "48000")]
        sample_rate: u32,

        /// Block size for processing
        #[arg(short, long, default_value = "512")]
        block_size: usize,
    },
    /// Print the default configuration as JSON
    Config,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => SynthConfig::load(path)?,
        None => SynthConfig::default(),
    };
    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });

    match cli.command {
        Commands::Play {
            device,
            duration,
            show,
        } => {
            let options = PlayOptions {
                device,
                seed,
                duration: duration
                    .filter(|secs| secs.is_finite() && *secs >= 0.0)
                    .map(Duration::from_secs_f32),
                show,
            };
            runtime::native::start(config, options)?;
        }
        Commands::Render {
            output,
            duration,
            sample_rate,
            block_size,
        } => {
            let settings = RenderSettings {
                sample_rate: sample_rate as f32,
                block_size,
                seconds: duration,
                seed,
            };
            runtime::render_wav(&output, &config, &settings)?;
        }
        Commands::Config => {
            println!("{}", SynthConfig::default().to_json_pretty()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
