use super::RuntimeError;
use crate::life::{Automaton, GenerationClock, Grid, GridView};
use crate::synth::{SynthConfig, Synthesis};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "native")]
use std::path::Path;

#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub sample_rate: f32,
    pub block_size: usize,
    pub seconds: f32,
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            block_size: 512,
            seconds: 10.0,
            seed: 1,
        }
    }
}

/// Planar stereo output of an offline run.
#[derive(Clone, Debug)]
pub struct StereoRender {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: f32,
    pub generations: u64,
}

/// Renders `settings.seconds` of audio without a device. The automaton is
/// stepped at block boundaries on a sample clock, so the same seed always
/// produces the same audio.
pub fn render(config: &SynthConfig, settings: &RenderSettings) -> Result<StereoRender, RuntimeError> {
    if !(settings.seconds.is_finite() && settings.seconds > 0.0) {
        return Err(RuntimeError::InvalidDuration(settings.seconds));
    }

    let grid = Arc::new(Grid::new(config.rows, config.columns));
    let mut rng = SmallRng::seed_from_u64(settings.seed);
    grid.seed(config.initial_density, &mut rng);

    let mut synthesis = Synthesis::new(config.clone(), GridView::new(grid.clone()))?;
    synthesis.prepare_to_play(settings.sample_rate, settings.block_size)?;

    let mut automaton = Automaton::new(grid);
    let mut clock = GenerationClock::new(config.generation_interval_ms, settings.sample_rate);

    let total = (settings.seconds * settings.sample_rate).round() as usize;
    let mut left = vec![0.0; total];
    let mut right = vec![0.0; total];

    let mut start = 0;
    while start < total {
        let end = (start + settings.block_size).min(total);
        for _ in 0..clock.advance(end - start) {
            automaton.step();
        }
        synthesis.process_block(&mut left[start..end], &mut right[start..end]);
        start = end;
    }

    info!(
        frames = total,
        generations = automaton.generation(),
        "Offline render finished"
    );
    Ok(StereoRender {
        left,
        right,
        sample_rate: settings.sample_rate,
        generations: automaton.generation(),
    })
}

/// Renders and writes a 32-bit float stereo WAV file.
#[cfg(feature = "native")]
pub fn render_wav(
    path: impl AsRef<Path>,
    config: &SynthConfig,
    settings: &RenderSettings,
) -> Result<StereoRender, RuntimeError> {
    let rendered = render(config, settings)?;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: settings.sample_rate.round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    for (&l, &r) in rendered.left.iter().zip(&rendered.right) {
        writer.write_sample(l)?;
        writer.write_sample(r)?;
    }
    writer.finalize()?;

    info!("Wrote {}", path.as_ref().display());
    Ok(rendered)
}
