use crate::audio::{AudioBackend, AudioError};
use crate::runtime::NativeSynth;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

/// Callback size requested from the device; the actual size is probed.
const REQUESTED_BUFFER_SIZE: u32 = 256;

pub struct CpalBackend {
    stream: Option<Stream>,
    synth: Arc<Mutex<NativeSynth>>,
    preferred_device: Option<String>,
}

impl CpalBackend {
    pub fn new(synth: Arc<Mutex<NativeSynth>>, preferred_device: Option<String>) -> Self {
        Self {
            stream: None,
            synth,
            preferred_device,
        }
    }

    fn select_output_device(&self, host: &cpal::Host) -> Result<cpal::Device, AudioError> {
        let Some(wanted) = self.preferred_device.as_deref() else {
            return host.default_output_device().ok_or(AudioError::NoOutputDevice);
        };

        let wanted_lower = wanted.to_lowercase();
        host.output_devices()?
            .find(|device| {
                device
                    .name()
                    .map(|name| name.to_lowercase().contains(&wanted_lower))
                    .unwrap_or(false)
            })
            .ok_or_else(|| AudioError::DeviceNotFound(wanted.to_string()))
    }

    /// Plays a throwaway stream to learn how many frames the device asks for
    /// per callback.
    fn determine_buffer_size(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
    ) -> Result<usize, AudioError> {
        let channels = config.channels as usize;
        let (buffer_size_sender, buffer_size_receiver) = std::sync::mpsc::channel();

        let stream = device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                data.fill(0.0);
                let _ = buffer_size_sender.send(data.len() / channels.max(1));
            },
            |err| error!("Stream error while probing buffer size: {}", err),
            None,
        )?;

        stream.play()?;
        let buffer_size = buffer_size_receiver.recv_timeout(Duration::from_secs(2));
        stream.pause()?;

        match buffer_size {
            Ok(size) if size > 0 => Ok(size),
            _ => {
                warn!(
                    "Could not probe device buffer size, assuming {}",
                    REQUESTED_BUFFER_SIZE
                );
                Ok(REQUESTED_BUFFER_SIZE as usize)
            }
        }
    }

    fn build_stream(&mut self) -> Result<Stream, AudioError> {
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());
        let device = self.select_output_device(&host)?;
        info!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device.default_output_config()?;
        if supported_config.sample_format() != SampleFormat::F32 {
            return Err(AudioError::UnsupportedSampleFormat(
                supported_config.sample_format(),
            ));
        }

        let mut stream_config: cpal::StreamConfig = supported_config.into();
        stream_config.buffer_size = cpal::BufferSize::Fixed(REQUESTED_BUFFER_SIZE);

        let buffer_size = self.determine_buffer_size(&device, &stream_config)?;
        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels as usize;

        {
            let mut synth = self.synth.lock().map_err(|_| AudioError::Poisoned)?;
            synth.prepare(sample_rate, buffer_size)?;
        }
        info!(
            sample_rate,
            buffer_size, channels, "Output stream configured"
        );

        let synth = self.synth.clone();
        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match synth.lock() {
                Ok(mut synth) => synth.process_interleaved(data, channels),
                Err(_) => data.fill(0.0),
            },
            |err| error!("Stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        let stream = self.build_stream()?;
        stream.play()?;
        info!("Audio stream started");
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = &self.stream {
            stream.pause()?;
            info!("Audio stream stopped");
        }
        Ok(())
    }
}
