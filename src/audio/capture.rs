use std::sync::mpsc;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream};

/// A live input stream delivering mono f32 chunks over a channel.
///
/// The cpal callback runs on the audio thread; it downmixes each buffer and
/// sends it through `chunks`. Dropping `stream` stops the callback and closes
/// the channel.
pub struct InputCapture {
    pub stream: Stream,
    pub chunks: mpsc::Receiver<Vec<f32>>,
    pub sample_rate: u32,
    pub device_name: String,
}

/// Resolve an input device by name. "default" (or an empty name) picks the
/// host's default input.
pub fn input_device(name: &str) -> Result<Device> {
    let host = cpal::default_host();

    if name.is_empty() || name == "default" {
        return host
            .default_input_device()
            .context("No default input device found");
    }

    host.input_devices()
        .context("Failed to enumerate input devices")?
        .find(|d| d.name().is_ok_and(|n| n == name))
        .with_context(|| {
            format!("Input device not found: {name}. Run `ambitus devices` to list inputs.")
        })
}

/// Open `device_name` and start streaming.
pub fn start(device_name: &str) -> Result<InputCapture> {
    let device = input_device(device_name)?;
    let name = device.name().unwrap_or_else(|_| "<unknown>".into());

    let config = device
        .default_input_config()
        .context("Failed to get default input config")?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let format = config.sample_format();

    let (tx, rx) = mpsc::channel::<Vec<f32>>();

    // PipeWire typically delivers F32, ALSA often I16.
    let stream = match format {
        SampleFormat::F32 => device.build_input_stream(
            &config.into(),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(mono(data, channels, |s| s));
            },
            |err| eprintln!("Stream error: {err}"),
            None,
        )?,
        SampleFormat::I16 => device.build_input_stream(
            &config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(mono(data, channels, |s| s as f32 / i16::MAX as f32));
            },
            |err| eprintln!("Stream error: {err}"),
            None,
        )?,
        other => anyhow::bail!("Unsupported sample format: {other:?}"),
    };

    stream.play().context("Failed to start audio stream")?;

    Ok(InputCapture {
        stream,
        chunks: rx,
        sample_rate,
        device_name: name,
    })
}

/// Keep the first channel of each interleaved frame, converted to f32.
fn mono<T: Copy>(data: &[T], channels: usize, convert: impl Fn(T) -> f32) -> Vec<f32> {
    data.iter().step_by(channels.max(1)).map(|&s| convert(s)).collect()
}
