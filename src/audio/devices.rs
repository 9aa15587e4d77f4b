use anyhow::Result;
use console::style;
use cpal::traits::{DeviceTrait, HostTrait};

/// Print every input device with its default config. Names printed here are
/// what `[recording] device` in config.toml accepts.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();

    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok())
        .unwrap_or_default();

    let devices: Vec<_> = host.input_devices()?.collect();
    if devices.is_empty() {
        eprintln!("No audio input devices found.");
        return Ok(());
    }

    println!("{}", style("Audio Input Devices").bold());
    println!();

    for device in &devices {
        let name = device.name().unwrap_or_else(|_| "<unknown>".into());
        let marker = if name == default_name {
            style("*").green().bold()
        } else {
            style(" ")
        };

        let details = match device.default_input_config() {
            Ok(cfg) => format!(
                "{}ch  {} Hz  {:?}",
                cfg.channels(),
                cfg.sample_rate().0,
                cfg.sample_format()
            ),
            Err(e) => format!("could not query config: {e}"),
        };

        println!("  {marker} {}", style(&name).bold());
        println!("      {}", style(details).dim());
    }

    println!();
    println!("  {} = default device", style("*").green().bold());

    Ok(())
}
