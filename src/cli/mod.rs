use crate::midi::midir_engine::{list_input_devices, list_output_devices};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI devices
    #[arg(long)]
    pub device_list: bool,

    /// MIDI input device to read from
    #[arg(long)]
    pub input: Option<String>,

    /// MIDI output device to write to
    #[arg(long)]
    pub output: Option<String>,

    /// Configuration file (any format supported by the config crate)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Interval of the demo note sender in milliseconds, 0 disables it
    #[arg(long)]
    pub demo_interval_ms: Option<u64>,

    /// Terminal log level (off, error, warn, info, debug, trace)
    #[arg(long, value_parser = parse_level)]
    pub log_level: Option<LevelFilter>,
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level '{}'", value))
}

/// Available input and output ports, labelled by direction.
pub fn handle_device_list() -> Vec<String> {
    let inputs = list_input_devices()
        .into_iter()
        .map(|name| format!("{} [Input]", name));
    let outputs = list_output_devices()
        .into_iter()
        .map(|name| format!("{} [Output]", name));
    inputs.chain(outputs).collect()
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}

/// Checks `input` against the input ports and `output` against the output
/// ports, so a name matching only the other direction is rejected up front.
pub fn validate_bindings(
    input: &str,
    output: &str,
    input_ports: &[String],
    output_ports: &[String],
) -> Result<(), String> {
    validate_device(input, input_ports)?;
    validate_device(output, output_ports)
}
