use crate::config::INPUT_CHUNK_CAPACITY;
use crate::midi::engine::{offer_chunk, ByteSink, ByteSource, ChannelByteSource, MidiError, Result};
use log::{info, trace};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::time::Duration;

/// Byte source fed by a midir input port.
///
/// The OS delivers already-split messages; they are re-flattened into a byte
/// stream so the framer sees the same input as from a serial line.
pub struct MidirByteSource {
    #[allow(dead_code)]
    connection: MidiInputConnection<()>,
    inner: ChannelByteSource,
}

impl MidirByteSource {
    pub fn connect(device_name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new("midibridge-in")
            .map_err(|e| MidiError::Connection(e.to_string()))?;
        midi_in.ignore(Ignore::None);

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| {
                MidiError::Connection(format!("Input device '{}' not found", device_name))
            })?;

        let port_name = midi_in.port_name(in_port).unwrap_or_default();
        info!("Connecting to MIDI input port: {}", port_name);

        let (tx, inner) = ChannelByteSource::bounded(INPUT_CHUNK_CAPACITY);
        let connection = midi_in
            .connect(
                in_port,
                "midibridge-input",
                move |timestamp, message, _| {
                    trace!("midir delivered {:02X?} at {}", message, timestamp);
                    offer_chunk(&tx, message);
                },
                (),
            )
            .map_err(|e| MidiError::Connection(e.to_string()))?;

        Ok(MidirByteSource {
            connection,
            inner,
        })
    }
}

impl ByteSource for MidirByteSource {
    fn wait_for_data(&mut self) -> Result<()> {
        self.inner.wait_for_data()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.inner.read_available(buf)
    }
}

/// Byte sink writing to a midir output port. Each write is sent as one message.
pub struct MidirByteSink {
    connection: MidiOutputConnection,
}

impl MidirByteSink {
    pub fn connect(device_name: &str) -> Result<Self> {
        let midi_out = MidiOutput::new("midibridge-out")
            .map_err(|e| MidiError::Connection(e.to_string()))?;

        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| {
                MidiError::Connection(format!("Output device '{}' not found", device_name))
            })?;

        let port_name = midi_out.port_name(out_port).unwrap_or_default();
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(out_port, "midibridge-output")
            .map_err(|e| MidiError::Connection(e.to_string()))?;
        Ok(MidirByteSink { connection })
    }
}

impl ByteSink for MidirByteSink {
    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.connection
            .send(bytes)
            .map_err(|e| MidiError::Write(e.to_string()))?;
        Ok(bytes.len())
    }

    // midir hands the message to the OS synchronously
    fn wait_flush(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}

#[cfg(not(feature = "test-mock"))]
pub fn list_input_devices() -> Vec<String> {
    let Ok(midi_in) = MidiInput::new("midibridge-lister") else {
        log::debug!("Unable to open MIDI input for listing");
        return vec![];
    };
    midi_in
        .ports()
        .iter()
        .filter_map(|p| midi_in.port_name(p).ok())
        .collect()
}

#[cfg(not(feature = "test-mock"))]
pub fn list_output_devices() -> Vec<String> {
    let Ok(midi_out) = MidiOutput::new("midibridge-lister") else {
        log::debug!("Unable to open MIDI output for listing");
        return vec![];
    };
    midi_out
        .ports()
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect()
}

#[cfg(feature = "test-mock")]
pub fn list_input_devices() -> Vec<String> {
    // Mock implementation for tests
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}

#[cfg(feature = "test-mock")]
pub fn list_output_devices() -> Vec<String> {
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
