pub mod bridge;
pub mod cli;
pub mod config;
pub mod event_loop;
pub mod logging;
pub mod midi;
pub mod midi_output;
pub mod scheduler;

pub use bridge::Bridge;
pub use cli::{handle_device_list, validate_bindings, validate_device, Args};
pub use crate::config::BridgeConfig;
pub use midi_output::{outbound_queue, MidiSender};
pub use scheduler::{Scheduler, ThreadScheduler};

pub fn create_scheduler() -> ThreadScheduler {
    ThreadScheduler::new()
}
