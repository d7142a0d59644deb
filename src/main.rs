use clap::Parser;
use midibridge::{
    cli::{handle_device_list, validate_bindings, Args},
    create_scheduler,
    midi::{
        midir_engine::{list_input_devices, list_output_devices},
        EventHandlers, MidirByteSink, MidirByteSource, MonotonicClock, NoteMessage, TransportCommand,
    },
    Bridge, BridgeConfig, MidiSender,
};
use std::{process, thread, time::Duration};

fn main() {
    let args = parse_command_line_arguments();
    let config = load_configuration(&args);
    initialize_logging(&config);

    if args.device_list {
        list_available_devices(&handle_device_list());
        return;
    }

    let (Some(input), Some(output)) = (&config.input_device, &config.output_device) else {
        exit_with_error("Both an input and an output device are required (--input, --output)");
    };
    if let Err(error_msg) =
        validate_bindings(input, output, &list_input_devices(), &list_output_devices())
    {
        exit_with_error(&error_msg);
    }

    let source = MidirByteSource::connect(input)
        .unwrap_or_else(|e| exit_with_error(&format!("Error connecting MIDI input: {}", e)));
    let sink = MidirByteSink::connect(output)
        .unwrap_or_else(|e| exit_with_error(&format!("Error connecting MIDI output: {}", e)));

    let scheduler = create_scheduler();
    let bridge = Bridge::start(
        &config,
        &scheduler,
        source,
        sink,
        MonotonicClock::new(),
        logging_handlers(),
    )
    .unwrap_or_else(|e| exit_with_error(&format!("Error starting MIDI threads: {}", e)));

    run_application_loop(bridge.sender(), config.demo_interval);
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn load_configuration(args: &Args) -> BridgeConfig {
    let mut config = BridgeConfig::load(args.config.as_deref())
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid configuration: {}", e)));
    config.apply_args(args);
    config
}

fn initialize_logging(config: &BridgeConfig) {
    if let Err(e) = midibridge::logging::init_logger(config.log_level) {
        eprintln!("Logger initialization failed: {}", e);
    }
    log::info!("Application starting");
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn exit_with_error(error_msg: &str) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    process::exit(1);
}

fn logging_handlers() -> EventHandlers {
    EventHandlers::new()
        .on_controller_change(|event| {
            log::info!(
                "ControllerChange ch {} cc {} value {}",
                event.channel,
                event.controller,
                event.value
            )
        })
        .on_song_position(|event| log::info!("SongPosition position {}", event.position))
        .on_note(|event| {
            log::info!(
                "NoteMessage ch {} note {} vel {} {}",
                event.channel,
                event.note,
                event.velocity,
                if event.on { "on" } else { "off" }
            )
        })
        .on_transport(|event| match event.command {
            TransportCommand::Unknown => {}
            command => log::info!("TransportEvent {:?}", command),
        })
        .on_bpm(|bpm| log::info!("BpmEvent value {}", bpm))
}

fn run_application_loop(sender: MidiSender, demo_interval: Option<Duration>) -> ! {
    log::info!("Application running. Press Ctrl+C to exit...");
    println!("\nPress Ctrl+C to exit...");
    loop {
        match demo_interval {
            Some(interval) => {
                thread::sleep(interval);
                sender.send_note(NoteMessage::new(1, true, 3, 127));
            }
            None => thread::sleep(Duration::from_secs(1)),
        }
    }
}
