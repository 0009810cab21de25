use std::thread;
use std::time::{Duration, Instant};

use lcxl_seq::{
    midi, InputSource, LogNoteSink, MidiInputSource, MidiLedOutput, NoteSink, Sequencer,
    SequencerConfig,
};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> lcxl_seq::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SequencerConfig::from_file(path)?,
        None => SequencerConfig::default(),
    };

    log::info!("MIDI inputs: {:?}", midi::available_input_ports());
    log::info!("MIDI outputs: {:?}", midi::available_output_ports());

    let mut input = MidiInputSource::connect(&config.port_name)?;
    let leds = MidiLedOutput::connect(&config.port_name, config.template)?;

    let mut sequencer = Sequencer::new(&config, Instant::now(), leds, note_sink())?;

    loop {
        if let Some(change) = input.poll_event() {
            for event in sequencer.dispatch_input(change) {
                log::debug!("{:?}", event);
            }
        }
        sequencer.poll(Instant::now());
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(feature = "audio")]
fn note_sink() -> impl NoteSink {
    let monitor = match lcxl_seq::AudioMonitor::new() {
        Ok(monitor) => Some(monitor),
        Err(e) => {
            log::warn!("{}; continuing without audio", e);
            None
        }
    };
    (LogNoteSink, monitor)
}

#[cfg(not(feature = "audio"))]
fn note_sink() -> impl NoteSink {
    LogNoteSink
}
