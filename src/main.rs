use std::io;

use clap::Parser;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use vibe_asteroid::audio::{AudioSink, SilentSink, SoundBank, open_sink};
use vibe_asteroid::config::{Cli, usable_terminal_size};
use vibe_asteroid::constants::{DEBUG_COLUMNS, DEBUG_ROWS};
use vibe_asteroid::error::{GameError, Result};
use vibe_asteroid::game::{FrameClock, Game};
use vibe_asteroid::rendering::{OutputTarget, ScreenBuffer, TerminalCanvas};
use vibe_asteroid::terminal_io::{SimulatedInput, TerminalInput, TerminalSession};

fn main() -> Result<()> {
    let cli = Cli::parse();
    simple_logging::log_to_file(&cli.log_file, cli.log_level.into())
        .map_err(|e| GameError::Logger(e.to_string()))?;
    info!("Starting Vibe-asteroid application.");

    let mut rng = match cli.seed {
        Some(seed) => {
            info!("Using seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let sounds = SoundBank::synthesize(&mut rng);
    info!("Sound effects synthesized.");

    let result = if cli.debug { run_debug(&cli, rng) } else { run_terminal(&cli, rng, sounds) };
    if let Err(e) = &result {
        error!("Exiting with error: {}", e);
    }
    info!("Exiting application.");
    result
}

fn run_terminal(cli: &Cli, rng: StdRng, sounds: SoundBank) -> Result<()> {
    let session = TerminalSession::start()?;
    let (columns, rows) = TerminalSession::size()?;
    info!("Terminal size: {}x{}", columns, rows);
    let (columns, rows) = usable_terminal_size(columns, rows);

    let config = cli.game_config(columns, rows);
    info!("Playfield: {}x{}", config.width, config.height);

    let mut audio = open_sink(sounds, cli.mute);
    if audio.is_silent() {
        info!("Playing without sound.");
    }
    let mut input = TerminalInput::new(session.release_events());
    let mut canvas = TerminalCanvas::new(
        columns,
        rows,
        (config.width, config.height),
        OutputTarget::Stdout(io::stdout()),
    );
    let mut clock = FrameClock::new(config.fps);

    Game::new(config, rng, cli.frames).run(&mut input, &mut canvas, &mut audio, &mut clock)?;
    Ok(())
}

fn run_debug(cli: &Cli, rng: StdRng) -> Result<()> {
    info!("Debug mode enabled.");
    let config = cli.game_config(DEBUG_COLUMNS, DEBUG_ROWS);
    let frames = cli.frames.unwrap_or(60);
    info!("Debug resolution set to {}x{}, {} frames", DEBUG_COLUMNS, DEBUG_ROWS, frames);

    let mut input = SimulatedInput::demo_script(frames.saturating_sub(1));
    let mut canvas = TerminalCanvas::new(
        DEBUG_COLUMNS,
        DEBUG_ROWS,
        (config.width, config.height),
        OutputTarget::ScreenBuffer(ScreenBuffer::new(DEBUG_COLUMNS, DEBUG_ROWS)),
    );
    let mut audio = SilentSink;
    let mut clock = FrameClock::unthrottled();

    Game::new(config, rng, Some(frames)).run(&mut input, &mut canvas, &mut audio, &mut clock)?;
    Ok(())
}
