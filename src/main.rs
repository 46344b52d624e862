use std::fs;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use chip8vm::keymap::Keymap;
use chip8vm::runner::{self, Frontend, Outcome, DEFAULT_FREQ};
use chip8vm::terminal::TerminalFrontend;
use chip8vm::{Machine, Quirks};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg()]
    file: String,

    #[arg(short, long, default_value_t=DEFAULT_FREQ, help="Instructions per second")]
    freq: u32,

    #[arg(short, default_value_t=false, help="S-CHIP semantics (affects shift, load/store instructions)")]
    s_chip: bool,

    #[arg(short, long, value_enum, default_value_t=Keymap::Conventional)]
    keymap: Keymap,

    #[cfg(feature = "sdl")]
    #[arg(long, default_value_t=false, help="Open an SDL window instead of drawing in the terminal")]
    window: bool,

    #[cfg(feature = "sdl")]
    #[arg(long, default_value_t=800, help="Window width")]
    width: u32,

    #[cfg(feature = "sdl")]
    #[arg(long, default_value_t=400, help="Window height")]
    height: u32,
}

fn run_with<F: Frontend>(machine: &mut Machine, mut frontend: F, freq: u32) -> anyhow::Result<Outcome> {
    let outcome = runner::run(machine, &mut frontend, freq)?;
    // restores the terminal before anything gets printed
    drop(frontend);
    Ok(outcome)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let rom = fs::read(&args.file).with_context(|| format!("could not open {}", args.file))?;
    let quirks = if args.s_chip { Quirks::s_chip() } else { Quirks::default() };
    let mut machine = Machine::with_quirks(quirks, || -> u8 { rand::random::<u8>() });
    machine.load(&rom).with_context(|| format!("could not load {}", args.file))?;
    info!("loaded {} bytes from {}", rom.len(), args.file);

    #[cfg(feature = "sdl")]
    let outcome = if args.window {
        if args.width != args.height * 2 {
            println!("Running in an aspect ratio other than 2:1, display may look stretched!");
        }
        let frontend = chip8vm::window::WindowFrontend::new(args.keymap, args.width, args.height)?;
        run_with(&mut machine, frontend, args.freq)?
    } else {
        run_with(&mut machine, TerminalFrontend::new(args.keymap)?, args.freq)?
    };
    #[cfg(not(feature = "sdl"))]
    let outcome = run_with(&mut machine, TerminalFrontend::new(args.keymap)?, args.freq)?;

    match outcome {
        Outcome::Quit => Ok(()),
        Outcome::Halted(fault) => {
            println!("{}", machine.dump());
            bail!("machine halted: {}", fault)
        }
    }
}
