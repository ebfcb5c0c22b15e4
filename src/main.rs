//! A headless host for the interpreter. Runs a rom for a fixed amount of frames and prints the
//! final display to the terminal.
//!
//! ```bash
//! chip8 roms/IBM.ch8 --frames 120 --keys 1q --dump
//! ```

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{bail, Context};
use chip::{
    chip8::{render_display, ChipSet},
    definitions::{cpu, display, keyboard, timer},
    devices::{map_key, DisplayCommands, KeyboardCommands},
    resources::Rom,
    runner::{Runner, RunnerConfig},
    timer::TimerCallback,
};
use clap::Parser;
use rand::{rngs::SmallRng, SeedableRng};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(help = "Path to the ROM file to run")]
    rom_path: PathBuf,

    #[arg(short, long, default_value_t = 60, help = "Amount of frames to run")]
    frames: usize,

    #[arg(short, long, default_value_t = cpu::HERTZ, help = "Instructions per second")]
    cpu_hertz: u64,

    #[arg(
        short,
        long,
        default_value = "",
        help = "Host keys held down for the whole run, e.g. \"1qa\""
    )]
    keys: String,

    #[arg(short, long, help = "Seed for the random number generator")]
    seed: Option<u64>,

    #[arg(short, long, help = "Print the full chip state after the run")]
    dump: bool,

    #[arg(short, long, help = "Sleep between the frames, as a real host would")]
    realtime: bool,
}

/// Keeps the last presented frame as text.
#[derive(Default)]
struct TextDisplay {
    frame: Option<String>,
    presented: usize,
}

impl DisplayCommands for TextDisplay {
    fn display(&mut self, pixels: &[[bool; display::WIDTH]]) {
        self.frame = Some(render_display(pixels));
        self.presented += 1;
    }
}

/// Keys that stay pressed during the whole run.
struct HeldKeys {
    keys: [bool; keyboard::SIZE],
}

impl HeldKeys {
    fn parse(text: &str) -> anyhow::Result<Self> {
        let mut keys = [false; keyboard::SIZE];
        for host in text.chars() {
            match map_key(host) {
                Some(key) => keys[key] = true,
                None => bail!("The host key '{}' is not part of the keypad", host),
            }
        }
        Ok(Self { keys })
    }
}

impl KeyboardCommands for HeldKeys {
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE] {
        self.keys
    }
}

/// There is no audio device, the tone is only logged.
struct Beeper;

impl TimerCallback for Beeper {
    fn handle(&mut self, active: bool) {
        if active {
            log::info!("Beep start");
        } else {
            log::info!("Beep stop");
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = Rom::from_file(&args.rom_path)
        .with_context(|| format!("Unable to load '{}'", args.rom_path.display()))?;
    let keys = HeldKeys::parse(&args.keys)?;

    let chip = ChipSet::with_callback(rom, Beeper);
    let chip = match args.seed {
        Some(seed) => chip.with_rng(SmallRng::seed_from_u64(seed)),
        None => chip,
    };

    let config = RunnerConfig {
        cpu_hertz: args.cpu_hertz,
        ..RunnerConfig::default()
    };
    let mut runner = Runner::new(chip, TextDisplay::default(), keys, config);

    let mut cycles = 0;
    for frame in 0..args.frames {
        cycles += runner
            .run_frame()
            .with_context(|| format!("The chip crashed during frame {}", frame))?
            .cycles;
        if args.realtime {
            thread::sleep(Duration::from_millis(timer::INTERVAL));
        }
    }

    let screen = runner.display();
    println!(
        "{} after {} frames, {} cycles and {} draws",
        runner.chip().get_name(),
        args.frames,
        cycles,
        screen.presented
    );
    match &screen.frame {
        Some(frame) => println!("{}", frame),
        None => println!("{}", render_display(runner.chip().get_display())),
    }

    if args.dump {
        println!("{}", runner.chip());
    }

    Ok(())
}
