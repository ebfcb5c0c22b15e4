//! Drives a [`ChipSet`] the way a host with a fixed frame rate does: read the keys, run a batch
//! of cycles, present the display and tick the timers once.

use crate::{
    chip8::ChipSet,
    definitions::{cpu, timer},
    devices::{DisplayCommands, KeyboardCommands},
    opcode::Operation,
    timer::{NoCallback, TimerCallback},
    ProcessError,
};

/// The clock configuration of the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// How many instructions are executed per second
    pub cpu_hertz: u64,
    /// How many frames are run per second, the timers tick once per frame
    pub frame_hertz: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
            frame_hertz: timer::HERTZ,
        }
    }
}

impl RunnerConfig {
    /// The amount of cycles executed per frame, at least one.
    ///
    /// # Example
    /// ```rust
    /// # use chip::runner::RunnerConfig;
    /// assert_eq!(8, RunnerConfig::default().cycles_per_frame());
    /// let slow = RunnerConfig { cpu_hertz: 10, frame_hertz: 60 };
    /// assert_eq!(1, slow.cycles_per_frame());
    /// ```
    pub fn cycles_per_frame(&self) -> usize {
        (self.cpu_hertz / self.frame_hertz.max(1)).max(1) as usize
    }
}

/// What happened during a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    /// the amount of cycles executed
    pub cycles: usize,
    /// if the display was presented
    pub drawn: bool,
    /// if the frame ended early, because the chip waits for a key press
    pub waiting: bool,
}

/// Owns the chip together with the host devices.
pub struct Runner<D, K, S = NoCallback>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: TimerCallback,
{
    chip: ChipSet<S>,
    display: D,
    keyboard: K,
    config: RunnerConfig,
}

impl<D, K, S> Runner<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: TimerCallback,
{
    pub fn new(chip: ChipSet<S>, display: D, keyboard: K, config: RunnerConfig) -> Self {
        Self {
            chip,
            display,
            keyboard,
            config,
        }
    }

    /// Will run a single frame. Any error of the chip stops the frame and is handed up.
    pub fn run_frame(&mut self) -> Result<Frame, ProcessError> {
        let keys = self.keyboard.get_keyboard();
        self.chip.set_keyboard(&keys);

        let mut frame = Frame::default();
        for _ in 0..self.config.cycles_per_frame() {
            let operation = self.chip.next()?;
            frame.cycles += 1;
            match operation {
                Operation::None => {}
                Operation::Draw => frame.drawn = true,
                Operation::Wait => {
                    frame.waiting = true;
                    break;
                }
            }
        }

        if frame.drawn {
            self.display.display(self.chip.get_display());
        }
        self.chip.tick_timers();

        log::trace!("{:?}", frame);
        Ok(frame)
    }

    /// Will run the given amount of frames and returns the amount of executed cycles.
    pub fn run(&mut self, frames: usize) -> Result<usize, ProcessError> {
        let mut cycles = 0;
        for _ in 0..frames {
            cycles += self.run_frame()?.cycles;
        }
        log::debug!("Ran {} frames with {} cycles", frames, cycles);
        Ok(cycles)
    }

    pub fn chip(&self) -> &ChipSet<S> {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet<S> {
        &mut self.chip
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn config(&self) -> RunnerConfig {
        self.config
    }
}
