use std::convert::TryFrom;

use {
    crate::{
        definitions::{cpu, display, keyboard, memory},
        devices::Keyboard,
        opcode::{self, ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter, ProgramCounterStep},
        resources::Rom,
        timer::{NoCallback, Timer, TimerCallback},
        MemoryError, ProcessError, StackError,
    },
    rand::RngCore,
    tinyvec::ArrayVec,
};

/// The display buffer, one array of pixels per row.
pub type Display = [[bool; display::WIDTH]; display::HEIGHT];

/// The two states the chip can be in between two cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Ready to fetch the next instruction
    Running,
    /// Suspended by `FX0A`, until a key is pressed that will be stored into
    /// the given register.
    WaitingForKey { register: usize },
}

/// The whole machine: memory, registers, stack, timers, display and keypad, plus the rom it
/// was created from.
pub struct ChipSet<S: TimerCallback = NoCallback> {
    /// the loaded rom, kept for resets
    pub(super) rom: Rom,
    /// the instruction word fetched last
    pub(super) opcode: Opcode,
    /// font at `0x050`, the rom and work ram from `0x200` on
    pub(super) memory: Vec<u8>,
    /// `V0` to `VF`, where `VF` holds the carry, borrow, shift and collision flags
    pub(super) registers: [u8; cpu::register::SIZE],
    /// `I`, only ever used as a memory address
    pub(super) index_register: u16,
    /// points at the next instruction to fetch
    pub(super) program_counter: usize,
    /// return addresses of the active subroutine calls
    pub(super) stack: ArrayVec<[usize; cpu::stack::SIZE]>,
    pub(super) delay_timer: Timer<NoCallback>,
    /// a tone is owed to the host while this is non zero
    pub(super) sound_timer: Timer<S>,
    pub(super) display: Display,
    pub(super) keyboard: Keyboard,
    /// source of `CXNN`, replaceable for seeded runs and tests
    pub(super) rng: Box<dyn RngCore + Send>,
    /// Either running or waiting for a key press
    pub(super) state: ExecutionState,
}

impl ChipSet<NoCallback> {
    /// will create a new chipset object, without any sound callback
    pub fn new(rom: Rom) -> Self {
        ChipSet::with_callback(rom, NoCallback)
    }
}

impl<S: TimerCallback> ChipSet<S> {
    /// will create a new chipset object, that reports changes of the sound timer to the callback
    pub fn with_callback(rom: Rom, callback: S) -> Self {
        let mut chip = Self {
            rom,
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::new(0),
            sound_timer: Timer::with_callback(0, callback),
            display: [[false; display::WIDTH]; display::HEIGHT],
            keyboard: Keyboard::new(),
            rng: Box::new(rand::rngs::OsRng),
            state: ExecutionState::Running,
        };
        chip.load();
        chip
    }

    /// Replaces the random number generator, e.g. with a seeded one.
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Will write the fonts and the rom into the memory
    fn load(&mut self) {
        let fonts = &display::fontset::FONTSET;
        let location = display::fontset::LOCATION;
        self.memory[location..(location + fonts.len())].copy_from_slice(fonts);

        // the rom length is checked during the rom creation
        let data = self.rom.get_data();
        self.memory[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + data.len())]
            .copy_from_slice(data);

        log::info!(
            "Loaded rom '{}' with {} bytes",
            self.rom.get_name(),
            data.len()
        );
    }

    /// Will bring the chip back into the state it had directly after creation.
    /// The sound callback and the random number generator are kept.
    pub fn reset(&mut self) {
        self.opcode = 0;
        self.memory.iter_mut().for_each(|cell| *cell = 0);
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.display = [[false; display::WIDTH]; display::HEIGHT];
        self.keyboard.reset();
        self.state = ExecutionState::Running;
        self.load();
    }

    /// will get the next opcode from memory and move the program counter past it
    pub(super) fn set_opcode(&mut self) -> Result<(), ProcessError> {
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter)?;
        self.program_counter += memory::opcodes::SIZE;
        Ok(())
    }

    /// Runs a single cycle.
    ///
    /// While the chip waits for a key press no instruction is fetched and
    /// [`Operation::Wait`] is returned, the cycle in which the key arrives
    /// is spent on storing it.
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        if let ExecutionState::WaitingForKey { register } = self.state {
            return Ok(self.resume(register));
        }

        self.set_opcode()?;
        let instruction = Instruction::try_from(self.opcode)?;
        log::trace!(
            "{:#06X}: {:#06X} {}",
            self.program_counter - memory::opcodes::SIZE,
            self.opcode,
            instruction
        );
        self.calc(instruction)
    }

    /// Checks if the awaited key press arrived
    fn resume(&mut self, register: usize) -> Operation {
        match self.keyboard.take_last() {
            Some(key) => {
                log::debug!("Key {:#X} pressed, resuming into V{:X}", key, register);
                self.registers[register] = key as u8;
                self.state = ExecutionState::Running;
                Operation::None
            }
            None => Operation::Wait,
        }
    }

    /// Will suspend the execution until the next key press
    pub(super) fn await_key(&mut self, register: usize) {
        log::debug!("Waiting for a key press into V{:X}", register);
        // only presses after this point count
        self.keyboard.take_last();
        self.state = ExecutionState::WaitingForKey { register };
    }

    /// Counts both timers down by one, has to be called at 60 hertz.
    pub fn tick_timers(&mut self) {
        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Replaces the state of all keys at once, see [`Keyboard::set_mult`].
    pub fn set_keyboard(&mut self, keys: &[bool]) {
        self.keyboard.set_mult(keys);
    }

    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    pub fn toggle_key(&mut self, key: usize) {
        self.keyboard.toggle_key(key)
    }

    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Checks if the host owes a tone
    pub fn is_sound_active(&self) -> bool {
        self.sound_timer.is_active()
    }

    /// The sound timer callback
    pub fn sound_callback(&self) -> &S {
        self.sound_timer.callback()
    }

    /// The display rows, top to bottom
    pub fn get_display(&self) -> &[[bool; display::WIDTH]] {
        &self.display[..]
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    /// The name of the loaded rom
    pub fn get_name(&self) -> &str {
        self.rom.get_name()
    }

    pub fn get_state(&self) -> ExecutionState {
        self.state
    }

    /// Checks if the chip is suspended until a key press
    pub fn is_waiting(&self) -> bool {
        matches!(self.state, ExecutionState::WaitingForKey { .. })
    }

    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }

    /// Will check that `size` bytes from `pointer` on are inside of the memory
    fn check_memory(&self, pointer: usize, size: usize) -> Result<(), MemoryError> {
        match pointer.checked_add(size) {
            Some(end) if end <= self.memory.len() => Ok(()),
            _ => Err(MemoryError::OutOfBounds {
                pointer,
                size,
                len: self.memory.len(),
            }),
        }
    }

    /// `size` bytes of memory starting at the index register
    pub(super) fn memory_at_index(&self, size: usize) -> Result<&[u8], MemoryError> {
        let index = self.index_register as usize;
        self.check_memory(index, size)?;
        Ok(&self.memory[index..(index + size)])
    }

    /// `size` bytes of mutable memory starting at the index register
    pub(super) fn memory_at_index_mut(&mut self, size: usize) -> Result<&mut [u8], MemoryError> {
        let index = self.index_register as usize;
        self.check_memory(index, size)?;
        Ok(&mut self.memory[index..(index + size)])
    }
}

impl<S: TimerCallback> ProgramCounter for ChipSet<S> {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }
}

/// The keys of the keypad are addressed by the lower nibble of a register.
pub(super) fn key_index(value: u8) -> usize {
    (value as usize) % keyboard::SIZE
}
