//! Decoding of the 16 bit instruction words and the trait the interpreter implements to execute
//! them.
use std::{convert::TryFrom, fmt};

use crate::{definitions::memory, OpcodeError, ProcessError};

/// `T___`, the instruction family
pub(crate) const MASK_T: u16 = 0xF000;
/// `_X__`
pub(crate) const MASK_X: u16 = 0x0F00;
/// `__Y_`
pub(crate) const MASK_Y: u16 = 0x00F0;
/// `___N`
pub(crate) const MASK_N: u16 = 0x000F;
/// `__NN`
pub(crate) const MASK_NN: u16 = 0x00FF;
/// `_NNN`
pub(crate) const MASK_NNN: u16 = 0x0FFF;

/// bits per nibble
const NIBBLE: u16 = 4;

/// An undecoded instruction word
pub type Opcode = u16;

/// Reads the big-endian instruction word at `pointer`, failing if either byte lies outside of
/// `data`.
///
/// # Example
/// ```rust
/// # use chip::opcode::build_opcode;
/// # use chip::OpcodeError;
/// let program = [0x00, 0xE0, 0xA2, 0x2A];
/// assert_eq!(Ok(0x00E0), build_opcode(&program, 0));
/// assert_eq!(Ok(0xE0A2), build_opcode(&program, 1));
/// assert_eq!(
///     Err(OpcodeError::MemoryInvalid { pointer: 3, len: 4 }),
///     build_opcode(&program, 3)
/// );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    match (data.get(pointer), pointer.checked_add(1).and_then(|next| data.get(next))) {
        (Some(&high), Some(&low)) => Ok(Opcode::from_be_bytes([high, low])),
        _ => Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        }),
    }
}

/// Field extraction, named after the usual `TXYN` notation.
///
/// # Example
/// ```rust
/// # use chip::opcode::{Opcode, OpcodeTrait};
/// let opcode: Opcode = 0xD4A7;
/// assert_eq!(0xD, opcode.t());
/// assert_eq!(0x4A7, opcode.nnn());
/// assert_eq!((0x4, 0xA7), opcode.xnn());
/// assert_eq!((0x4, 0xA, 0x7), opcode.xyn());
/// ```
pub trait OpcodeTrait {
    /// the primary opcode family selector `T` of `TXYN`
    fn t(&self) -> usize;

    /// the twelve bit address `NNN` of `TNNN`
    fn nnn(&self) -> usize;

    /// the register index `X` and the constant `NN` of `TXNN`
    fn xnn(&self) -> (usize, u8);

    /// the register indices `X`, `Y` and the constant `N` of `TXYN`
    fn xyn(&self) -> (usize, usize, u8);

    /// the register index `X` of `TXYN`
    fn x(&self) -> usize;

    /// the register index `Y` of `TXYN`
    fn y(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    fn t(&self) -> usize {
        ((self & MASK_T) >> (3 * NIBBLE)) as usize
    }

    fn nnn(&self) -> usize {
        (self & MASK_NNN) as usize
    }

    fn xnn(&self) -> (usize, u8) {
        (self.x(), (self & MASK_NN) as u8)
    }

    fn xyn(&self) -> (usize, usize, u8) {
        (self.x(), self.y(), (self & MASK_N) as u8)
    }

    fn x(&self) -> usize {
        ((self & MASK_X) >> (2 * NIBBLE)) as usize
    }

    fn y(&self) -> usize {
        ((self & MASK_Y) >> NIBBLE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the movement of the program counter after an instruction
/// was executed. The fetch already moved the counter past the
/// instruction, so `Next` leaves it where it is.
pub enum ProgramCounterStep {
    /// Continue with the instruction following the current one
    Next,
    /// Skip the instruction following the current one
    Skip,
    /// Continue at the given address.
    Jump(usize),
}

impl ProgramCounterStep {
    /// `Skip` when the condition holds, otherwise `Next`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Will return the new program counter, based on the already advanced one.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x202));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x202));
    /// assert_eq!(0x300, ProgramCounterStep::Jump(0x300).apply(0x202));
    /// ```
    #[inline]
    pub fn apply(&self, program_counter: usize) -> usize {
        match *self {
            ProgramCounterStep::Next => program_counter,
            ProgramCounterStep::Skip => program_counter + memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Sub opcodes of the `0NNN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemOpcode {
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
}

/// Sub opcodes of the `8XYN` family, keyed by `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOpcode {
    /// `8XY0`
    Assign,
    /// `8XY1`
    Or,
    /// `8XY2`
    And,
    /// `8XY3`
    Xor,
    /// `8XY4`
    Add,
    /// `8XY5`
    Sub,
    /// `8XY6`
    ShiftRight,
    /// `8XY7`
    SubReverse,
    /// `8XYE`
    ShiftLeft,
}

impl TryFrom<u8> for ArithmeticOpcode {
    type Error = ();

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        let ops = match n {
            0x0 => ArithmeticOpcode::Assign,
            0x1 => ArithmeticOpcode::Or,
            0x2 => ArithmeticOpcode::And,
            0x3 => ArithmeticOpcode::Xor,
            0x4 => ArithmeticOpcode::Add,
            0x5 => ArithmeticOpcode::Sub,
            0x6 => ArithmeticOpcode::ShiftRight,
            0x7 => ArithmeticOpcode::SubReverse,
            0xE => ArithmeticOpcode::ShiftLeft,
            _ => return Err(()),
        };
        Ok(ops)
    }
}

/// Sub opcodes of the `EXNN` family, keyed by `NN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOpcode {
    /// `EX9E`
    Pressed,
    /// `EXA1`
    NotPressed,
}

impl TryFrom<u8> for KeyOpcode {
    type Error = ();

    fn try_from(nn: u8) -> Result<Self, Self::Error> {
        match nn {
            0x9E => Ok(KeyOpcode::Pressed),
            0xA1 => Ok(KeyOpcode::NotPressed),
            _ => Err(()),
        }
    }
}

/// Sub opcodes of the `FXNN` family, keyed by `NN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOpcode {
    /// `FX07`
    GetDelayTimer,
    /// `FX0A`
    AwaitKeyPress,
    /// `FX15`
    SetDelayTimer,
    /// `FX18`
    SetSoundTimer,
    /// `FX1E`
    AddToIndex,
    /// `FX29`
    SetIndexToSprite,
    /// `FX33`
    StoreBcd,
    /// `FX55`
    StoreRegisters,
    /// `FX65`
    LoadRegisters,
}

impl TryFrom<u8> for MiscOpcode {
    type Error = ();

    fn try_from(nn: u8) -> Result<Self, Self::Error> {
        let ops = match nn {
            0x07 => MiscOpcode::GetDelayTimer,
            0x0A => MiscOpcode::AwaitKeyPress,
            0x15 => MiscOpcode::SetDelayTimer,
            0x18 => MiscOpcode::SetSoundTimer,
            0x1E => MiscOpcode::AddToIndex,
            0x29 => MiscOpcode::SetIndexToSprite,
            0x33 => MiscOpcode::StoreBcd,
            0x55 => MiscOpcode::StoreRegisters,
            0x65 => MiscOpcode::LoadRegisters,
            _ => return Err(()),
        };
        Ok(ops)
    }
}

/// A fully decoded instruction, one variant per opcode family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`, `00EE`
    System(SystemOpcode),
    /// `1NNN`
    Jump { nnn: usize },
    /// `2NNN`
    Call { nnn: usize },
    /// `3XNN`
    SkipEqual { x: usize, nn: u8 },
    /// `4XNN`
    SkipNotEqual { x: usize, nn: u8 },
    /// `5XY0`
    SkipRegistersEqual { x: usize, y: usize },
    /// `6XNN`
    Load { x: usize, nn: u8 },
    /// `7XNN`
    Add { x: usize, nn: u8 },
    /// `8XYN`
    Arithmetic {
        ops: ArithmeticOpcode,
        x: usize,
        y: usize,
    },
    /// `9XY0`
    SkipRegistersNotEqual { x: usize, y: usize },
    /// `ANNN`
    LoadIndex { nnn: usize },
    /// `BNNN`
    JumpOffset { nnn: usize },
    /// `CXNN`
    Random { x: usize, nn: u8 },
    /// `DXYN`
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E`, `EXA1`
    Key { ops: KeyOpcode, x: usize },
    /// `FXNN`
    Misc { ops: MiscOpcode, x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let invalid = |_| OpcodeError::InvalidOpcode(value);
        let (x, nn) = value.xnn();
        let (_, y, n) = value.xyn();
        let nnn = value.nnn();

        let res = match value.t() {
            0x0 => match value {
                0x00E0 => Instruction::System(SystemOpcode::Clear),
                0x00EE => Instruction::System(SystemOpcode::Return),
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqual { x, nn },
            0x4 => Instruction::SkipNotEqual { x, nn },
            0x5 if n == 0 => Instruction::SkipRegistersEqual { x, y },
            0x6 => Instruction::Load { x, nn },
            0x7 => Instruction::Add { x, nn },
            0x8 => Instruction::Arithmetic {
                ops: ArithmeticOpcode::try_from(n).map_err(invalid)?,
                x,
                y,
            },
            0x9 if n == 0 => Instruction::SkipRegistersNotEqual { x, y },
            0xA => Instruction::LoadIndex { nnn },
            0xB => Instruction::JumpOffset { nnn },
            0xC => Instruction::Random { x, nn },
            0xD => Instruction::Draw { x, y, n },
            0xE => Instruction::Key {
                ops: KeyOpcode::try_from(nn).map_err(invalid)?,
                x,
            },
            0xF => Instruction::Misc {
                ops: MiscOpcode::try_from(nn).map_err(invalid)?,
                x,
            },
            _ => return Err(OpcodeError::InvalidOpcode(value)),
        };
        Ok(res)
    }
}

/// Disassembles the instruction into the common chip8 mnemonics.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::System(SystemOpcode::Clear) => write!(f, "CLS"),
            Instruction::System(SystemOpcode::Return) => write!(f, "RET"),
            Instruction::Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Instruction::Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            Instruction::SkipEqual { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Instruction::SkipNotEqual { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Instruction::SkipRegistersEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Load { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Instruction::Add { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Instruction::Arithmetic { ops, x, y } => {
                let mnemonic = match ops {
                    ArithmeticOpcode::Assign => "LD",
                    ArithmeticOpcode::Or => "OR",
                    ArithmeticOpcode::And => "AND",
                    ArithmeticOpcode::Xor => "XOR",
                    ArithmeticOpcode::Add => "ADD",
                    ArithmeticOpcode::Sub => "SUB",
                    ArithmeticOpcode::ShiftRight => "SHR",
                    ArithmeticOpcode::SubReverse => "SUBN",
                    ArithmeticOpcode::ShiftLeft => "SHL",
                };
                write!(f, "{} V{:X}, V{:X}", mnemonic, x, y)
            }
            Instruction::SkipRegistersNotEqual { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            Instruction::JumpOffset { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Instruction::Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            Instruction::Key { ops, x } => match ops {
                KeyOpcode::Pressed => write!(f, "SKP V{:X}", x),
                KeyOpcode::NotPressed => write!(f, "SKNP V{:X}", x),
            },
            Instruction::Misc { ops, x } => match ops {
                MiscOpcode::GetDelayTimer => write!(f, "LD V{:X}, DT", x),
                MiscOpcode::AwaitKeyPress => write!(f, "LD V{:X}, K", x),
                MiscOpcode::SetDelayTimer => write!(f, "LD DT, V{:X}", x),
                MiscOpcode::SetSoundTimer => write!(f, "LD ST, V{:X}", x),
                MiscOpcode::AddToIndex => write!(f, "ADD I, V{:X}", x),
                MiscOpcode::SetIndexToSprite => write!(f, "LD F, V{:X}", x),
                MiscOpcode::StoreBcd => write!(f, "LD B, V{:X}", x),
                MiscOpcode::StoreRegisters => write!(f, "LD [I], V{:X}", x),
                MiscOpcode::LoadRegisters => write!(f, "LD V{:X}, [I]", x),
            },
        }
    }
}

/// Anything owning a program counter that can be moved by a [`ProgramCounterStep`].
pub trait ProgramCounter {
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// What the host has to do after a cycle.
pub enum Operation {
    /// Nothing
    None,
    /// The chip is suspended until the next key press
    Wait,
    /// The display buffer changed and should be presented
    Draw,
}

/// One method per instruction family, `calc` dispatches a decoded [`Instruction`] onto them and
/// applies the returned [`ProgramCounterStep`].
///
/// The program counter already points past the executed instruction when any of these run.
/// Families that can touch the display or suspend the chip report an [`Operation`] as well.
pub trait ChipOpcodes: ProgramCounter {
    /// Executes a single decoded instruction and moves the program counter accordingly.
    fn calc(&mut self, instruction: Instruction) -> Result<Operation, ProcessError> {
        let mut operation = Operation::None;
        let mut step_op = |(step, op): (ProgramCounterStep, Operation)| {
            operation = op;
            step
        };

        let step = match instruction {
            Instruction::System(ops) => self.system(ops).map(&mut step_op),
            Instruction::Jump { nnn } => self.jump(nnn),
            Instruction::Call { nnn } => self.call(nnn),
            Instruction::SkipEqual { x, nn } => self.skip_equal(x, nn),
            Instruction::SkipNotEqual { x, nn } => self.skip_not_equal(x, nn),
            Instruction::SkipRegistersEqual { x, y } => self.skip_registers_equal(x, y),
            Instruction::Load { x, nn } => self.load(x, nn),
            Instruction::Add { x, nn } => self.add(x, nn),
            Instruction::Arithmetic { ops, x, y } => self.arithmetic(ops, x, y),
            Instruction::SkipRegistersNotEqual { x, y } => self.skip_registers_not_equal(x, y),
            Instruction::LoadIndex { nnn } => self.load_index(nnn),
            Instruction::JumpOffset { nnn } => self.jump_offset(nnn),
            Instruction::Random { x, nn } => self.random(x, nn),
            Instruction::Draw { x, y, n } => self.draw(x, y, n).map(&mut step_op),
            Instruction::Key { ops, x } => self.key(ops, x),
            Instruction::Misc { ops, x } => self.misc(ops, x).map(&mut step_op),
        }?;

        self.step(step);
        Ok(operation)
    }

    /// `00E0` turns every pixel off, `00EE` pops the return address. Popping an empty stack
    /// fails with [`StackError::Empty`](crate::StackError::Empty).
    fn system(
        &mut self,
        ops: SystemOpcode,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// `1NNN`
    fn jump(&self, nnn: usize) -> Result<ProgramCounterStep, ProcessError>;

    /// `2NNN` pushes the address of the following instruction, a full stack fails with
    /// [`StackError::Full`](crate::StackError::Full).
    fn call(&mut self, nnn: usize) -> Result<ProgramCounterStep, ProcessError>;

    /// `3XNN`
    fn skip_equal(&self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError>;

    /// `4XNN`
    fn skip_not_equal(&self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError>;

    /// `5XY0`
    fn skip_registers_equal(&self, x: usize, y: usize)
        -> Result<ProgramCounterStep, ProcessError>;

    /// `6XNN`
    fn load(&mut self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError>;

    /// `7XNN` wraps around and leaves `VF` alone.
    fn add(&mut self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError>;

    /// The `8XYN` family. Add sets `VF` on carry, both subtractions set it when there is no
    /// borrow and the shifts store the bit shifted out. `VF` is written after `VX`, so a flag
    /// always survives when `X` is `F`.
    fn arithmetic(
        &mut self,
        ops: ArithmeticOpcode,
        x: usize,
        y: usize,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// `9XY0`
    fn skip_registers_not_equal(
        &self,
        x: usize,
        y: usize,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// `ANNN`
    fn load_index(&mut self, nnn: usize) -> Result<ProgramCounterStep, ProcessError>;

    /// `BNNN` jumps to `NNN + V0`.
    fn jump_offset(&self, nnn: usize) -> Result<ProgramCounterStep, ProcessError>;

    /// `CXNN` stores a random byte masked with `NN`.
    fn random(&mut self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError>;

    /// `DXYN` xors `N` sprite rows read from `I` onto the display at `(VX, VY)`.
    ///
    /// The start position wraps around the display, the sprite itself is clipped at the right
    /// and bottom edge. `VF` reports if any lit pixel was turned off. Rows outside of the memory
    /// fail with [`MemoryError::OutOfBounds`](crate::MemoryError::OutOfBounds).
    fn draw(
        &mut self,
        x: usize,
        y: usize,
        n: u8,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// `EX9E` and `EXA1`, the key is selected by the lower nibble of `VX`.
    fn key(&self, ops: KeyOpcode, x: usize) -> Result<ProgramCounterStep, ProcessError>;

    /// The `FXNN` family: timers, waiting for a key, the index register and moving registers
    /// from and to memory. `FX0A` suspends the chip and reports [`Operation::Wait`].
    fn misc(
        &mut self,
        ops: MiscOpcode,
        x: usize,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}
