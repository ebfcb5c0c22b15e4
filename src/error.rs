use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ProcessError {
    #[error("Unable to fetch or decode: {0}")]
    Opcode(#[from] OpcodeError),
    #[error("Subroutine stack: {0}")]
    Stack(#[from] StackError),
    #[error("Memory access through I: {0}")]
    Memory(#[from] MemoryError),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("The opcode {0:#06X} is not part of the instruction set")]
    InvalidOpcode(Opcode),
    #[error("No instruction can be fetched at {pointer:#06X}, the memory ends at {len:#06X}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Access of {size} bytes at {pointer:#06X} is outside of the memory with len {len}")]
    OutOfBounds {
        pointer: usize,
        size: usize,
        len: usize,
    },
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("The rom '{name}' is {len} bytes long, but only {max} bytes fit into memory")]
    TooLarge {
        name: String,
        len: usize,
        max: usize,
    },
    #[error("Unable to read the rom: {0}")]
    Io(#[from] std::io::Error),
}
