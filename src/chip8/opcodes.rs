use crate::{
    definitions::{cpu, display},
    opcode::{
        ArithmeticOpcode, ChipOpcodes, KeyOpcode, MiscOpcode, Operation, ProgramCounterStep,
        SystemOpcode,
    },
    timer::TimerCallback,
    ProcessError,
};

use super::{chipset::key_index, ChipSet};

const BYTE: usize = 8;

impl<S: TimerCallback> ChipOpcodes for ChipSet<S> {
    fn system(
        &mut self,
        ops: SystemOpcode,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        match ops {
            SystemOpcode::Clear => {
                // 00E0
                self.display = [[false; display::WIDTH]; display::HEIGHT];
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            SystemOpcode::Return => {
                // 00EE
                let pc = self.pop_stack()?;
                log::debug!("return to {:#06X}", pc);
                Ok((ProgramCounterStep::Jump(pc), Operation::None))
            }
        }
    }

    fn jump(&self, nnn: usize) -> Result<ProgramCounterStep, ProcessError> {
        Ok(ProgramCounterStep::Jump(nnn))
    }

    fn call(&mut self, nnn: usize) -> Result<ProgramCounterStep, ProcessError> {
        // the program counter already points to the instruction after the call
        self.push_stack(self.program_counter)?;
        log::debug!("call {:#06X}, stack depth {}", nnn, self.stack.len());
        Ok(ProgramCounterStep::Jump(nnn))
    }

    fn skip_equal(&self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError> {
        Ok(ProgramCounterStep::cond(self.registers[x] == nn))
    }

    fn skip_not_equal(&self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError> {
        Ok(ProgramCounterStep::cond(self.registers[x] != nn))
    }

    fn skip_registers_equal(
        &self,
        x: usize,
        y: usize,
    ) -> Result<ProgramCounterStep, ProcessError> {
        Ok(ProgramCounterStep::cond(
            self.registers[x] == self.registers[y],
        ))
    }

    fn load(&mut self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError> {
        self.registers[x] = nn;
        Ok(ProgramCounterStep::Next)
    }

    fn add(&mut self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError> {
        self.registers[x] = self.registers[x].wrapping_add(nn);
        Ok(ProgramCounterStep::Next)
    }

    fn arithmetic(
        &mut self,
        ops: ArithmeticOpcode,
        x: usize,
        y: usize,
    ) -> Result<ProgramCounterStep, ProcessError> {
        let vx = self.registers[x];
        let vy = self.registers[y];

        // the flag is written after the result, so it wins if x is VF
        let (res, flag) = match ops {
            ArithmeticOpcode::Assign => (vy, None),
            ArithmeticOpcode::Or => (vx | vy, None),
            ArithmeticOpcode::And => (vx & vy, None),
            ArithmeticOpcode::Xor => (vx ^ vy, None),
            ArithmeticOpcode::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry))
            }
            ArithmeticOpcode::Sub => (vx.wrapping_sub(vy), Some(vx >= vy)),
            ArithmeticOpcode::ShiftRight => (vx >> 1, Some(vx & 0x01 == 0x01)),
            ArithmeticOpcode::SubReverse => (vy.wrapping_sub(vx), Some(vy >= vx)),
            ArithmeticOpcode::ShiftLeft => (vx << 1, Some(vx & 0x80 == 0x80)),
        };

        self.registers[x] = res;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag as u8;
        }
        Ok(ProgramCounterStep::Next)
    }

    fn skip_registers_not_equal(
        &self,
        x: usize,
        y: usize,
    ) -> Result<ProgramCounterStep, ProcessError> {
        Ok(ProgramCounterStep::cond(
            self.registers[x] != self.registers[y],
        ))
    }

    fn load_index(&mut self, nnn: usize) -> Result<ProgramCounterStep, ProcessError> {
        self.index_register = nnn as u16;
        Ok(ProgramCounterStep::Next)
    }

    fn jump_offset(&self, nnn: usize) -> Result<ProgramCounterStep, ProcessError> {
        // nnn is already masked to twelve bits, V0 is added afterwards
        Ok(ProgramCounterStep::Jump(nnn + self.registers[0] as usize))
    }

    fn random(&mut self, x: usize, nn: u8) -> Result<ProgramCounterStep, ProcessError> {
        let mut byte = [0u8; 1];
        self.rng.fill_bytes(&mut byte);
        self.registers[x] = byte[0] & nn;
        Ok(ProgramCounterStep::Next)
    }

    fn draw(
        &mut self,
        x: usize,
        y: usize,
        n: u8,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        // only the start position wraps, the sprite is clipped at the edges
        let coorx = self.registers[x] as usize % display::WIDTH;
        let coory = self.registers[y] as usize % display::HEIGHT;

        let mut sprite = [0u8; 0x10];
        let rows = n as usize;
        sprite[..rows].copy_from_slice(self.memory_at_index(rows)?);

        let mut collision = false;
        for (i, row) in sprite[..rows].iter().enumerate() {
            let y = coory + i;
            if y >= display::HEIGHT {
                break;
            }

            for j in 0..BYTE {
                let x = coorx + j;
                if x >= display::WIDTH {
                    break;
                }

                // most significant bit is the left most pixel
                let mask = 0x80u8 >> j;
                if *row & mask == 0 {
                    continue;
                }

                let pixel = &mut self.display[y][x];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.registers[cpu::register::LAST] = collision as u8;
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, ops: KeyOpcode, x: usize) -> Result<ProgramCounterStep, ProcessError> {
        let pressed = self.keyboard.is_pressed(key_index(self.registers[x]));
        let step = match ops {
            KeyOpcode::Pressed => ProgramCounterStep::cond(pressed),
            KeyOpcode::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn misc(
        &mut self,
        ops: MiscOpcode,
        x: usize,
    ) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let mut op = Operation::None;
        match ops {
            MiscOpcode::GetDelayTimer => {
                self.registers[x] = self.delay_timer.get_value();
            }
            MiscOpcode::AwaitKeyPress => {
                // the program counter already moved on, so the next cycle
                // continues after this instruction once a key arrived
                self.await_key(x);
                op = Operation::Wait;
            }
            MiscOpcode::SetDelayTimer => {
                self.delay_timer.set_value(self.registers[x]);
            }
            MiscOpcode::SetSoundTimer => {
                self.sound_timer.set_value(self.registers[x]);
            }
            MiscOpcode::AddToIndex => {
                // VF is not affected
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
            }
            MiscOpcode::SetIndexToSprite => {
                let glyph = (self.registers[x] & 0x0F) as usize;
                self.index_register = (display::fontset::LOCATION
                    + display::fontset::GLYPH_SIZE * glyph) as u16;
            }
            MiscOpcode::StoreBcd => {
                let r = self.registers[x];
                let digits = [r / 100, r / 10 % 10, r % 10];
                self.memory_at_index_mut(digits.len())?
                    .copy_from_slice(&digits);
            }
            MiscOpcode::StoreRegisters => {
                // I itself is left unmodified
                let registers = self.registers;
                self.memory_at_index_mut(x + 1)?
                    .copy_from_slice(&registers[..=x]);
            }
            MiscOpcode::LoadRegisters => {
                let mut values = [0u8; cpu::register::SIZE];
                values[..=x].copy_from_slice(self.memory_at_index(x + 1)?);
                self.registers[..=x].copy_from_slice(&values[..=x]);
            }
        }
        Ok((ProgramCounterStep::Next, op))
    }
}
