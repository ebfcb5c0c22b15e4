//! The pretty print implementation of the [`ChipSet`](super::ChipSet) state dump and of the
//! display buffer. Split into this file for smaller file sizes and higher cohesion.

use std::fmt::{self, Write};

use super::ChipSet;
use crate::{
    definitions::{cpu, display},
    timer::TimerCallback,
};

/// The amount of values printed per line
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

/// Removes the trailing new line
fn trim_last_line(text: &mut String) {
    if text.ends_with(END_OF_LINE) {
        text.pop();
    }
}

/// Every integer is printed as hex with the `0x` prefix and four digits.
macro_rules! intformat {
    () => {
        "{:#06X}"
    };
}

/// The `0xFROM - 0xTO :` prefix of every row.
mod pointer_print {
    use std::fmt::Write;

    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> std::fmt::Result {
        write!(line, concat!(intformat!(), " - ", intformat!(), " :"), from, to)
    }
}

/// Memory rows, with runs of zero rows collapsed.
mod opcode_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use crate::{definitions::memory, opcode};
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// the amount of bytes shown per row
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;

    /// Used for rows, that only contain zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let zero = format!(intformat!(), 0);
        // a full row is HEX_PRINT_STEP values separated by spaces
        let width = zero.len() * HEX_PRINT_STEP + HEX_PRINT_STEP - 1;
        let inner = width - 2 * zero.len();
        format!("{}{:^width$}{}", zero, "...", zero, width = inner)
    });

    /// a single row of opcodes
    struct Row {
        from: usize,
        to: usize,
        data: Vec<u16>,
    }

    impl Row {
        fn only_null(&self) -> bool {
            self.data.iter().all(|&opcode| opcode == 0)
        }
    }

    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::new();
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');
            if self.only_null() {
                res.push_str(&ZERO_FILLER);
            } else {
                let values: Vec<String> = self
                    .data
                    .iter()
                    .map(|opcode| format!(intformat!(), opcode))
                    .collect();
                res.push_str(&values.join(" "));
            }
            write!(f, "{}", res)
        }
    }

    /// will print the memory as opcodes, multiple rows of zeros are collapsed into
    /// a single one.
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT + 1);

        for from in (0..memory.len()).step_by(POINTER_INCREMENT) {
            let to = (from + POINTER_INCREMENT).min(memory.len()) - 1;
            let data = (from..to)
                .step_by(memory::opcodes::SIZE)
                .filter_map(|index| opcode::build_opcode(memory, index).ok())
                .collect();

            let mut row = Row { from, to, data };
            if row.only_null() {
                if let Some(last) = rows.last() {
                    if last.only_null() {
                        row.from = last.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row);
        }

        let mut res = String::new();
        for row in rows {
            super::indent_helper(&mut res, indent);
            writeln!(res, "{}", row)?;
        }
        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// handles printing of any and all of the integers.
mod integer_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

        pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        write!(line, intformat!(), data)
    }

    /// Prints unsigned values in rows of eight.
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let mut res = String::new();
        for (chunk_index, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = chunk_index * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;
            for &entry in chunk {
                res.push(' ');
                formatter(&mut res, entry)?;
            }
            res.push(super::END_OF_LINE);
        }
        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// Flags such as the keyboard state.
mod bool_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use std::fmt;

    /// pads the value to the width of an integer, so that all columns line up
    fn formatter(value: bool) -> String {
        format!("{:<6}", value)
    }

    /// Prints the flags in rows of eight.
    pub(super) fn printer(data: &[bool], indent: usize) -> Result<String, fmt::Error> {
        let mut res = String::new();
        for (chunk_index, chunk) in data.chunks(HEX_PRINT_STEP).enumerate() {
            let from = chunk_index * HEX_PRINT_STEP;
            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, from, from + chunk.len() - 1)?;
            let values: Vec<String> = chunk.iter().map(|&value| formatter(value)).collect();
            res.push(' ');
            res.push_str(values.join(" ").trim_end());
            res.push(super::END_OF_LINE);
        }
        super::trim_last_line(&mut res);
        Ok(res)
    }
}

/// Renders the display buffer as text, one line per row.
///
/// # Example
/// ```rust
/// # use chip::{chip8::render_display, definitions::display};
/// let mut pixels = [[false; display::WIDTH]; display::HEIGHT];
/// pixels[0][1] = true;
/// let text = render_display(&pixels);
/// assert!(text.lines().next().unwrap().starts_with(".#."));
/// assert_eq!(text.lines().count(), display::HEIGHT);
/// ```
pub fn render_display(pixels: &[[bool; display::WIDTH]]) -> String {
    let mut res = String::with_capacity((display::WIDTH + 1) * pixels.len());
    for row in pixels {
        res.extend(row.iter().map(|&pixel| if pixel { '#' } else { '.' }));
        res.push(END_OF_LINE);
    }
    trim_last_line(&mut res);
    res
}

impl<S: TimerCallback> fmt::Display for ChipSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let single = |value: usize| -> Result<String, fmt::Error> {
            let mut line = String::new();
            indent_helper(&mut line, INDENT_SIZE);
            integer_print::formatter(&mut line, value)?;
            Ok(line)
        };

        let mut nam = String::new();
        indent_helper(&mut nam, INDENT_SIZE);
        nam.push_str(self.rom.get_name());

        let mut sta = String::new();
        indent_helper(&mut sta, INDENT_SIZE);
        write!(sta, "{:?}", self.state)?;

        let mut tim = String::new();
        indent_helper(&mut tim, INDENT_SIZE);
        write!(
            tim,
            concat!("delay ", intformat!(), " sound ", intformat!()),
            self.delay_timer.get_value(),
            self.sound_timer.get_value()
        )?;

        // the stack is filled up with zeros, so that it always has the same size
        let mut stack = [0usize; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(&self.stack);

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tState :\n{}\n\
                \tTimer :\n{}\n\
                \tMemory :\n{}\n\
                \tKeyboard :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            nam,
            single(self.opcode as usize)?,
            single(self.program_counter)?,
            single(self.index_register as usize)?,
            sta,
            tim,
            opcode_print::printer(&self.memory, INDENT_SIZE)?,
            bool_print::printer(self.keyboard.get_keys(), INDENT_SIZE)?,
            integer_print::printer(&stack, INDENT_SIZE)?,
            integer_print::printer(&self.registers, INDENT_SIZE)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{definitions::keyboard, resources::Rom};

    fn get_chip() -> ChipSet {
        let rom = Rom::new("PRINT", vec![0x00u8, 0xE0, 0x6C, 0x00]).unwrap();
        ChipSet::new(rom)
    }

    #[test]
    fn test_integer_printer() {
        let data: Vec<u8> = (0..10).collect();
        let res = integer_print::printer(&data, 1).unwrap();
        assert_eq!(
            res,
            "\t0x0000 - 0x0007 : 0x0000 0x0001 0x0002 0x0003 0x0004 0x0005 0x0006 0x0007\n\
             \t0x0008 - 0x0009 : 0x0008 0x0009"
        );
    }

    #[test]
    fn test_bool_printer() {
        let mut keys = [false; keyboard::SIZE];
        for (index, key) in keys.iter_mut().enumerate() {
            *key = index % 2 != 0;
        }
        let res = bool_print::printer(&keys, 0).unwrap();
        let expected = "false  true   false  true   false  true   false  true";
        let lines: Vec<&str> = res.lines().collect();
        assert_eq!(lines[0], format!("0x0000 - 0x0007 : {}", expected));
        assert_eq!(lines[1], format!("0x0008 - 0x000F : {}", expected));
        assert_eq!(res.lines().count(), 2);
    }

    #[test]
    fn test_memory_printer_collapses_zero_rows() {
        let chip = get_chip();
        let res = opcode_print::printer(&chip.memory, 0).unwrap();
        let lines: Vec<&str> = res.lines().collect();

        // zero rows in front of the font
        assert!(lines[0].starts_with("0x0000 - 0x004F : 0x0000"));
        assert!(lines[0].contains("..."));
        assert!(lines[0].ends_with("0x0000"));
        // the font itself
        assert_eq!(
            lines[1],
            "0x0050 - 0x005F : 0xF090 0x9090 0xF020 0x6020 0x2070 0xF010 0xF080 0xF0F0"
        );
        // the rom
        assert!(lines
            .iter()
            .any(|line| line.starts_with("0x0200 - 0x020F : 0x00E0 0x6C00 0x0000")));
        // the trailing zeros
        assert!(lines
            .last()
            .unwrap()
            .starts_with("0x0210 - 0x0FFF : 0x0000"));
        // all rows have the same length
        assert!(lines.iter().all(|line| line.len() == lines[1].len()));
    }

    #[test]
    fn test_full_print() {
        let mut chip = get_chip();
        chip.set_key(0x3, true);
        let full = format!("{}", chip);

        assert!(full.starts_with("Chipset {\n\tProgram Name :\n\t\tPRINT\n"));
        assert!(full.contains("\tProgram Counter :\n\t\t0x0200\n"));
        assert!(full.contains("\tState :\n\t\tRunning\n"));
        assert!(full.contains("\tTimer :\n\t\tdelay 0x0000 sound 0x0000\n"));
        assert!(full.contains("\t\t0x0000 - 0x0007 : false  false  false  true   false"));
        assert!(full.ends_with("0x0000 0x0000\n}"));
    }

    #[test]
    fn test_render_display() {
        let mut chip = get_chip();
        chip.display[31][63] = true;
        let text = render_display(chip.get_display());
        let last = text.lines().last().unwrap();
        assert_eq!(last.len(), display::WIDTH);
        assert!(last.ends_with(".#"));
        assert!(!text.ends_with('\n'));
    }
}
