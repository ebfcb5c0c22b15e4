//! Fixed sizes and addresses of the machine, grouped by the part they belong to.

pub mod memory {
    /// Bytes of addressable ram, `0x000` to `0xFFF`
    pub const SIZE: usize = 0x1000;

    pub mod opcodes {
        /// Bytes per instruction, also the program counter increment
        pub const SIZE: usize = 2;
    }
}

pub mod cpu {
    /// Where the rom gets loaded and the execution starts
    pub const PROGRAM_COUNTER: usize = 0x200;
    /// The largest rom that fits between the program start and the end of the memory
    pub const PROGRAM_SIZE: usize = super::memory::SIZE - PROGRAM_COUNTER;
    /// Default instruction rate of a host
    pub const HERTZ: u64 = 500;

    pub mod register {
        /// `V0` to `VF`
        pub const SIZE: usize = 0x10;
        /// Index of `VF`, the flag register
        pub const LAST: usize = SIZE - 1;
    }

    pub mod stack {
        /// Deepest possible subroutine nesting
        pub const SIZE: usize = 0x10;
    }
}

pub mod timer {
    /// Both timers count down at this rate
    pub const HERTZ: u64 = 60;
    /// Milliseconds per timer tick
    pub const INTERVAL: u64 = 1000 / HERTZ;
}

pub mod display {
    /// Pixels per row
    pub const WIDTH: usize = 64;
    /// Rows
    pub const HEIGHT: usize = 32;

    /// The built in hex digit sprites
    pub mod fontset {
        /// First byte of the glyph for `0`
        pub const LOCATION: usize = 0x50;
        /// Rows per glyph, every row is a single byte
        pub const GLYPH_SIZE: usize = 5;

        #[rustfmt::skip]
        pub const FONTSET: [u8; 0x10 * GLYPH_SIZE] = [
            0b1111_0000, 0b1001_0000, 0b1001_0000, 0b1001_0000, 0b1111_0000, // 0
            0b0010_0000, 0b0110_0000, 0b0010_0000, 0b0010_0000, 0b0111_0000, // 1
            0b1111_0000, 0b0001_0000, 0b1111_0000, 0b1000_0000, 0b1111_0000, // 2
            0b1111_0000, 0b0001_0000, 0b1111_0000, 0b0001_0000, 0b1111_0000, // 3
            0b1001_0000, 0b1001_0000, 0b1111_0000, 0b0001_0000, 0b0001_0000, // 4
            0b1111_0000, 0b1000_0000, 0b1111_0000, 0b0001_0000, 0b1111_0000, // 5
            0b1111_0000, 0b1000_0000, 0b1111_0000, 0b1001_0000, 0b1111_0000, // 6
            0b1111_0000, 0b0001_0000, 0b0010_0000, 0b0100_0000, 0b0100_0000, // 7
            0b1111_0000, 0b1001_0000, 0b1111_0000, 0b1001_0000, 0b1111_0000, // 8
            0b1111_0000, 0b1001_0000, 0b1111_0000, 0b0001_0000, 0b1111_0000, // 9
            0b1111_0000, 0b1001_0000, 0b1111_0000, 0b1001_0000, 0b1001_0000, // A
            0b1110_0000, 0b1001_0000, 0b1110_0000, 0b1001_0000, 0b1110_0000, // B
            0b1111_0000, 0b1000_0000, 0b1000_0000, 0b1000_0000, 0b1111_0000, // C
            0b1110_0000, 0b1001_0000, 0b1001_0000, 0b1001_0000, 0b1110_0000, // D
            0b1111_0000, 0b1000_0000, 0b1111_0000, 0b1000_0000, 0b1111_0000, // E
            0b1111_0000, 0b1000_0000, 0b1111_0000, 0b1000_0000, 0b1000_0000, // F
        ];
    }
}

pub mod keyboard {
    /// Keys `0` to `F`
    pub const SIZE: usize = 0x10;
    /// The physical arrangement of the hex keypad
    pub const LAYOUT: [[usize; 4]; 4] = [
        [0x1, 0x2, 0x3, 0xC],
        [0x4, 0x5, 0x6, 0xD],
        [0x7, 0x8, 0x9, 0xE],
        [0xA, 0x0, 0xB, 0xF],
    ];
    /// The qwerty keys sitting where [`LAYOUT`] puts the keypad
    pub const HOST_LAYOUT: [[char; 4]; 4] = [
        ['1', '2', '3', '4'],
        ['q', 'w', 'e', 'r'],
        ['a', 's', 'd', 'f'],
        ['z', 'x', 'c', 'v'],
    ];
}
