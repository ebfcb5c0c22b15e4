use chip::{
    chip8::ChipSet,
    definitions::{display, keyboard},
    devices::{DisplayCommands, KeyboardCommands},
    resources::Rom,
    runner::{Runner, RunnerConfig},
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::SmallRng, SeedableRng};

const ROM_NAME: &str = "BENCH";

/// Draws every glyph of the font at a moving position, counts V2 up and
/// loops forever.
const ROM_DATA: [u8; 22] = [
    0x60, 0x00, // 0x200 LD V0, 0x00
    0x61, 0x00, // 0x202 LD V1, 0x00
    0xF2, 0x29, // 0x204 LD F, V2
    0xD0, 0x15, // 0x206 DRW V0, V1, 5
    0x70, 0x05, // 0x208 ADD V0, 0x05
    0x71, 0x03, // 0x20A ADD V1, 0x03
    0x72, 0x01, // 0x20C ADD V2, 0x01
    0xC3, 0xFF, // 0x20E RND V3, 0xFF
    0x83, 0x24, // 0x210 ADD V3, V2
    0xF3, 0x33, // 0x212 LD B, V3
    0x12, 0x04, // 0x214 JP 0x204
];

static BASE_ROM: once_cell::sync::Lazy<Rom> = once_cell::sync::Lazy::new(|| {
    Rom::new(ROM_NAME, ROM_DATA.to_vec()).expect("The bench rom fits into memory.")
});

/// a chip with a fixed seed, so every run draws the same numbers
fn get_default_chip() -> ChipSet {
    ChipSet::new(BASE_ROM.clone()).with_rng(SmallRng::seed_from_u64(0x5EED))
}

struct NullDisplay;

impl DisplayCommands for NullDisplay {
    fn display(&mut self, pixels: &[[bool; display::WIDTH]]) {
        black_box(pixels);
    }
}

struct NoKeys;

impl KeyboardCommands for NoKeys {
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE] {
        [false; keyboard::SIZE]
    }
}

pub fn cycle_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("cycle_bench", |b| {
        b.iter(|| {
            black_box(chip.next().expect("The bench rom is valid."));
        });
    });
}

pub fn frame_bench(c: &mut Criterion) {
    let mut runner = Runner::new(
        get_default_chip(),
        NullDisplay,
        NoKeys,
        RunnerConfig::default(),
    );
    c.bench_function("frame_bench", |b| {
        b.iter(|| {
            black_box(runner.run_frame().expect("The bench rom is valid."));
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let chip = get_default_chip();
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, cycle_bench, frame_bench, print_bench);
criterion_main!(benches);
