use hashbrown::HashMap;
use once_cell::sync::Lazy;

use crate::definitions::{display, keyboard};

#[cfg_attr(test, mockall::automock)]
/// Presents the display buffer to the host
pub trait DisplayCommands {
    /// Will display all from the pixels, one slice entry per row
    fn display(&mut self, pixels: &[[bool; display::WIDTH]]);
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the host keyboard
pub trait KeyboardCommands {
    /// The current state of all the keys, indexed by the chip8 key
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE];
}

/// The sixteen keys `0` to `F` of the hex keypad, together with the last key that went from
/// released to pressed. The latter is what `FX0A` waits for.
#[derive(Default, Debug, Clone)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
    /// the last key that was pressed down, consumed by the wait for key instruction
    last: Option<usize>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Releases all keys and forgets the last press.
    pub fn reset(&mut self) {
        *self = Keyboard::default();
    }

    pub fn toggle_key(&mut self, key: usize) {
        if let Some(&current) = self.keys.get(key) {
            self.set_key(key, !current)
        }
    }

    pub fn set_key(&mut self, key: usize, to: bool) {
        match self.keys.get_mut(key) {
            Some(current) => {
                if to && !*current {
                    self.last = Some(key);
                }
                *current = to;
            }
            None => log::warn!("Ignoring the unknown key {:#X}", key),
        }
    }

    /// Overwrites all the keys at once, the lowest newly pressed key
    /// becomes the last pressed one.
    pub fn set_mult(&mut self, keys: &[bool]) {
        if keys.len() != self.keys.len() {
            log::warn!(
                "Ignoring a keyboard state of {} keys, expected {}",
                keys.len(),
                self.keys.len()
            );
            return;
        }
        let pressed = self
            .keys
            .iter()
            .zip(keys)
            .position(|(&old, &new)| new && !old);
        if pressed.is_some() {
            self.last = pressed;
        }
        self.keys.copy_from_slice(keys);
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }

    /// Checks if the given key is pressed, keys outside of the keypad never are.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn get_last(&self) -> Option<usize> {
        self.last
    }

    /// Takes the last pressed key, so that the next call only reports a new press.
    pub fn take_last(&mut self) -> Option<usize> {
        self.last.take()
    }
}

/// maps the host keyboard layout to the chip8 key.
static LAYOUT_MAP: Lazy<HashMap<char, usize>> = Lazy::new(|| {
    keyboard::HOST_LAYOUT
        .iter()
        .flatten()
        .zip(keyboard::LAYOUT.iter().flatten())
        .map(|(&host, &key)| (host, key))
        .collect()
});

/// Will map a host key on a qwerty keyboard to the chip8 key at the same
/// position of the keypad.
///
/// # Example
/// ```rust
/// # use chip::devices::map_key;
/// assert_eq!(Some(0x1), map_key('1'));
/// assert_eq!(Some(0xC), map_key('4'));
/// assert_eq!(Some(0x0), map_key('X'));
/// assert_eq!(None, map_key('p'));
/// ```
pub fn map_key(key: char) -> Option<usize> {
    LAYOUT_MAP.get(&key.to_ascii_lowercase()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_key_tracks_last_press() {
        let mut keyboard = Keyboard::new();
        assert_eq!(None, keyboard.get_last());

        keyboard.set_key(0x5, true);
        assert!(keyboard.is_pressed(0x5));
        assert_eq!(Some(0x5), keyboard.get_last());

        // holding a key down is not a new press
        assert_eq!(Some(0x5), keyboard.take_last());
        keyboard.set_key(0x5, true);
        assert_eq!(None, keyboard.get_last());

        // releasing is not a press either
        keyboard.set_key(0x5, false);
        assert_eq!(None, keyboard.get_last());
        assert!(!keyboard.is_pressed(0x5));
    }

    #[test]
    fn test_set_key_out_of_range() {
        let mut keyboard = Keyboard::new();
        keyboard.set_key(keyboard::SIZE, true);
        keyboard.toggle_key(keyboard::SIZE + 3);
        assert_eq!(None, keyboard.get_last());
        assert!(keyboard.get_keys().iter().all(|&key| !key));
        assert!(!keyboard.is_pressed(0xFF));
    }

    #[test]
    fn test_set_mult() {
        let mut keyboard = Keyboard::new();
        let mut keys = [false; keyboard::SIZE];
        keys[0x3] = true;
        keys[0xA] = true;
        keyboard.set_mult(&keys);
        assert_eq!(&keys[..], keyboard.get_keys());
        assert_eq!(Some(0x3), keyboard.take_last());

        // only 0xB is new
        keys[0xB] = true;
        keyboard.set_mult(&keys);
        assert_eq!(Some(0xB), keyboard.take_last());

        // wrong length is ignored
        keyboard.set_mult(&[true; 3]);
        assert_eq!(&keys[..], keyboard.get_keys());
    }

    #[test]
    fn test_toggle_key() {
        let mut keyboard = Keyboard::new();
        keyboard.toggle_key(0x1);
        assert!(keyboard.is_pressed(0x1));
        keyboard.toggle_key(0x1);
        assert!(!keyboard.is_pressed(0x1));
        assert_eq!(Some(0x1), keyboard.get_last());
    }

    #[test]
    fn test_map_key_covers_layout() {
        let mut seen = [false; keyboard::SIZE];
        for row in keyboard::HOST_LAYOUT.iter() {
            for &host in row.iter() {
                let key = map_key(host).expect("every host key is mapped");
                seen[key] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
