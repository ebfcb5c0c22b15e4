use std::{fs, path::Path};

use crate::{definitions::cpu, RomError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A program image: the raw instruction bytes without any header, guaranteed
/// to fit into the program memory.
pub struct Rom {
    /// The rom name
    name: String,
    /// The content data, stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Fails if the image does not fit behind the program start.
    ///
    /// # Example
    /// ```rust
    /// # use chip::resources::Rom;
    /// let rom = Rom::new("LOAD", vec![0x60u8, 0x05]).expect("fits into memory");
    /// assert_eq!(rom.get_name(), "LOAD");
    /// assert_eq!(rom.get_data(), &[0x60, 0x05]);
    /// assert!(Rom::new("HUGE", vec![0u8; 0x1000]).is_err());
    /// ```
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Result<Self, RomError> {
        let data = data.into();
        if data.len() > cpu::PROGRAM_SIZE {
            return Err(RomError::TooLarge {
                name: name.to_string(),
                len: data.len(),
                max: cpu::PROGRAM_SIZE,
            });
        }
        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will read the rom from the given file, the file stem is used as the rom name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        log::info!("Read rom '{}' with {} bytes", name, data.len());
        Rom::new(&name, data)
    }

        pub fn get_data(&self) -> &[u8] {
        &self.data
    }

        pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::memory;
    use std::io::Write;

    #[test]
    fn test_rom_size_limit() {
        let rom = Rom::new("FULL", vec![0xAAu8; cpu::PROGRAM_SIZE]);
        assert!(rom.is_ok());

        match Rom::new("OVER", vec![0xAAu8; cpu::PROGRAM_SIZE + 1]) {
            Err(RomError::TooLarge { name, len, max }) => {
                assert_eq!(name, "OVER");
                assert_eq!(len, cpu::PROGRAM_SIZE + 1);
                assert_eq!(max, memory::SIZE - cpu::PROGRAM_COUNTER);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_rom_from_file() {
        let path = std::env::temp_dir().join(format!("chip8-vm-{}.ch8", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        }
        let rom = Rom::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(rom.get_data(), &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(rom.get_name(), format!("chip8-vm-{}", std::process::id()));
    }

    #[test]
    fn test_rom_from_missing_file() {
        let res = Rom::from_file("/this/rom/does/not/exist.ch8");
        assert!(matches!(res, Err(RomError::Io(_))));
    }
}
