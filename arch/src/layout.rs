use bimap::BiMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::ops::Range;
use thiserror::Error;

use crate::asm::ADDR_MAX;

/// A RAM cell addressed by symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub name: String,
    pub addr: u16,
}

/// Address a stock assembler binds `name` to before reading any source.
pub fn predefined_addr(name: &str) -> Option<u16> {
    match name {
        "SP" => Some(0),
        "LCL" => Some(1),
        "ARG" => Some(2),
        "THIS" => Some(3),
        "THAT" => Some(4),
        _ => {
            let i: u16 = name.strip_prefix('R')?.parse().ok()?;
            (i < 16 && name == format!("R{}", i)).then_some(i)
        }
    }
}

impl Cell {
    pub fn new(name: &str, addr: u16) -> Self {
        Cell {
            name: name.to_string(),
            addr,
        }
    }

    /// True when any assembler resolves `name` to `addr` on its own.
    pub fn is_predefined(&self) -> bool {
        predefined_addr(&self.name) == Some(self.addr)
    }
}

/// RAM conventions shared by the code generator and the emulator.
///
/// ```text
/// RAM[0]          SP    next free stack slot
/// RAM[1..=4]      LCL, ARG, THIS, THAT base cells
/// RAM[5..=12]     temp segment
/// RAM[13]         scratch
/// RAM[256..2048]  stack
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLayout {
    pub sp: Cell,
    pub local: Cell,
    pub argument: Cell,
    pub this: Cell,
    pub that: Cell,
    pub scratch: Cell,
    pub temp_base: u16,
    pub temp_len: u16,
    pub stack_base: u16,
    pub stack_len: u16,
}

impl Default for MemoryLayout {
    fn default() -> Self {
        MemoryLayout {
            sp: Cell::new("SP", 0),
            local: Cell::new("LCL", 1),
            argument: Cell::new("ARG", 2),
            this: Cell::new("THIS", 3),
            that: Cell::new("THAT", 4),
            scratch: Cell::new("R13", 13),
            temp_base: 5,
            temp_len: 8,
            stack_base: 256,
            stack_len: 1792,
        }
    }
}

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Failed to open layout file: {0}")]
    Open(String, #[source] std::io::Error),

    #[error("Failed to parse layout: {0}")]
    Parse(String, #[source] serde_yaml::Error),

    #[error("Invalid layout: {0}")]
    Invalid(String),
}

impl MemoryLayout {
    pub fn load(path: &str) -> Result<Self, LayoutError> {
        let file = File::open(path).map_err(|e| LayoutError::Open(path.to_string(), e))?;
        let layout: MemoryLayout = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| LayoutError::Parse(path.to_string(), e))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_yaml(text: &str) -> Result<Self, LayoutError> {
        let layout: MemoryLayout =
            serde_yaml::from_str(text).map_err(|e| LayoutError::Parse("<yaml>".to_string(), e))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Named cells in RAM order of declaration.
    pub fn cells(&self) -> [&Cell; 6] {
        [
            &self.sp,
            &self.local,
            &self.argument,
            &self.this,
            &self.that,
            &self.scratch,
        ]
    }

    /// Symbol table of the named cells. Names and addresses must be unique.
    pub fn symbols(&self) -> Result<BiMap<String, u16>, LayoutError> {
        let mut map = BiMap::new();
        for cell in self.cells() {
            if map
                .insert_no_overwrite(cell.name.clone(), cell.addr)
                .is_err()
            {
                return Err(LayoutError::Invalid(format!(
                    "cell `{}` at {} collides with another cell",
                    cell.name, cell.addr
                )));
            }
        }
        Ok(map)
    }

    pub fn temp_range(&self) -> Range<u32> {
        let base = self.temp_base as u32;
        base..base + self.temp_len as u32
    }

    pub fn stack_range(&self) -> Range<u32> {
        let base = self.stack_base as u32;
        base..base + self.stack_len as u32
    }

    /// Absolute address of `temp i`, if `i` is inside the temp region.
    pub fn temp_addr(&self, i: u16) -> Option<u16> {
        if i < self.temp_len {
            self.temp_base.checked_add(i)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        macro_rules! invalid {
            ($($arg:tt)*) => {
                return Err(LayoutError::Invalid(format!($($arg)*)))
            };
        }

        for cell in self.cells() {
            let valid_name = cell
                .name
                .chars()
                .next()
                .is_some_and(|c| !c.is_ascii_digit())
                && cell
                    .name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'));
            if !valid_name {
                invalid!("`{}` is not a valid symbol", cell.name);
            }
            if cell.addr > ADDR_MAX {
                invalid!("cell `{}` at {} is out of range", cell.name, cell.addr);
            }
        }
        self.symbols()?;

        let (temp, stack) = (self.temp_range(), self.stack_range());
        if temp.is_empty() || stack.is_empty() {
            invalid!("temp and stack regions must not be empty");
        }
        let limit = ADDR_MAX as u32 + 1;
        if temp.end > limit || stack.end > limit {
            invalid!("temp and stack regions must end below {}", limit);
        }
        if temp.start < stack.end && stack.start < temp.end {
            invalid!("temp region {:?} overlaps stack {:?}", temp, stack);
        }
        for cell in self.cells() {
            let addr = cell.addr as u32;
            if temp.contains(&addr) || stack.contains(&addr) {
                invalid!("cell `{}` at {} lies inside temp or stack", cell.name, addr);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let layout = MemoryLayout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.temp_addr(7), Some(12));
        assert_eq!(layout.temp_addr(8), None);
        assert_eq!(layout.symbols().unwrap().get_by_right(&3).unwrap(), "THIS");
    }

    #[test]
    fn yaml_overrides_fields() {
        let layout = MemoryLayout::from_yaml("stack_base: 512\nscratch: { name: R14, addr: 14 }\n")
            .unwrap();
        assert_eq!(layout.stack_base, 512);
        assert_eq!(layout.scratch, Cell::new("R14", 14));
        assert_eq!(layout.sp, Cell::new("SP", 0));
    }

    #[test]
    fn predefined_cells() {
        let layout = MemoryLayout::default();
        assert!(layout.cells().iter().all(|cell| cell.is_predefined()));
        assert!(!Cell::new("LCL", 7).is_predefined());
        assert!(!Cell::new("STACK", 0).is_predefined());
        assert!(Cell::new("R15", 15).is_predefined());
        assert!(!Cell::new("R16", 16).is_predefined());
        assert!(!Cell::new("R01", 1).is_predefined());
        assert_eq!(predefined_addr("THAT"), Some(4));
    }

    #[test]
    fn rejects_collisions() {
        assert!(MemoryLayout::from_yaml("that: { name: THIS, addr: 4 }").is_err());
        assert!(MemoryLayout::from_yaml("scratch: { name: R13, addr: 6 }").is_err());
        assert!(MemoryLayout::from_yaml("stack_base: 8").is_err());
        assert!(MemoryLayout::from_yaml("stack_len: 40000").is_err());
        assert!(MemoryLayout::from_yaml("sp: { name: 0SP, addr: 0 }").is_err());
    }
}
