use arch::MemoryLayout;
use thiserror::Error;
use vmt::{translate, Command, Located, Options};

use crate::model::{Fault, State};
use crate::program::{Program, ProgramError};
use crate::reference::Machine;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Translation failed: {0}")]
    Translate(#[from] Located),

    #[error("Translated code does not load: {0}")]
    Program(#[from] ProgramError),
}

/// A RAM cell the two machines disagree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub addr: u16,
    pub name: Option<String>,
    pub emulated: u16,
    pub expected: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub emu_fault: Option<Fault>,
    pub ref_fault: Option<Fault>,
    pub mismatches: Vec<Mismatch>,
    pub stack: Vec<u16>,
}

impl Report {
    pub fn is_equivalent(&self) -> bool {
        self.emu_fault == self.ref_fault && self.mismatches.is_empty()
    }
}

/// Segment bases used when the caller sets none.
pub fn default_pokes(layout: &MemoryLayout) -> Vec<(u16, u16)> {
    vec![
        (layout.local.addr, 300),
        (layout.argument.addr, 400),
        (layout.this.addr, 3000),
        (layout.that.addr, 3010),
    ]
}

/// Translate `source`, run the result on the emulator and the commands on the
/// reference machine from the same initial RAM, and compare.
///
/// Every cell except the scratch cell is compared. After a fault only the
/// faults are compared, since the emulator stops part way through a command.
pub fn verify(
    source: &str,
    layout: &MemoryLayout,
    pokes: &[(u16, u16)],
) -> Result<Report, VerifyError> {
    let translation = translate(source, layout, Options { strict: true })?;
    let commands: Vec<Command> = translation
        .groups
        .iter()
        .filter_map(|group| group.instruction.command().copied())
        .collect();
    // Resolve with the stock symbol table, as a downstream assembler would
    let program = Program::from_asm(
        translation.groups.into_iter().flat_map(|group| group.lines),
        &MemoryLayout::default(),
    )?;

    let mut state = State::new(layout);
    let mut machine = Machine::new(layout);
    for &(addr, val) in pokes {
        state.ram.set(addr, val);
        machine.ram.set(addr, val);
    }

    let emu_fault = state.run(&program, None).err();
    let ref_fault = machine.run(&commands).err();

    let mut mismatches = Vec::new();
    if emu_fault.is_none() && ref_fault.is_none() {
        let names = layout.symbols().ok();
        let cells = state.ram.cells().iter().zip(machine.ram.cells());
        for (addr, (&emulated, &expected)) in cells.enumerate() {
            let addr = addr as u16;
            if addr == layout.scratch.addr || emulated == expected {
                continue;
            }
            let name = names
                .as_ref()
                .and_then(|names| names.get_by_right(&addr).cloned());
            mismatches.push(Mismatch {
                addr,
                name,
                emulated,
                expected,
            });
        }
    }

    Ok(Report {
        emu_fault,
        ref_fault,
        mismatches,
        stack: state.ram.stack().to_vec(),
    })
}
