use arch::MemoryLayout;
use thiserror::Error;

use crate::program::{Inst, Program};

/// Words of addressable RAM.
pub const RAM_SIZE: usize = 0x8000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("Address out of range: 0x{0:04X}")]
    AddressOutOfRange(u16),

    #[error("Stack overflow: SP would become 0x{0:04X}")]
    StackOverflow(u16),

    #[error("Stack underflow: SP would become 0x{0:04X}")]
    StackUnderflow(u16),

    #[error("Unsupported instruction: `{0}`")]
    Unsupported(String),

    #[error("Program counter 0x{0:04X} is past the end of the program")]
    Halted(u16),
}

/// RAM with the stack-pointer bounds check shared by both machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    cells: Vec<u16>,
    layout: MemoryLayout,
}

impl Ram {
    /// Zeroed RAM with SP at the stack base.
    pub fn new(layout: &MemoryLayout) -> Self {
        let mut cells = vec![0; RAM_SIZE];
        if let Some(sp) = cells.get_mut(layout.sp.addr as usize) {
            *sp = layout.stack_base;
        }
        Ram {
            cells,
            layout: layout.clone(),
        }
    }

    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    /// Unchecked read for inspection; out-of-range reads as 0.
    pub fn get(&self, addr: u16) -> u16 {
        self.cells.get(addr as usize).copied().unwrap_or(0)
    }

    /// Unchecked write for test and CLI setup.
    pub fn set(&mut self, addr: u16, val: u16) {
        if let Some(cell) = self.cells.get_mut(addr as usize) {
            *cell = val;
        }
    }

    pub fn read(&self, addr: u16) -> Result<u16, Fault> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(Fault::AddressOutOfRange(addr))
    }

    pub fn write(&mut self, addr: u16, val: u16) -> Result<(), Fault> {
        if addr == self.layout.sp.addr {
            let stack = self.layout.stack_range();
            if (val as u32) < stack.start {
                return Err(Fault::StackUnderflow(val));
            }
            if (val as u32) > stack.end {
                return Err(Fault::StackOverflow(val));
            }
        }
        match self.cells.get_mut(addr as usize) {
            Some(cell) => {
                *cell = val;
                Ok(())
            }
            None => Err(Fault::AddressOutOfRange(addr)),
        }
    }

    pub fn sp(&self) -> u16 {
        self.get(self.layout.sp.addr)
    }

    /// Live stack contents, bottom first.
    pub fn stack(&self) -> &[u16] {
        let base = self.layout.stack_base as usize;
        let sp = (self.sp() as usize).clamp(base, RAM_SIZE);
        &self.cells[base..sp]
    }

    pub fn cells(&self) -> &[u16] {
        &self.cells
    }
}

/// CPU state: A and D registers, program counter and RAM.
#[derive(Debug, Clone)]
pub struct State {
    pub ram: Ram,
    a: u16,
    d: u16,
    pc: u16,
}

impl State {
    pub fn new(layout: &MemoryLayout) -> Self {
        State {
            ram: Ram::new(layout),
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    pub fn a(&self) -> u16 {
        self.a
    }

    pub fn d(&self) -> u16 {
        self.d
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn is_terminated(&self, program: &Program) -> bool {
        self.pc as usize >= program.len()
    }

    /// Execute the line at PC. Returns the executed address.
    pub fn exec(&mut self, program: &Program) -> Result<u16, Fault> {
        let pc = self.pc;
        let line = program.get(pc).ok_or(Fault::Halted(pc))?;
        match line.inst {
            Inst::At(v) => self.a = v,
            Inst::Calc(dest, comp) => {
                // M is RAM[A] as it was before this instruction
                let addr = self.a;
                let m = if comp.reads_m() { self.ram.read(addr)? } else { 0 };
                let val = comp.eval(self.a, self.d, m);
                if dest.writes_m() {
                    self.ram.write(addr, val)?;
                }
                if dest.writes_a() {
                    self.a = val;
                }
                if dest.writes_d() {
                    self.d = val;
                }
            }
        }
        self.pc += 1;
        Ok(pc)
    }

    /// Run until the end of the program or `tmax` steps. Returns the step count.
    pub fn run(&mut self, program: &Program, tmax: Option<u64>) -> Result<u64, Fault> {
        let mut time = 0;
        while !self.is_terminated(program) && tmax.map_or(true, |t| time < t) {
            self.exec(program)?;
            time += 1;
        }
        Ok(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Result<State, Fault> {
        let layout = MemoryLayout::default();
        let program = Program::parse(text, &layout).unwrap();
        let mut state = State::new(&layout);
        state.run(&program, None)?;
        Ok(state)
    }

    #[test]
    fn starts_with_empty_stack() {
        let state = State::new(&MemoryLayout::default());
        assert_eq!(state.ram.sp(), 256);
        assert!(state.ram.stack().is_empty());
    }

    #[test]
    fn sp_cell_outside_ram() {
        let mut layout = MemoryLayout::default();
        layout.sp.addr = 0x9000;
        let ram = Ram::new(&layout);
        assert!(ram.cells().iter().all(|&cell| cell == 0));
        assert_eq!(ram.sp(), 0);
    }

    #[test]
    fn m_uses_old_a() {
        let state = run("@100\nD=A\n@5\nAM=D+1\n").unwrap();
        assert_eq!(state.ram.get(5), 101);
        assert_eq!(state.a(), 101);
        assert_eq!(state.d(), 100);
    }

    #[test]
    fn sp_below_stack_is_underflow() {
        assert_eq!(run("@SP\nM=M-1\n").unwrap_err(), Fault::StackUnderflow(255));
    }

    #[test]
    fn sp_above_stack_is_overflow() {
        assert_eq!(
            run("@2049\nD=A\n@SP\nM=D\n").unwrap_err(),
            Fault::StackOverflow(2049)
        );
        assert!(run("@2048\nD=A\n@SP\nM=D\n").is_ok());
    }

    #[test]
    fn reading_past_ram_faults() {
        assert_eq!(
            run("@0\nD=A\nD=D-1\nA=D\nD=M\n").unwrap_err(),
            Fault::AddressOutOfRange(0xFFFF)
        );
    }

    #[test]
    fn tmax_stops_early() {
        let layout = MemoryLayout::default();
        let program = Program::parse("@1\n@2\n@3\n", &layout).unwrap();
        let mut state = State::new(&layout);
        assert_eq!(state.run(&program, Some(2)), Ok(2));
        assert_eq!(state.a(), 2);
        assert!(!state.is_terminated(&program));
    }
}
