use arch::MemoryLayout;
use vmt::codegen::{base_cell, pointer_cell};
use vmt::{Command, Segment};

use crate::model::{Fault, Ram};

/// Executes VM commands directly. Used as the oracle for translated code.
#[derive(Debug, Clone)]
pub struct Machine {
    pub ram: Ram,
}

impl Machine {
    pub fn new(layout: &MemoryLayout) -> Self {
        Machine {
            ram: Ram::new(layout),
        }
    }

    /// Overflow is reported before the slot is written.
    fn push(&mut self, val: u16) -> Result<(), Fault> {
        let sp = self.ram.sp();
        let next = sp.wrapping_add(1);
        if next as u32 > self.ram.layout().stack_range().end {
            return Err(Fault::StackOverflow(next));
        }
        self.ram.write(sp, val)?;
        self.ram.write(self.ram.layout().sp.addr, next)
    }

    fn pop(&mut self) -> Result<u16, Fault> {
        let sp = self.ram.sp().wrapping_sub(1);
        self.ram.write(self.ram.layout().sp.addr, sp)?;
        self.ram.read(sp)
    }

    /// Address of `segment[i]`, or `None` for segments without one.
    fn addr(&self, segment: Segment, i: u16) -> Result<Option<u16>, Fault> {
        let layout = self.ram.layout();
        let addr = match segment {
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let Some(cell) = base_cell(segment, layout) else {
                    return Ok(None);
                };
                Some(self.ram.read(cell.addr)?.wrapping_add(i))
            }
            Segment::Temp => layout.temp_addr(i),
            Segment::Pointer => pointer_cell(i, layout).map(|cell| cell.addr),
            Segment::Constant | Segment::Static => None,
        };
        Ok(addr)
    }

    pub fn exec(&mut self, command: &Command) -> Result<(), Fault> {
        let unsupported = || Fault::Unsupported(command.to_string());
        match *command {
            Command::Push(Segment::Constant, v) => self.push(v),
            Command::Push(segment, i) => {
                let addr = self.addr(segment, i)?.ok_or_else(unsupported)?;
                let val = self.ram.read(addr)?;
                self.push(val)
            }
            Command::Pop(segment, i) => {
                let addr = self.addr(segment, i)?.ok_or_else(unsupported)?;
                let val = self.pop()?;
                self.ram.write(addr, val)
            }
            Command::Add => {
                let y = self.pop()?;
                let x = self.pop()?;
                self.push(x.wrapping_add(y))
            }
            Command::Sub => {
                let y = self.pop()?;
                let x = self.pop()?;
                self.push(x.wrapping_sub(y))
            }
        }
    }

    pub fn run<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a Command>,
    ) -> Result<usize, Fault> {
        let mut count = 0;
        for command in commands {
            self.exec(command)?;
            count += 1;
        }
        Ok(count)
    }
}
