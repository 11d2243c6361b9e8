use color_print::cprintln;

use crate::model::State;
use crate::program::Program;

use super::Hook;

/// Prints every executed line with the registers after it.
#[derive(Debug, Default)]
pub struct Trace {
    enabled: bool,
}

impl Trace {
    pub fn arg(enabled: bool) -> Self {
        Trace { enabled }
    }
}

impl Hook for Trace {
    fn init(&mut self, state: State) -> State {
        if self.enabled {
            println!(" * Trace");
        }
        state
    }

    fn exec(&mut self, time: u64, addr: u16, program: &Program, state: State) -> State {
        if !self.enabled {
            return state;
        }
        if let Some(line) = program.get(addr) {
            cprintln!(
                " <dim>{:>6}</> {:0>4X} L{:<4} {:<24} <dim>A={:0>4X} D={:0>4X} SP={:0>4X}</>",
                time,
                addr,
                line.line_no,
                line.asm.cformat(),
                state.a(),
                state.d(),
                state.ram.sp()
            );
        }
        state
    }
}
