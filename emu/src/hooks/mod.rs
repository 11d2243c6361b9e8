pub mod dump;
pub mod trace;

use crate::model::State;
use crate::program::Program;

pub trait Hook {
    fn init(&mut self, state: State) -> State;
    fn exec(&mut self, time: u64, addr: u16, program: &Program, state: State) -> State;
}
