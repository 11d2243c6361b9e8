pub mod hooks;
pub mod model;
pub mod program;
pub mod reference;
pub mod verify;

pub use model::{Fault, Ram, State, RAM_SIZE};
pub use program::{Program, ProgramError};
pub use reference::Machine;
pub use verify::{verify, Mismatch, Report, VerifyError};
