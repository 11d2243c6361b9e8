pub mod codegen;
pub mod error;
pub mod msg;
pub mod parser;
pub mod translate;
pub mod writer;

pub use codegen::{generate, Emitted};
pub use error::{Error, GenError, Located, ParseError};
pub use parser::{Command, Instruction, Operation, Segment};
pub use translate::{translate, Group, Options, Translation};
