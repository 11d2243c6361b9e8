use arch::LayoutError;
use thiserror::Error;

use crate::parser::Command;

/// Malformed source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid operation: `{0}` (expected push, pop, add or sub)")]
    InvalidOperation(String),

    #[error("Invalid segment: `{0}` (expected local, argument, this, that, constant, static, pointer or temp)")]
    InvalidSegment(String),

    #[error("Invalid operand: `{0}` (expected a decimal integer in 0..=32767)")]
    InvalidOperand(String),

    #[error("Malformed instruction with {0} tokens (expected `<op>` or `<op> <segment> <index>`)")]
    MalformedInstruction(usize),
}

/// Well-formed instruction without a translation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("`pop constant {0}`: constants are not addressable")]
    PopConstant(u16),

    #[error("`{command}`: index out of range (max {max})")]
    OperandOutOfRange { command: Command, max: u16 },

    #[error("`{0}`: static segment is not resolved")]
    Unresolved(Command),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("Unsupported program: {0}")]
    Semantic(#[from] GenError),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl Error {
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }

    pub fn is_semantic(&self) -> bool {
        matches!(self, Error::Semantic(_))
    }

    /// Process exit status: 2 for syntax, 3 for semantic, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Syntax(_) => 2,
            Error::Semantic(_) => 3,
            _ => 1,
        }
    }
}

/// An error tied to the source line it came from.
#[derive(Error, Debug)]
#[error("line {line_no}: {error}")]
pub struct Located {
    pub line_no: usize,
    pub raw: String,
    #[source]
    pub error: Error,
}
