use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::ParseError;

// ----------------------------------------------------------------------------
// Keywords

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Push,
    Pop,
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    Local,
    Argument,
    This,
    That,
    Constant,
    Static,
    Pointer,
    Temp,
}

impl Operation {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Operation::from_str(s).map_err(|_| ParseError::InvalidOperation(s.to_string()))
    }
}

impl Segment {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Segment::from_str(s).map_err(|_| ParseError::InvalidSegment(s.to_string()))
    }
}

/// Operand of push/pop: base-10, non-negative, within the signed 16-bit range.
fn parse_operand(s: &str) -> Result<u16, ParseError> {
    match s.parse::<i16>() {
        Ok(v) if v >= 0 => Ok(v as u16),
        _ => Err(ParseError::InvalidOperand(s.to_string())),
    }
}

// ----------------------------------------------------------------------------
// Command

/// A parsed, non-blank instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Push(Segment, u16),
    Pop(Segment, u16),
    Add,
    Sub,
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Command::Push(..) => Operation::Push,
            Command::Pop(..) => Operation::Pop,
            Command::Add => Operation::Add,
            Command::Sub => Operation::Sub,
        }
    }

    pub fn segment(&self) -> Option<Segment> {
        match self {
            Command::Push(segment, _) | Command::Pop(segment, _) => Some(*segment),
            Command::Add | Command::Sub => None,
        }
    }

    pub fn operand(&self) -> Option<u16> {
        match self {
            Command::Push(_, operand) | Command::Pop(_, operand) => Some(*operand),
            Command::Add | Command::Sub => None,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.segment(), self.operand()) {
            (Some(segment), Some(operand)) => {
                write!(f, "{} {} {}", self.operation(), segment, operand)
            }
            _ => write!(f, "{}", self.operation()),
        }
    }
}

// ----------------------------------------------------------------------------
// Instruction

/// One source line. `command` is `None` for blank and comment-only lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    raw: String,
    command: Option<Command>,
}

/// Text before the first `//`.
fn strip_comment(raw: &str) -> &str {
    match raw.split_once("//") {
        Some((code, _)) => code,
        None => raw,
    }
}

impl Instruction {
    pub fn parse(raw: &str) -> Result<Instruction, ParseError> {
        let code = strip_comment(raw);
        if code.is_empty() {
            return Ok(Instruction {
                raw: raw.to_string(),
                command: None,
            });
        }

        let words: Vec<&str> = code.split_whitespace().collect();
        let (op, args) = words
            .split_first()
            .ok_or(ParseError::MalformedInstruction(0))?;
        let op = Operation::parse(op)?;

        let command = match args {
            [] => match op {
                Operation::Add => Command::Add,
                Operation::Sub => Command::Sub,
                _ => return Err(ParseError::MalformedInstruction(words.len())),
            },
            [segment, operand] => {
                let segment = Segment::parse(segment)?;
                let operand = parse_operand(operand)?;
                match op {
                    Operation::Push => Command::Push(segment, operand),
                    Operation::Pop => Command::Pop(segment, operand),
                    _ => return Err(ParseError::MalformedInstruction(words.len())),
                }
            }
            _ => return Err(ParseError::MalformedInstruction(words.len())),
        };

        Ok(Instruction {
            raw: raw.to_string(),
            command: Some(command),
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Source text with the trailing comment removed.
    pub fn code(&self) -> &str {
        strip_comment(&self.raw)
    }

    pub fn is_blank(&self) -> bool {
        self.command.is_none()
    }

    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    pub fn operation(&self) -> Option<Operation> {
        self.command.map(|c| c.operation())
    }

    pub fn segment(&self) -> Option<Segment> {
        self.command.and_then(|c| c.segment())
    }

    pub fn operand(&self) -> Option<u16> {
        self.command.and_then(|c| c.operand())
    }
}

#[test]
fn test() {
    assert_eq!(Operation::parse("pop"), Ok(Operation::Pop));
    assert_eq!(Segment::Argument.to_string(), "argument");
    assert_eq!(Command::Push(Segment::Temp, 3).to_string(), "push temp 3");
    assert_eq!(Command::Sub.to_string(), "sub");
    assert_eq!(parse_operand("32767"), Ok(32767));
    assert!(parse_operand("32768").is_err());
    assert!(parse_operand("-1").is_err());
    assert!(parse_operand("0x10").is_err());
}
