use crate::{comp::Comp, dest::Dest};
use color_print::cformat;
use std::fmt::Display;

/// Largest value an address instruction can load (15 bits).
pub const ADDR_MAX: u16 = 0x7FFF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addr {
    Value(u16),
    Symbol(String),
}

/// One line of target assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asm {
    /// `@value` / `@symbol`
    At(Addr),
    /// `dest=comp`
    Calc(Dest, Comp),
    /// `// text`
    Comment(String),
}

impl Asm {
    pub fn at(value: u16) -> Asm {
        Asm::At(Addr::Value(value))
    }

    pub fn sym(name: &str) -> Asm {
        Asm::At(Addr::Symbol(name.to_string()))
    }

    pub fn calc(dest: Dest, comp: Comp) -> Asm {
        Asm::Calc(dest, comp)
    }

    pub fn comment(text: impl Into<String>) -> Asm {
        Asm::Comment(text.into())
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Asm::Comment(_))
    }
}

impl Asm {
    /// Parse one line of target assembly. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Asm>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        if let Some(text) = line.strip_prefix("//") {
            return Ok(Some(Asm::Comment(text.trim().to_string())));
        }

        let code = match line.split_once("//") {
            Some((code, _)) => code.trim(),
            None => line,
        };

        if let Some(addr) = code.strip_prefix('@') {
            return Addr::parse(addr).map(|addr| Some(Asm::At(addr)));
        }
        if code.contains(';') {
            return Err(format!("Jumps are not supported: `{}`", code));
        }
        match code.split_once('=') {
            Some((dest, comp)) => Ok(Some(Asm::Calc(
                Dest::parse(dest.trim())?,
                Comp::parse(comp.trim())?,
            ))),
            None => Err(format!("Expected `dest=comp`: `{}`", code)),
        }
    }
}

impl Addr {
    fn parse(s: &str) -> Result<Addr, String> {
        let head = s
            .chars()
            .next()
            .ok_or_else(|| "Missing address after `@`".to_string())?;
        if head.is_ascii_digit() {
            match s.parse::<u16>() {
                Ok(v) if v <= ADDR_MAX => Ok(Addr::Value(v)),
                _ => Err(format!("Address out of range: `{}`", s)),
            }
        } else if s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
        {
            Ok(Addr::Symbol(s.to_string()))
        } else {
            Err(format!("Invalid symbol: `{}`", s))
        }
    }
}

impl Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Addr::Value(v) => write!(f, "{}", v),
            Addr::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl Display for Asm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asm::At(addr) => write!(f, "@{}", addr),
            Asm::Calc(dest, comp) => write!(f, "{}={}", dest, comp),
            Asm::Comment(text) => write!(f, "// {}", text),
        }
    }
}

impl Asm {
    pub fn cformat(&self) -> String {
        match self {
            Asm::At(Addr::Value(v)) => cformat!("<y>@{}</>", v),
            Asm::At(Addr::Symbol(s)) => cformat!("<g>@{}</>", s),
            Asm::Calc(dest, comp) => cformat!("<red>{}</>=<blue>{}</>", dest, comp),
            Asm::Comment(text) => cformat!("<dim>// {}</>", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lines() {
        assert_eq!(Asm::parse("@17"), Ok(Some(Asm::at(17))));
        assert_eq!(Asm::parse("  @SP  "), Ok(Some(Asm::sym("SP"))));
        assert_eq!(
            Asm::parse("AM=M+1 // bump"),
            Ok(Some(Asm::calc(Dest::AM, Comp::MPlusOne)))
        );
        assert_eq!(
            Asm::parse("// L0   push constant 7"),
            Ok(Some(Asm::comment("L0   push constant 7")))
        );
        assert_eq!(Asm::parse("   "), Ok(None));
    }

    #[test]
    fn reject_lines() {
        assert!(Asm::parse("@32768").is_err());
        assert!(Asm::parse("@").is_err());
        assert!(Asm::parse("@a-b").is_err());
        assert!(Asm::parse("0;JMP").is_err());
        assert!(Asm::parse("D").is_err());
        assert!(Asm::parse("X=D").is_err());
    }

    #[test]
    fn display_matches_source() {
        for line in ["@256", "@THIS", "D=A", "M=D", "A=A-1", "D=D+M", "// note"] {
            let asm = Asm::parse(line).unwrap().unwrap();
            assert_eq!(asm.to_string(), line);
        }
    }
}
