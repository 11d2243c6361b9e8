use arch::{Addr, Asm, Comp, Dest, LayoutError, MemoryLayout};
use indexmap::IndexMap;
use thiserror::Error;

/// First RAM cell handed out to variables.
pub const VAR_BASE: u16 = 16;

#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("line {0}: {1}")]
    Syntax(usize, String),

    #[error("line {0}: out of variable space for `{1}`")]
    OutOfVariables(usize, String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Resolved machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    At(u16),
    Calc(Dest, Comp),
}

#[derive(Debug, Clone)]
pub struct Line {
    /// 1-based line in the source text (index + 1 for generated code).
    pub line_no: usize,
    pub asm: Asm,
    pub inst: Inst,
}

#[derive(Debug, Clone)]
pub struct Program {
    lines: Vec<Line>,
    symbols: IndexMap<String, u16>,
}

/// Layout cells first, then `R0`..`R15` where they do not clash.
fn predefined(layout: &MemoryLayout) -> Result<IndexMap<String, u16>, LayoutError> {
    layout.validate()?;
    let mut symbols = IndexMap::new();
    for cell in layout.cells() {
        symbols.insert(cell.name.clone(), cell.addr);
    }
    for i in 0..16 {
        symbols.entry(format!("R{}", i)).or_insert(i);
    }
    Ok(symbols)
}

impl Program {
    pub fn parse(text: &str, layout: &MemoryLayout) -> Result<Program, ProgramError> {
        let mut asms = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            match Asm::parse(raw) {
                Ok(Some(asm)) => asms.push((idx + 1, asm)),
                Ok(None) => {}
                Err(msg) => return Err(ProgramError::Syntax(idx + 1, msg)),
            }
        }
        Program::build(asms, layout)
    }

    pub fn from_asm(
        asms: impl IntoIterator<Item = Asm>,
        layout: &MemoryLayout,
    ) -> Result<Program, ProgramError> {
        let asms = asms
            .into_iter()
            .enumerate()
            .map(|(idx, asm)| (idx + 1, asm));
        Program::build(asms, layout)
    }

    fn build(
        asms: impl IntoIterator<Item = (usize, Asm)>,
        layout: &MemoryLayout,
    ) -> Result<Program, ProgramError> {
        let mut symbols = predefined(layout)?;
        let mut next_var = VAR_BASE;
        let mut lines = Vec::new();

        for (line_no, asm) in asms {
            let inst = match &asm {
                Asm::Comment(_) => continue,
                Asm::Calc(dest, comp) => Inst::Calc(*dest, *comp),
                Asm::At(Addr::Value(v)) => Inst::At(*v),
                Asm::At(Addr::Symbol(name)) => match symbols.get(name) {
                    Some(addr) => Inst::At(*addr),
                    None => {
                        if next_var > arch::asm::ADDR_MAX {
                            return Err(ProgramError::OutOfVariables(line_no, name.clone()));
                        }
                        symbols.insert(name.clone(), next_var);
                        next_var += 1;
                        Inst::At(next_var - 1)
                    }
                },
            };
            lines.push(Line { line_no, asm, inst });
        }

        Ok(Program { lines, symbols })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, pc: u16) -> Option<&Line> {
        self.lines.get(pc as usize)
    }

    pub fn symbols(&self) -> &IndexMap<String, u16> {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_symbols() {
        let text = "// header\n@SP\nA=M\n@R13\n@counter\n@other\n@counter\n\n@7 // seven\n";
        let program = Program::parse(text, &MemoryLayout::default()).unwrap();
        let insts: Vec<Inst> = (0..program.len() as u16)
            .map(|pc| program.get(pc).unwrap().inst)
            .collect();
        assert_eq!(
            insts,
            [
                Inst::At(0),
                Inst::Calc(Dest::A, Comp::M),
                Inst::At(13),
                Inst::At(16),
                Inst::At(17),
                Inst::At(16),
                Inst::At(7),
            ]
        );
        assert_eq!(program.get(0).unwrap().line_no, 2);
        assert_eq!(program.symbols().get("counter"), Some(&16));
    }

    #[test]
    fn reports_bad_line() {
        let err = Program::parse("@SP\nD=Q\n", &MemoryLayout::default()).unwrap_err();
        assert!(matches!(err, ProgramError::Syntax(2, _)));
    }
}
