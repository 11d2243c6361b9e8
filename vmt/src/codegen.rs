use arch::{Asm, Cell, Comp, Dest, MemoryLayout};

use crate::error::GenError;
use crate::parser::{Command, Segment};

/// Output of the generator for one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Code(Vec<Asm>),
    /// Placeholder for a segment without a translation yet. Not valid code.
    Unresolved(Asm),
}

impl Emitted {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Emitted::Unresolved(_))
    }

    pub fn into_lines(self) -> Vec<Asm> {
        match self {
            Emitted::Code(lines) => lines,
            Emitted::Unresolved(marker) => vec![marker],
        }
    }
}

/// Cell holding the base address of a pointer-addressed segment.
pub fn base_cell(segment: Segment, layout: &MemoryLayout) -> Option<&Cell> {
    match segment {
        Segment::Local => Some(&layout.local),
        Segment::Argument => Some(&layout.argument),
        Segment::This => Some(&layout.this),
        Segment::That => Some(&layout.that),
        _ => None,
    }
}

/// `pointer 0` is THIS, `pointer 1` is THAT.
pub fn pointer_cell(index: u16, layout: &MemoryLayout) -> Option<&Cell> {
    match index {
        0 => Some(&layout.this),
        1 => Some(&layout.that),
        _ => None,
    }
}

pub fn generate(command: &Command, layout: &MemoryLayout) -> Result<Emitted, GenError> {
    use Segment::*;

    let out_of_range = |max: u16| GenError::OperandOutOfRange {
        command: *command,
        max,
    };
    let temp = |i: u16| layout.temp_addr(i).ok_or(out_of_range(layout.temp_len.saturating_sub(1)));
    let pointer = |i: u16| pointer_cell(i, layout).ok_or(out_of_range(1));

    let code = match *command {
        Command::Push(Constant, v) => push_constant(v, layout),
        Command::Push(Local, i) => push_indirect(&layout.local, i, layout),
        Command::Push(Argument, i) => push_indirect(&layout.argument, i, layout),
        Command::Push(This, i) => push_indirect(&layout.this, i, layout),
        Command::Push(That, i) => push_indirect(&layout.that, i, layout),
        Command::Push(Temp, i) => push_absolute(temp(i)?, layout),
        Command::Push(Pointer, i) => push_cell(pointer(i)?, layout),

        Command::Pop(Constant, v) => return Err(GenError::PopConstant(v)),
        Command::Pop(Local, i) => pop_indirect(&layout.local, i, layout),
        Command::Pop(Argument, i) => pop_indirect(&layout.argument, i, layout),
        Command::Pop(This, i) => pop_indirect(&layout.this, i, layout),
        Command::Pop(That, i) => pop_indirect(&layout.that, i, layout),
        Command::Pop(Temp, i) => pop_absolute(temp(i)?, layout),
        Command::Pop(Pointer, i) => pop_cell(pointer(i)?, layout),

        // TODO: needs the source file name to build `File.i` symbols
        Command::Push(Static, _) | Command::Pop(Static, _) => {
            return Ok(Emitted::Unresolved(Asm::comment(format!("UNDEF {}", command))));
        }

        Command::Add => arithmetic(Comp::DPlusM, layout),
        Command::Sub => arithmetic(Comp::DMinusM, layout),
    };
    Ok(Emitted::Code(code))
}

// ----------------------------------------------------------------------------
// Building blocks

/// `@NAME` only where a stock assembler maps the name to the configured address.
fn sym(cell: &Cell) -> Asm {
    if cell.is_predefined() {
        Asm::sym(&cell.name)
    } else {
        Asm::at(cell.addr)
    }
}

fn set(dest: Dest, comp: Comp) -> Asm {
    Asm::calc(dest, comp)
}

/// `*SP = D; SP++`
fn push_d(layout: &MemoryLayout) -> Vec<Asm> {
    let sp = &layout.sp;
    vec![
        sym(sp),
        set(Dest::A, Comp::M),
        set(Dest::M, Comp::D),
        set(Dest::A, Comp::APlusOne),
        set(Dest::D, Comp::A),
        sym(sp),
        set(Dest::M, Comp::D),
    ]
}

/// `SP--; D = *SP`
fn pop_d(layout: &MemoryLayout) -> Vec<Asm> {
    let sp = &layout.sp;
    vec![
        sym(sp),
        set(Dest::A, Comp::M),
        set(Dest::A, Comp::AMinusOne),
        set(Dest::D, Comp::A),
        sym(sp),
        set(Dest::M, Comp::D),
        set(Dest::A, Comp::D),
        set(Dest::D, Comp::M),
    ]
}

// ----------------------------------------------------------------------------
// Push

fn push_constant(v: u16, layout: &MemoryLayout) -> Vec<Asm> {
    let mut code = vec![Asm::at(v), set(Dest::D, Comp::A)];
    code.extend(push_d(layout));
    code
}

/// `*SP = *(*base + i); SP++`
fn push_indirect(base: &Cell, i: u16, layout: &MemoryLayout) -> Vec<Asm> {
    let mut code = vec![
        Asm::at(i),
        set(Dest::D, Comp::A),
        sym(base),
        set(Dest::A, Comp::DPlusM),
        set(Dest::D, Comp::M),
    ];
    code.extend(push_d(layout));
    code
}

/// `*SP = RAM[addr]; SP++`
fn push_absolute(addr: u16, layout: &MemoryLayout) -> Vec<Asm> {
    let mut code = vec![Asm::at(addr), set(Dest::D, Comp::M)];
    code.extend(push_d(layout));
    code
}

/// `*SP = cell; SP++`
fn push_cell(cell: &Cell, layout: &MemoryLayout) -> Vec<Asm> {
    let mut code = vec![sym(cell), set(Dest::D, Comp::M)];
    code.extend(push_d(layout));
    code
}

// ----------------------------------------------------------------------------
// Pop

/// `scratch = *base + i; SP--; *scratch = *SP`
fn pop_indirect(base: &Cell, i: u16, layout: &MemoryLayout) -> Vec<Asm> {
    let scratch = &layout.scratch;
    let mut code = vec![
        Asm::at(i),
        set(Dest::D, Comp::A),
        sym(base),
        set(Dest::D, Comp::DPlusM),
        sym(scratch),
        set(Dest::M, Comp::D),
    ];
    code.extend(pop_d(layout));
    code.extend([sym(scratch), set(Dest::A, Comp::M), set(Dest::M, Comp::D)]);
    code
}

/// `SP--; RAM[addr] = *SP`
fn pop_absolute(addr: u16, layout: &MemoryLayout) -> Vec<Asm> {
    let mut code = pop_d(layout);
    code.extend([Asm::at(addr), set(Dest::M, Comp::D)]);
    code
}

/// `SP--; cell = *SP`
fn pop_cell(cell: &Cell, layout: &MemoryLayout) -> Vec<Asm> {
    let mut code = pop_d(layout);
    code.extend([sym(cell), set(Dest::M, Comp::D)]);
    code
}

// ----------------------------------------------------------------------------
// Arithmetic

/// `y = pop; x = pop; push(x op y)` with `comp` reading `D = x`, `M = y`.
fn arithmetic(comp: Comp, layout: &MemoryLayout) -> Vec<Asm> {
    let scratch = &layout.scratch;
    let mut code = pop_d(layout);
    code.extend([sym(scratch), set(Dest::M, Comp::D)]);
    code.extend(pop_d(layout));
    code.extend([sym(scratch), set(Dest::D, comp)]);
    code.extend(push_d(layout));
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(command: Command) -> Vec<String> {
        let layout = MemoryLayout::default();
        match generate(&command, &layout) {
            Ok(Emitted::Code(code)) => code.iter().map(|asm| asm.to_string()).collect(),
            other => panic!("{command}: {other:?}"),
        }
    }

    #[test]
    fn push_constant_text() {
        assert_eq!(
            lines(Command::Push(Segment::Constant, 17)),
            ["@17", "D=A", "@SP", "A=M", "M=D", "A=A+1", "D=A", "@SP", "M=D"]
        );
    }

    #[test]
    fn push_temp_is_absolute() {
        let code = lines(Command::Push(Segment::Temp, 3));
        assert_eq!(code[..2], ["@8", "D=M"]);
    }

    #[test]
    fn pointer_uses_cells() {
        assert_eq!(lines(Command::Push(Segment::Pointer, 0))[0], "@THIS");
        let pop = lines(Command::Pop(Segment::Pointer, 1));
        assert_eq!(pop[pop.len() - 2..], ["@THAT", "M=D"]);
    }

    #[test]
    fn pop_local_leaves_base_cell() {
        let code = lines(Command::Pop(Segment::Local, 2));
        for (idx, line) in code.iter().enumerate() {
            if line == "@LCL" {
                let (dest, _) = code[idx + 1].split_once('=').unwrap();
                assert!(!dest.contains('M'));
            }
        }
        assert_eq!(code[code.len() - 3..], ["@R13", "A=M", "M=D"]);
    }

    #[test]
    fn vocabulary_is_restricted() {
        use Segment::*;
        let dests = ["M", "D", "A"];
        let exprs = ["A", "M", "D", "A+1", "A-1", "D+M", "D-M"];
        let mut commands = vec![Command::Add, Command::Sub];
        for segment in [Local, Argument, This, That, Temp, Pointer] {
            commands.push(Command::Push(segment, 1));
            commands.push(Command::Pop(segment, 1));
        }
        commands.push(Command::Push(Constant, 32767));
        for command in commands {
            for line in lines(command) {
                if let Some((dest, expr)) = line.split_once('=') {
                    assert!(dests.contains(&dest), "{command}: {line}");
                    assert!(exprs.contains(&expr), "{command}: {line}");
                } else {
                    assert!(line.starts_with('@'), "{command}: {line}");
                }
            }
        }
    }

    #[test]
    fn semantic_errors() {
        let layout = MemoryLayout::default();
        assert_eq!(
            generate(&Command::Pop(Segment::Constant, 3), &layout),
            Err(GenError::PopConstant(3))
        );
        assert_eq!(
            generate(&Command::Push(Segment::Temp, 8), &layout),
            Err(GenError::OperandOutOfRange {
                command: Command::Push(Segment::Temp, 8),
                max: 7
            })
        );
        assert!(matches!(
            generate(&Command::Pop(Segment::Pointer, 2), &layout),
            Err(GenError::OperandOutOfRange { max: 1, .. })
        ));
    }

    #[test]
    fn indirect_segments_use_base_cell() {
        let layout = MemoryLayout::default();
        for segment in [Segment::Local, Segment::Argument, Segment::This, Segment::That] {
            let base = Asm::sym(&base_cell(segment, &layout).unwrap().name).to_string();
            assert_eq!(lines(Command::Push(segment, 1))[2], base);
            assert_eq!(lines(Command::Pop(segment, 1))[2], base);
        }
    }

    #[test]
    fn moved_cells_are_numeric() {
        let layout = MemoryLayout::from_yaml(
            "local: { name: LCL, addr: 7 }\nsp: { name: STACK, addr: 0 }\ntemp_base: 20\n",
        )
        .unwrap();
        let code = match generate(&Command::Pop(Segment::Local, 0), &layout) {
            Ok(Emitted::Code(code)) => code,
            other => panic!("{other:?}"),
        };
        let text: Vec<String> = code.iter().map(|asm| asm.to_string()).collect();
        assert_eq!(text[2], "@7");
        assert!(text.contains(&"@0".to_string()));
        assert!(text.contains(&"@R13".to_string()));
        assert!(!text.iter().any(|line| line == "@LCL" || line == "@STACK"));
    }

    #[test]
    fn static_is_unresolved() {
        let layout = MemoryLayout::default();
        let emitted = generate(&Command::Push(Segment::Static, 4), &layout).unwrap();
        assert!(emitted.is_unresolved());
        assert_eq!(
            emitted.into_lines()[0].to_string(),
            "// UNDEF push static 4"
        );
    }
}
