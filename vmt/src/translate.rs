use arch::{Asm, MemoryLayout};

use crate::codegen::{generate, Emitted};
use crate::error::{Error, GenError, Located};
use crate::parser::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Fail on unresolved segments instead of emitting a marker.
    pub strict: bool,
}

/// Lines emitted for one source instruction.
#[derive(Debug, Clone)]
pub struct Group {
    pub line_no: usize,
    pub instruction: Instruction,
    pub lines: Vec<Asm>,
    pub unresolved: bool,
}

#[derive(Debug, Default)]
pub struct Translation {
    pub groups: Vec<Group>,
    pub warnings: Vec<Located>,
}

impl Translation {
    pub fn is_complete(&self) -> bool {
        self.groups.iter().all(|group| !group.unresolved)
    }
}

/// Translate a whole source text. The first failure aborts the run.
pub fn translate(
    source: &str,
    layout: &MemoryLayout,
    options: Options,
) -> Result<Translation, Located> {
    let mut translation = Translation::default();

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let locate = |error: Error| Located {
            line_no,
            raw: raw.to_string(),
            error,
        };

        let instruction = Instruction::parse(raw).map_err(|e| locate(e.into()))?;
        let Some(command) = instruction.command().copied() else {
            continue;
        };

        let (lines, unresolved) = match generate(&command, layout) {
            Ok(Emitted::Code(lines)) => (lines, false),
            Ok(Emitted::Unresolved(marker)) => {
                let error = GenError::Unresolved(command);
                if options.strict {
                    return Err(locate(error.into()));
                }
                translation.warnings.push(locate(error.into()));
                (vec![marker], true)
            }
            Err(e) => return Err(locate(e.into())),
        };

        translation.groups.push(Group {
            line_no,
            instruction,
            lines,
            unresolved,
        });
    }

    Ok(translation)
}
