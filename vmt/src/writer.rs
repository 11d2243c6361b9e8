use arch::Asm;
use color_print::cformat;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::translate::Group;

/// Traceability comment echoing the source line.
pub fn echo(group: &Group) -> Asm {
    Asm::comment(format!(
        "L{:<3} {}",
        group.line_no,
        group.instruction.code().trim()
    ))
}

/// Groups separated by one blank line, no trailing newline.
pub fn render(groups: &[Group], with_echo: bool) -> String {
    groups
        .iter()
        .map(|group| {
            let head = with_echo.then(|| echo(group));
            head.iter()
                .chain(group.lines.iter())
                .map(|asm| asm.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `dir/Foo.vm` -> `dir/Foo.asm`
pub fn output_path(input: &str) -> PathBuf {
    Path::new(input).with_extension("asm")
}

pub fn write(path: &Path, text: &str) -> Result<(), Error> {
    let name = path.display().to_string();
    let mut file = File::create(path).map_err(|e| Error::FileCreate(name.clone(), e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| Error::FileWrite(name, e))
}

pub fn print_dump(path: &str, groups: &[Group]) {
    println!(
        "------+------[{}]{}",
        path,
        "-".repeat(45_usize.saturating_sub(path.len()))
    );
    for group in groups {
        let source = if group.unresolved {
            cformat!("<r,s>{}</>", group.instruction.code().trim())
        } else {
            cformat!("<s>{}</>", group.instruction.code().trim())
        };
        println!(" {:>4} | {}", group.line_no, source);
        for asm in &group.lines {
            println!("      |     {}", asm.cformat());
        }
    }
    println!("------+-----------------------------------------------------");
}
