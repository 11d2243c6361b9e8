use arch::MemoryLayout;
use vmt::{translate, writer, Command, Error, GenError, Options, ParseError, Segment};

const PROGRAM: &str = "\
// Pushes and adds two constants
push constant 7
push constant 8   // second operand

add
";

fn run(source: &str) -> vmt::Translation {
    translate(source, &MemoryLayout::default(), Options::default())
        .unwrap_or_else(|e| panic!("{e}"))
}

#[test]
fn groups_follow_source_order() {
    let translation = run(PROGRAM);
    let lines: Vec<usize> = translation.groups.iter().map(|g| g.line_no).collect();
    assert_eq!(lines, [2, 3, 5]);
    assert_eq!(
        translation.groups[2].instruction.command(),
        Some(&Command::Add)
    );
    assert!(translation.warnings.is_empty());
    assert!(translation.is_complete());
}

#[test]
fn render_with_echo() {
    let translation = run("push constant 1\nadd");
    let text = writer::render(&translation.groups, true);
    let mut groups = text.split("\n\n");

    let first: Vec<&str> = groups.next().unwrap().lines().collect();
    assert_eq!(first[0], "// L1   push constant 1");
    assert_eq!(first[1..3], ["@1", "D=A"]);

    let second: Vec<&str> = groups.next().unwrap().lines().collect();
    assert_eq!(second[0], "// L2   add");
    assert_eq!(*second.last().unwrap(), "M=D");

    assert!(groups.next().is_none());
    assert!(!text.ends_with('\n'));
}

#[test]
fn render_without_echo() {
    let translation = run("push constant 1");
    let text = writer::render(&translation.groups, false);
    assert!(text.starts_with("@1\nD=A\n"));
    assert!(!text.contains("//"));
}

#[test]
fn syntax_error_aborts_with_line() {
    let source = "push constant 1\npop local notnum\nadd\n";
    let err = translate(source, &MemoryLayout::default(), Options::default()).unwrap_err();
    assert_eq!(err.line_no, 2);
    assert_eq!(err.raw, "pop local notnum");
    assert!(err.error.is_syntax());
    assert!(matches!(
        err.error,
        Error::Syntax(ParseError::InvalidOperand(_))
    ));
    assert_eq!(err.error.exit_code(), 2);
}

#[test]
fn semantic_error_is_distinct() {
    let source = "push constant 1\npop constant 0\n";
    let err = translate(source, &MemoryLayout::default(), Options::default()).unwrap_err();
    assert_eq!(err.line_no, 2);
    assert!(err.error.is_semantic());
    assert!(matches!(
        err.error,
        Error::Semantic(GenError::PopConstant(0))
    ));
    assert_eq!(err.error.exit_code(), 3);
}

#[test]
fn static_leaves_marker() {
    let translation = run("push static 2\npop local 0");
    assert!(!translation.is_complete());
    assert_eq!(translation.warnings.len(), 1);
    assert_eq!(translation.warnings[0].line_no, 1);

    let text = writer::render(&translation.groups, false);
    assert!(text.starts_with("// UNDEF push static 2\n\n"));
}

#[test]
fn strict_rejects_static() {
    let options = Options { strict: true };
    let err = translate("pop static 1", &MemoryLayout::default(), options).unwrap_err();
    assert!(matches!(
        err.error,
        Error::Semantic(GenError::Unresolved(Command::Pop(Segment::Static, 1)))
    ));
}

#[test]
fn renamed_cell_is_addressed_by_number() {
    let layout = MemoryLayout::from_yaml("sp: { name: STACK, addr: 0 }").unwrap();
    let translation = translate("push constant 3", &layout, Options::default()).unwrap();
    let text = writer::render(&translation.groups, false);
    assert!(!text.contains("@STACK"));
    assert!(!text.contains("@SP\n"));
    assert_eq!(text.lines().filter(|line| *line == "@0").count(), 2);
}

#[test]
fn moved_cell_is_addressed_by_number() {
    let layout =
        MemoryLayout::from_yaml("local: { name: LCL, addr: 7 }\ntemp_base: 20\n").unwrap();
    let translation =
        translate("push constant 5\npop local 0", &layout, Options::default()).unwrap();
    let text = writer::render(&translation.groups, false);
    assert!(text.lines().any(|line| line == "@7"));
    assert!(!text.contains("@LCL"));
    assert!(text.contains("@SP\n"));
}

#[test]
fn output_path_replaces_extension() {
    assert_eq!(
        writer::output_path("dir/Prog.vm"),
        std::path::PathBuf::from("dir/Prog.asm")
    );
    assert_eq!(
        writer::output_path("input"),
        std::path::PathBuf::from("input.asm")
    );
}
