use arch::MemoryLayout;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use vmt::msg::Msg;
use vmt::{translate, writer, Error, Options};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "input.vm")]
    input: String,

    /// Output file [default: input with `.asm` extension]
    #[clap(short, long)]
    output: Option<String>,

    /// Memory layout (YAML)
    #[clap(short, long)]
    layout: Option<String>,

    /// Do not echo source lines as comments
    #[clap(long)]
    no_echo: bool,

    /// Treat unresolved segments as errors
    #[clap(long)]
    strict: bool,

    /// Dump translated code
    #[clap(short, long)]
    dump: bool,
}

fn fail(error: Error) -> ExitCode {
    Msg::Error(error.to_string()).head();
    ExitCode::from(error.exit_code())
}

fn read_source(path: &str) -> Result<String, Error> {
    let mut file =
        std::fs::File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
    let mut source = String::new();
    file.read_to_string(&mut source)
        .map_err(|e| Error::FileRead(path.to_string(), e))?;
    Ok(source)
}

fn main() -> ExitCode {
    use clap::Parser;

    let args = Args::parse();
    println!("VM Translator");

    let layout = match &args.layout {
        Some(path) => match MemoryLayout::load(path) {
            Ok(layout) => layout,
            Err(e) => return fail(e.into()),
        },
        None => MemoryLayout::default(),
    };

    println!("1. Read & Parse");
    println!("  < {}", args.input);
    let source = match read_source(&args.input) {
        Ok(source) => source,
        Err(e) => return fail(e),
    };

    println!("2. Generate");
    let options = Options {
        strict: args.strict,
    };
    let translation = match translate(&source, &layout, options) {
        Ok(translation) => translation,
        Err(located) => {
            let code = located.error.exit_code();
            Msg::Error(located.error.to_string()).diag((
                args.input.as_str(),
                located.line_no,
                located.raw.as_str(),
            ));
            return ExitCode::from(code);
        }
    };
    for warning in &translation.warnings {
        Msg::Warn(warning.error.to_string()).diag((
            args.input.as_str(),
            warning.line_no,
            warning.raw.as_str(),
        ));
    }
    if !translation.warnings.is_empty() {
        Msg::Note(format!(
            "{} instruction(s) left as UNDEF markers; the output is incomplete",
            translation.warnings.len()
        ))
        .head();
    }

    let output = match &args.output {
        Some(path) => PathBuf::from(path),
        None => writer::output_path(&args.input),
    };
    println!("3. Write");
    println!("  > {}", output.display());
    let text = writer::render(&translation.groups, !args.no_echo);
    if let Err(e) = writer::write(&output, &text) {
        return fail(e);
    }

    if args.dump {
        writer::print_dump(&args.input, &translation.groups);
    }

    ExitCode::SUCCESS
}
