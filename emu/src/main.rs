use arch::MemoryLayout;
use clap::Parser;
use color_print::cprintln;
use std::process::ExitCode;

use emu::hooks::{dump::Dump, trace::Trace, Hook};
use emu::verify::{default_pokes, verify, VerifyError};
use emu::{Program, State, RAM_SIZE};
use vmt::msg::Msg;

#[derive(Parser, Debug)]
#[clap(
    name = "VM Emulator",
    version,
    about = "Runs translated code, or checks it against the VM"
)]
struct Args {
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    #[arg(short, long)]
    dump_cfg: Option<String>,

    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Memory layout (YAML)
    #[arg(short, long)]
    layout: Option<String>,

    /// Initial RAM value, `ADDR=VAL` (repeatable)
    #[arg(short, long, value_parser = parse_poke)]
    set: Vec<(u16, u16)>,

    /// Print every executed line
    #[arg(long)]
    trace: bool,

    /// Treat the input as VM source and compare against the reference machine
    #[arg(long)]
    verify: bool,

    #[arg(default_value = "input.asm")]
    input_file: String,
}

fn parse_poke(s: &str) -> Result<(u16, u16), String> {
    let (addr, val) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VAL, got `{}`", s))?;
    let addr: u16 = addr
        .trim()
        .parse()
        .map_err(|e| format!("bad address `{}`: {}", addr, e))?;
    if addr as usize >= RAM_SIZE {
        return Err(format!("address {} is out of RAM", addr));
    }
    let val = val.trim();
    let val = val
        .parse::<u16>()
        .or_else(|_| val.parse::<i16>().map(|v| v as u16))
        .map_err(|e| format!("bad value `{}`: {}", val, e))?;
    Ok((addr, val))
}

fn fail(msg: impl ToString) -> ExitCode {
    Msg::Error(msg.to_string()).head();
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("VM Emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    if let Some(fname) = &args.layout {
        println!("|  - Layout: {:<34} |", fname);
    }
    if args.verify {
        println!("|  - Verify against reference machine          |");
    }
    println!("+-----------------------------------------------+");

    let layout = match &args.layout {
        Some(path) => match MemoryLayout::load(path) {
            Ok(layout) => layout,
            Err(e) => return fail(e),
        },
        None => MemoryLayout::default(),
    };
    let source = match std::fs::read_to_string(&args.input_file) {
        Ok(source) => source,
        Err(e) => return fail(format!("Failed to read `{}`: {}", args.input_file, e)),
    };

    if args.verify {
        run_verify(&args, &source, &layout)
    } else {
        run_emulator(&args, &source, &layout)
    }
}

fn run_emulator(args: &Args, source: &str, layout: &MemoryLayout) -> ExitCode {
    let program = match Program::parse(source, layout) {
        Ok(program) => program,
        Err(e) => return fail(e),
    };

    // ------------------------------------------------------------------------
    // Initialize state machine model
    let mut state = State::new(layout);
    for &(addr, val) in &args.set {
        state.ram.set(addr, val);
    }

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let dump = match Dump::arg(args.dump_cfg.clone(), args.dump_all) {
        Ok(dump) => dump,
        Err(e) => return fail(e),
    };
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Trace::arg(args.trace)), Box::new(dump)];
    state = hooks.iter_mut().fold(state, |state, hook| hook.init(state));

    // ------------------------------------------------------------------------
    // Main loop
    for time in match args.tmax {
        Some(t) => 0_u64..t,
        None => 0_u64..u64::MAX,
    } {
        if state.is_terminated(&program) {
            break;
        }
        let addr = match state.exec(&program) {
            Ok(addr) => addr,
            Err(fault) => {
                let msg = Msg::Error(format!("{} (t={})", fault, time));
                match program.get(state.pc()) {
                    Some(line) => {
                        let raw = line.asm.to_string();
                        msg.diag((args.input_file.as_str(), line.line_no, raw.as_str()));
                    }
                    None => msg.head(),
                }
                return ExitCode::FAILURE;
            }
        };
        state = hooks
            .iter_mut()
            .fold(state, |state, hook| hook.exec(time, addr, &program, state));
    }

    // Exit
    println!("=================================================");
    if !state.is_terminated(&program) {
        Msg::Note(format!("stopped at pc {:0>4X} before the end", state.pc())).head();
    }
    cprintln!("<s>stack</>: {:?}", state.ram.stack());
    ExitCode::SUCCESS
}

fn run_verify(args: &Args, source: &str, layout: &MemoryLayout) -> ExitCode {
    let mut pokes = default_pokes(layout);
    pokes.extend(args.set.iter().copied());

    let report = match verify(source, layout, &pokes) {
        Ok(report) => report,
        Err(VerifyError::Translate(located)) => {
            let code = located.error.exit_code();
            Msg::Error(located.error.to_string()).diag((
                args.input_file.as_str(),
                located.line_no,
                located.raw.as_str(),
            ));
            return ExitCode::from(code);
        }
        Err(e) => return fail(e),
    };

    println!("=================================================");
    let show = |fault: &Option<emu::Fault>| match fault {
        Some(fault) => fault.to_string(),
        None => "none".to_string(),
    };
    println!(" emulator fault : {}", show(&report.emu_fault));
    println!(" reference fault: {}", show(&report.ref_fault));
    for m in &report.mismatches {
        cprintln!(
            " <r>mismatch</> {:0>4X} {:<6} emulated {:0>4X}, expected {:0>4X}",
            m.addr,
            m.name.as_deref().unwrap_or(""),
            m.emulated,
            m.expected
        );
    }
    cprintln!("<s>stack</>: {:?}", report.stack);

    if report.is_equivalent() {
        cprintln!("<g,s>equivalent</>");
        ExitCode::SUCCESS
    } else {
        Msg::Error("translated code diverges from the reference machine".to_string()).head();
        ExitCode::FAILURE
    }
}
