mod error;

use cas_core::Interpreter;
use error::report_to_stderr;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{fs, io::{self, IsTerminal, Read}, process::ExitCode};

/// Evaluates every statement of the input, printing each result and reporting each error.
/// Returns `true` if every statement succeeded.
fn run(input: &str, interp: &mut Interpreter) -> bool {
    let mut ok = true;
    for output in interp.run(input) {
        match output {
            Ok(Some(text)) => println!("{}", text),
            Ok(None) => (), // assignments print nothing
            Err(err) => {
                report_to_stderr(&err, input);
                ok = false;
            },
        }
    }
    ok
}

/// Reads one line from the editor and evaluates it.
fn process_line(rl: &mut DefaultEditor, interp: &mut Interpreter) -> Result<(), ReadlineError> {
    let input = rl.readline("> ")?;
    if input.trim().is_empty() {
        return Ok(());
    }

    rl.add_history_entry(&input)?;
    run(&input, interp);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut interp = Interpreter::new();
    let mut args = std::env::args();
    args.next();

    let input = if let Some(filename) = args.next() {
        // run source file
        match fs::read_to_string(&filename) {
            Ok(input) => input,
            Err(err) => {
                eprintln!("could not read `{}`: {}", filename, err);
                return ExitCode::FAILURE;
            },
        }
    } else if !io::stdin().is_terminal() {
        // read source from stdin
        let mut input = String::new();
        if let Err(err) = io::stdin().read_to_string(&mut input) {
            eprintln!("could not read stdin: {}", err);
            return ExitCode::FAILURE;
        }
        input
    } else {
        // run the repl / interactive mode
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            },
        };

        loop {
            if let Err(err) = process_line(&mut rl, &mut interp) {
                match err {
                    ReadlineError::Eof | ReadlineError::Interrupted => (),
                    _ => eprintln!("{}", err),
                }
                break;
            }
        }
        return ExitCode::SUCCESS;
    };

    if run(&input, &mut interp) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
