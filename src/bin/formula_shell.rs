//! Reference command-line front end: reads a formula (or, with
//! `--multi`, a whole formula program) from stdin, translates it, and
//! writes the result to stdout.
//!
//! Argument handling is intentionally minimal — `std::env::args` and a
//! couple of recognized flags — since the crate's own API is the real
//! surface and a full argument parser is out of scope for this reference
//! shell.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use formulex::{translate_line, translate_text, Dialect, TranslateError};

fn main() -> ExitCode {
    let mut multi = false;
    let mut int2float = false;
    let mut reverse = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--multi" => multi = true,
            "--int2float" => int2float = true,
            "--reverse" => reverse = true,
            other => {
                eprintln!("formula-shell: unrecognized argument '{}'", other);
                return ExitCode::FAILURE;
            }
        }
    }

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("formula-shell: failed to read stdin: {}", e);
        return ExitCode::FAILURE;
    }

    let mathematica = Dialect::mathematica();
    let python = Dialect::python(int2float);
    let (source, target) = if reverse { (&python, &mathematica) } else { (&mathematica, &python) };

    let result = if multi {
        translate_text(&input, source, target, true)
    } else {
        translate_line(input.trim_end_matches('\n'), source, target)
    };

    match result {
        Ok(output) => {
            let mut stdout = io::stdout();
            let _ = writeln!(stdout, "{}", output);
            ExitCode::SUCCESS
        }
        Err(TranslateError::Parse(e)) => {
            eprintln!("parse error at offset {}: {}", e.offset, e.message);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
