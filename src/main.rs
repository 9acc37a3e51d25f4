use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};
use monkey::{Environment, Object, evaluate, parse};

/// Runs a Monkey program.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Source file to run
    file: PathBuf,

    /// Don't print the value of the last expression
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let input = match std::fs::read_to_string(&args.file) {
        Ok(input) => input,
        Err(err) => {
            error!("cannot read {}: {}", args.file.display(), err);
            eprintln!("monkey: {}: {}", args.file.display(), err);
            return ExitCode::FAILURE;
        }
    };
    let source_name = args.file.display().to_string();

    let (program, errors) = parse(&input);
    if !errors.is_empty() {
        for err in &errors {
            if let Err(io_err) = err.pretty_print(&source_name, &input) {
                eprintln!("{}", err);
                debug!("could not render parse error: {}", io_err);
            }
        }
        return ExitCode::FAILURE;
    }
    debug!("parsed {} statement(s) from {}", program.statements.len(), source_name);

    let env = Environment::new();
    match evaluate(&program, &env) {
        Some(result) if result.is_error() => {
            eprintln!("{}", result.inspect());
            ExitCode::FAILURE
        }
        Some(result) => {
            if !args.quiet && !matches!(*result, Object::Null) {
                println!("{}", result.inspect());
            }
            ExitCode::SUCCESS
        }
        None => ExitCode::SUCCESS,
    }
}
