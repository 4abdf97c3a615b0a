//! Standalone CLI tool for converting Python 2 sources to Python 3.

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use pyshift_core::batch;
use pyshift_core::convert::Converter;
use pyshift_core::errors::PyshiftError;

#[derive(Parser)]
#[command(name = "pyshift-convert", about = "Convert Python 2 source to Python 3")]
struct Args {
    /// Input file, directory, or "-" for stdin
    input: String,

    /// Output file or "-" for stdout. If omitted, files are modified in
    /// place (stdin input falls back to stdout).
    output: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), PyshiftError> {
    let converter = Converter::new()?;

    // stdin -> stdout or file
    if args.input == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        let converted = converter.convert(&source);
        match args.output.as_deref() {
            Some("-") | None => print!("{converted}"),
            Some(path) => std::fs::write(path, &converted)
                .map_err(|e| PyshiftError::IoError(format!("{path}: {e}")))?,
        }
        return Ok(());
    }

    let input = Path::new(&args.input);

    // Directory input: convert every *.py underneath, in place.
    if input.is_dir() {
        let outcomes = batch::convert_dir(&converter, input)?;
        for outcome in &outcomes {
            let note = if outcome.changed { "" } else { " (unchanged)" };
            println!(
                "{} [{} bytes -> {} bytes]{note}",
                outcome.path, outcome.bytes_in, outcome.bytes_out
            );
        }
        println!("{} files converted", outcomes.len());
        return Ok(());
    }

    match args.output.as_deref() {
        // file -> stdout, input untouched
        Some("-") => {
            let source = batch::read_source(input)?;
            print!("{}", converter.convert(&source));
        }
        // file -> file, or in place when no output is given
        other => {
            let output = other.map(Path::new);
            batch::convert_file(&converter, input, output)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    log::debug!("pyshift-convert v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
