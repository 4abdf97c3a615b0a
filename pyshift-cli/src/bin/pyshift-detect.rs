//! Standalone CLI tool for reporting a source file's Python dialect as JSON.

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;

use pyshift_core::detect::SyntaxAnalyzer;

#[derive(Parser)]
#[command(name = "pyshift-detect", about = "Detect the Python dialect of a source file")]
struct Args {
    /// Input file or "-" for stdin
    input: String,

    /// Compact JSON output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let source = if args.input == "-" {
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("Error: stdin: {e}");
            return ExitCode::FAILURE;
        }
        buf
    } else {
        match std::fs::read_to_string(&args.input) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error: {}: {e}", args.input);
                return ExitCode::FAILURE;
            }
        }
    };

    let report = SyntaxAnalyzer::analyze(&source);

    let json = if args.compact {
        serde_json::to_string(&report).unwrap()
    } else {
        serde_json::to_string_pretty(&report).unwrap()
    };

    println!("{json}");
    ExitCode::SUCCESS
}
