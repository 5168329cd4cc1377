use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use mica_driver::{check_source, compile_source, lex_source, parse_source, PipelineError};
use mica_lexer::TokenKind;

/// Exit code for programs rejected by resolution (or earlier stages).
const EXIT_SOURCE_ERROR: u8 = 65;
/// Exit code when the input file cannot be read.
const EXIT_NO_INPUT: u8 = 74;

#[derive(Parser)]
#[command(
    name = "mica",
    version = "0.1.0",
    about = "Mica compiler: a borrow-checked language that emits C++",
    long_about = "Compiles Mica, a small statically-typed language with explicit\nmutability and borrowing, to C++ source text. Move and borrow errors\nare caught at compile time, before any C++ is generated."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Mica file to C++ source
    Build {
        /// Input Mica file
        input: PathBuf,

        /// Output file path (defaults to the input with a .cpp extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Resolve a Mica file without generating code
    Check {
        /// Input Mica file
        input: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Lex a Mica file and show tokens (debug)
    Lex {
        /// Input Mica file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },

    /// Parse a Mica file and show the AST (debug)
    Parse {
        /// Input Mica file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            verbose,
        } => build_command(input, output, verbose),
        Commands::Check { input, verbose } => check_command(input, verbose),
        Commands::Lex { input, positions } => lex_command(input, positions),
        Commands::Parse { input } => parse_command(input),
    }
}

fn build_command(input: PathBuf, output: Option<PathBuf>, verbose: bool) -> ExitCode {
    if verbose {
        println!("Compiling: {}", input.display());
    }

    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", input.display(), e);
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };
    let filename = input.to_string_lossy().to_string();

    let cpp = match compile_source(&source) {
        Ok(cpp) => cpp,
        Err(error) => return report_pipeline_error(&error, &filename, &source),
    };

    let output = output.unwrap_or_else(|| input.with_extension("cpp"));
    if verbose {
        println!("Writing: {}", output.display());
    }
    if let Err(e) = fs::write(&output, cpp) {
        eprintln!("Error writing {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }

    if verbose {
        println!("Done.");
    }
    ExitCode::SUCCESS
}

fn check_command(input: PathBuf, verbose: bool) -> ExitCode {
    if verbose {
        println!("Checking: {}", input.display());
    }

    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", input.display(), e);
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };
    let filename = input.to_string_lossy().to_string();

    match check_source(&source) {
        Ok((_, resolution)) => {
            if resolution.is_clean() {
                println!("ok");
                ExitCode::SUCCESS
            } else {
                for diagnostic in &resolution.diagnostics {
                    report_error(
                        "E2000",
                        diagnostic.kind.as_str(),
                        &diagnostic.message,
                        diagnostic.span.start,
                        diagnostic.span.end,
                        &filename,
                        &source,
                    );
                }
                ExitCode::from(EXIT_SOURCE_ERROR)
            }
        }
        Err(error) => report_pipeline_error(&error, &filename, &source),
    }
}

fn lex_command(input: PathBuf, positions: bool) -> ExitCode {
    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", input.display(), e);
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };
    let filename = input.to_string_lossy().to_string();

    let tokens = mica_lexer::Lexer::new(&source).tokenize();

    println!("Tokens for {}:\n", filename);
    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("{:4} | {:?}", i, token.kind);
            break;
        }
        if positions {
            println!(
                "{:4} | {:16?} | {:?} | {}..{}",
                i, token.kind, token.value, token.span.start, token.span.end
            );
        } else {
            println!("{:4} | {:16?} | {:?}", i, token.kind, token.value);
        }
    }

    match lex_source(&source) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => report_pipeline_error(&error, &filename, &source),
    }
}

fn parse_command(input: PathBuf) -> ExitCode {
    let source = match read_source_file(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", input.display(), e);
            return ExitCode::from(EXIT_NO_INPUT);
        }
    };
    let filename = input.to_string_lossy().to_string();

    match parse_source(&source) {
        Ok(program) => {
            println!("{:#?}", program);
            ExitCode::SUCCESS
        }
        Err(error) => report_pipeline_error(&error, &filename, &source),
    }
}

// Helper functions

fn read_source_file(path: &PathBuf) -> io::Result<String> {
    fs::read_to_string(path)
}

fn report_pipeline_error(error: &PipelineError, filename: &str, source: &str) -> ExitCode {
    match error {
        PipelineError::Lex(errors) => {
            for err in errors {
                report_error(
                    "E0001",
                    "Lexical error",
                    &err.message,
                    err.span.start,
                    err.span.end,
                    filename,
                    source,
                );
            }
            ExitCode::from(EXIT_SOURCE_ERROR)
        }
        PipelineError::Parse(errors) => {
            for err in errors {
                report_error(
                    "E1000",
                    "Parse error",
                    &err.message,
                    err.span.start,
                    err.span.end,
                    filename,
                    source,
                );
            }
            ExitCode::from(EXIT_SOURCE_ERROR)
        }
        PipelineError::Resolve(diagnostics) => {
            for diagnostic in diagnostics {
                report_error(
                    "E2000",
                    diagnostic.kind.as_str(),
                    &diagnostic.message,
                    diagnostic.span.start,
                    diagnostic.span.end,
                    filename,
                    source,
                );
            }
            ExitCode::from(EXIT_SOURCE_ERROR)
        }
        PipelineError::Codegen(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(
    code: &str,
    title: &str,
    message: &str,
    start: usize,
    end: usize,
    filename: &str,
    source: &str,
) {
    let span = (filename, start..end.max(start + 1));
    Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .print((filename, Source::from(source)))
        .unwrap();
}
